use crate::{
    Effect, PixelBuffer, PixelEffectError, PixelEffectResult,
    channel::RgbChannel,
    colour_space::{to_hsi, to_yuv},
};
use derivative::Derivative;
use derive_setters::Setters;

/// Scalar that gets binarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdChannel {
    Red,
    Green,
    Blue,
    /// Y of the YUV conversion (stored in the R slot).
    YuvLuma,
    /// I of the HSI conversion (stored in the B slot).
    HsiIntensity,
}

impl ThresholdChannel {
    pub fn all() -> &'static [ThresholdChannel] {
        &[
            ThresholdChannel::Red,
            ThresholdChannel::Green,
            ThresholdChannel::Blue,
            ThresholdChannel::YuvLuma,
            ThresholdChannel::HsiIntensity,
        ]
    }
}

#[inline]
fn binarize(value: u8, cutoff: i32) -> u8 {
    if value as i32 > cutoff { 255 } else { 0 }
}

fn check_cutoff(cutoff: i32) -> PixelEffectResult<()> {
    if !(0..=255).contains(&cutoff) {
        return Err(PixelEffectError::InvalidParameter(format!(
            "threshold cutoff {cutoff} is outside 0..=255"
        )));
    }
    Ok(())
}

/// Binary mask on one channel: 255 where the scalar is strictly greater than `cutoff`.
///
/// The raw R, G, B variants also zero the two other channels. The YUV and HSI variants
/// only replace Y (R slot) or I (B slot) of the converted image.
pub fn threshold(
    image: &PixelBuffer,
    channel: ThresholdChannel,
    cutoff: i32,
) -> PixelEffectResult<PixelBuffer> {
    check_cutoff(cutoff)?;

    let isolated = |rgb: RgbChannel| {
        let index = rgb.index();
        image.map_samples(|sample| {
            let mut out = [0, 0, 0, sample[3]];
            out[index] = binarize(sample[index], cutoff);
            out
        })
    };

    let output = match channel {
        ThresholdChannel::Red => isolated(RgbChannel::Red),
        ThresholdChannel::Green => isolated(RgbChannel::Green),
        ThresholdChannel::Blue => isolated(RgbChannel::Blue),
        ThresholdChannel::YuvLuma => to_yuv(image).map_samples(|mut sample| {
            sample[0] = binarize(sample[0], cutoff);
            sample
        }),
        ThresholdChannel::HsiIntensity => to_hsi(image).map_samples(|mut sample| {
            sample[2] = binarize(sample[2], cutoff);
            sample
        }),
    };

    Ok(output)
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ThresholdConfig {
    #[derivative(Default(value = "ThresholdChannel::Red"))]
    channel: ThresholdChannel,

    #[derivative(Default(value = "127"))]
    cutoff: i32,
}

impl ThresholdConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for ThresholdConfig {
    fn apply(&self, image: &PixelBuffer) -> PixelEffectResult<PixelBuffer> {
        threshold(image, self.channel, self.cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> PixelBuffer {
        PixelBuffer::from_fn(16, 16, |x, y| {
            let v = (y * 16 + x) as u8;
            [v, 255 - v, v / 2, 255]
        })
    }

    #[test]
    fn test_red_threshold_on_red_square() {
        let red = PixelBuffer::filled(4, 4, [255, 0, 0, 255]);
        let out = threshold(&red, ThresholdChannel::Red, 200).unwrap();

        assert!(out.samples().all(|s| s == [255, 0, 0, 255]));
    }

    #[test]
    fn test_strict_cutoff() {
        let source = ramp();
        for &channel in &[ThresholdChannel::Red, ThresholdChannel::Green, ThresholdChannel::Blue] {
            let index = match channel {
                ThresholdChannel::Red => 0,
                ThresholdChannel::Green => 1,
                _ => 2,
            };
            let out = threshold(&source, channel, 100).unwrap();

            for (src, mask) in source.samples().zip(out.samples()) {
                assert!(mask[index] == 0 || mask[index] == 255);
                assert_eq!(mask[index] == 255, src[index] > 100);
                for other in (0..3).filter(|&i| i != index) {
                    assert_eq!(mask[other], 0);
                }
            }
        }
    }

    #[test]
    fn test_equal_value_is_below() {
        let source = PixelBuffer::filled(1, 1, [127, 127, 127, 255]);
        let out = threshold(&source, ThresholdChannel::Green, 127).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), [0, 0, 0, 255]);
    }

    #[test]
    fn test_yuv_luma_only_replaces_y() {
        let source = ramp();
        let yuv = to_yuv(&source);
        let out = threshold(&source, ThresholdChannel::YuvLuma, 90).unwrap();

        for (converted, mask) in yuv.samples().zip(out.samples()) {
            assert_eq!(mask[0] == 255, converted[0] > 90);
            assert!(mask[0] == 0 || mask[0] == 255);
            assert_eq!(&mask[1..], &converted[1..]);
        }
    }

    #[test]
    fn test_hsi_intensity_only_replaces_i() {
        let source = ramp();
        let hsi = to_hsi(&source);
        let out = threshold(&source, ThresholdChannel::HsiIntensity, 60).unwrap();

        for (converted, mask) in hsi.samples().zip(out.samples()) {
            assert_eq!(mask[2] == 255, converted[2] > 60);
            assert_eq!(&mask[..2], &converted[..2]);
            assert_eq!(mask[3], converted[3]);
        }
    }

    #[test]
    fn test_cutoff_out_of_range() {
        let source = ramp();
        assert!(matches!(
            threshold(&source, ThresholdChannel::Red, -1),
            Err(PixelEffectError::InvalidParameter(_))
        ));
        assert!(threshold(&source, ThresholdChannel::Blue, 256).is_err());
        assert!(threshold(&source, ThresholdChannel::Blue, 0).is_ok());
        assert!(threshold(&source, ThresholdChannel::Blue, 255).is_ok());
    }

    #[test]
    fn test_threshold_config() {
        let source = ramp();
        let out = ThresholdConfig::new()
            .with_channel(ThresholdChannel::HsiIntensity)
            .with_cutoff(10)
            .apply(&source)
            .unwrap();

        assert_eq!(out, threshold(&source, ThresholdChannel::HsiIntensity, 10).unwrap());
    }
}
