//! Colour space conversions
//!
//! Display-oriented remaps: the converted triple is written back into the R, G, B
//! slots of the output sample. None of these conversions is invertible.

use crate::{Effect, PixelBuffer, PixelEffectResult, pixel_buffer::ColorSample};
use derivative::Derivative;
use derive_setters::Setters;
use std::f32::consts::PI;

/// Brightening factor applied by `to_grayscale_bright`.
pub const GRAYSCALE_BRIGHTNESS: f32 = 1.2;

/// Round to the nearest integer and clamp into a channel.
#[inline]
pub fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Y, U, V (EBU coefficients, chroma offset by 128).
#[inline]
pub fn yuv(color: ColorSample) -> [f32; 3] {
    let (r, g, b) = (color.r as f32, color.g as f32, color.b as f32);
    [
        0.299 * r + 0.587 * g + 0.114 * b,
        -0.147 * r - 0.289 * g + 0.436 * b + 128.0,
        0.615 * r - 0.515 * g - 0.100 * b + 128.0,
    ]
}

/// Y, Cb, Cr (BT.601 coefficients, chroma offset by 128).
#[inline]
pub fn ycbcr(color: ColorSample) -> [f32; 3] {
    let (r, g, b) = (color.r as f32, color.g as f32, color.b as f32);
    [
        0.299 * r + 0.587 * g + 0.114 * b,
        -0.169 * r - 0.331 * g + 0.5 * b + 128.0,
        0.5 * r - 0.419 * g - 0.081 * b + 128.0,
    ]
}

/// Hue in radians [0, 2π), saturation and intensity in [0, 1].
///
/// Black has no saturation and achromatic samples have no hue; both fall back to 0.
pub fn hsi(color: ColorSample) -> [f32; 3] {
    let (r, g, b) = color.normalized();
    let sum = r + g + b;
    let intensity = sum / 3.0;

    let saturation = if sum > 0.0 {
        1.0 - 3.0 * r.min(g).min(b) / sum
    } else {
        0.0
    };

    let numerator = 0.5 * ((r - g) + (r - b));
    let denominator = ((r - g) * (r - g) + (r - b) * (g - b)).sqrt();
    let hue = if denominator > 0.0 {
        let theta = (numerator / denominator).clamp(-1.0, 1.0).acos();
        if b <= g { theta } else { 2.0 * PI - theta }
    } else {
        0.0
    };

    [hue, saturation, intensity]
}

fn store(sample: [u8; 4], values: [f32; 3]) -> [u8; 4] {
    [
        clamp_channel(values[0]),
        clamp_channel(values[1]),
        clamp_channel(values[2]),
        sample[3],
    ]
}

/// R = G = B = clamp(average * 1.2), alpha unchanged.
pub fn to_grayscale_bright(image: &PixelBuffer) -> PixelBuffer {
    grayscale(image, GRAYSCALE_BRIGHTNESS)
}

/// R = G = B = average, alpha unchanged.
pub fn to_grayscale_average(image: &PixelBuffer) -> PixelBuffer {
    grayscale(image, 1.0)
}

fn grayscale(image: &PixelBuffer, brightness: f32) -> PixelBuffer {
    image.map_samples(|sample| {
        let gray = clamp_channel(ColorSample::from(sample).average() * brightness);
        [gray, gray, gray, sample[3]]
    })
}

pub fn to_yuv(image: &PixelBuffer) -> PixelBuffer {
    image.map_samples(|sample| store(sample, yuv(sample.into())))
}

pub fn to_ycbcr(image: &PixelBuffer) -> PixelBuffer {
    image.map_samples(|sample| store(sample, ycbcr(sample.into())))
}

/// H, S, I scaled to [0, 255] into R, G, B.
pub fn to_hsi(image: &PixelBuffer) -> PixelBuffer {
    image.map_samples(|sample| {
        let [hue, saturation, intensity] = hsi(sample.into());
        store(
            sample,
            [hue * 255.0 / (2.0 * PI), saturation * 255.0, intensity * 255.0],
        )
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrayscaleMode {
    Average,
    Bright,
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GrayscaleConfig {
    #[derivative(Default(value = "GrayscaleMode::Bright"))]
    mode: GrayscaleMode,
}

impl GrayscaleConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for GrayscaleConfig {
    fn apply(&self, image: &PixelBuffer) -> PixelEffectResult<PixelBuffer> {
        Ok(match self.mode {
            GrayscaleMode::Average => to_grayscale_average(image),
            GrayscaleMode::Bright => to_grayscale_bright(image),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourSpace {
    Yuv,
    Hsi,
    YCbCr,
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ColourSpaceConfig {
    #[derivative(Default(value = "ColourSpace::Yuv"))]
    space: ColourSpace,
}

impl ColourSpaceConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for ColourSpaceConfig {
    fn apply(&self, image: &PixelBuffer) -> PixelEffectResult<PixelBuffer> {
        Ok(match self.space {
            ColourSpace::Yuv => to_yuv(image),
            ColourSpace::Hsi => to_hsi(image),
            ColourSpace::YCbCr => to_ycbcr(image),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> PixelBuffer {
        PixelBuffer::from_fn(16, 16, |x, y| {
            [(x * 17) as u8, (y * 17) as u8, ((x + y) * 8) as u8, 200]
        })
    }

    #[test]
    fn test_grayscale_bright_red_square() {
        let red = PixelBuffer::filled(4, 4, [255, 0, 0, 255]);
        let gray = to_grayscale_bright(&red);

        assert!(gray.samples().all(|s| s == [102, 102, 102, 255]));
    }

    #[test]
    fn test_grayscale_bright_matches_formula() {
        let source = gradient();
        let gray = to_grayscale_bright(&source);

        for (src, out) in source.samples().zip(gray.samples()) {
            let expected = clamp_channel(ColorSample::from(src).average() * 1.2);
            assert_eq!(out[0], out[1]);
            assert_eq!(out[1], out[2]);
            assert_eq!(out[0], expected);
            assert_eq!(out[3], src[3]);
        }
    }

    #[test]
    fn test_grayscale_bright_clamps() {
        let white = PixelBuffer::filled(1, 1, [250, 250, 250, 255]);
        assert_eq!(to_grayscale_bright(&white).get(0, 0).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_grayscale_average() {
        let buffer = PixelBuffer::filled(1, 1, [30, 60, 90, 7]);
        assert_eq!(to_grayscale_average(&buffer).get(0, 0).unwrap(), [60, 60, 60, 7]);
    }

    #[test]
    fn test_yuv_primaries() {
        let white = PixelBuffer::filled(1, 1, [255, 255, 255, 255]);
        let [y, u, v, a] = to_yuv(&white).get(0, 0).unwrap();

        assert_eq!(y, 255);
        assert!((u as i32 - 128).abs() <= 1);
        assert!((v as i32 - 128).abs() <= 1);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_ycbcr_black() {
        let black = PixelBuffer::filled(1, 1, [0, 0, 0, 255]);
        assert_eq!(to_ycbcr(&black).get(0, 0).unwrap(), [0, 128, 128, 255]);
    }

    #[test]
    fn test_hsi_achromatic_fallbacks() {
        assert_eq!(hsi(ColorSample { r: 0, g: 0, b: 0 }), [0.0, 0.0, 0.0]);

        let [hue, saturation, intensity] = hsi(ColorSample { r: 90, g: 90, b: 90 });
        assert_eq!(hue, 0.0);
        assert!(saturation.abs() < 1e-6);
        assert!((intensity - 90.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_hsi_pure_colours() {
        let [red_hue, red_sat, _] = hsi(ColorSample { r: 255, g: 0, b: 0 });
        assert!(red_hue.abs() < 1e-4);
        assert!((red_sat - 1.0).abs() < 1e-6);

        let [blue_hue, _, _] = hsi(ColorSample { r: 0, g: 0, b: 255 });
        assert!((blue_hue - 4.0 * PI / 3.0).abs() < 1e-3);

        let blue = PixelBuffer::filled(1, 1, [0, 0, 255, 255]);
        assert_eq!(to_hsi(&blue).get(0, 0).unwrap(), [170, 255, 85, 255]);
    }

    #[test]
    fn test_conversions_stay_in_range_without_round_trip() {
        let source = gradient();
        for converted in [to_yuv(&source), to_hsi(&source), to_ycbcr(&source)] {
            assert_eq!(converted.dimensions(), source.dimensions());
            assert_eq!(converted.as_raw().len(), source.as_raw().len());
            // u8 storage already bounds every channel; alpha must be untouched
            for (src, out) in source.samples().zip(converted.samples()) {
                assert_eq!(out[3], src[3]);
            }
        }
    }

    #[test]
    fn test_configs_dispatch() {
        let source = gradient();
        let yuv = ColourSpaceConfig::new().apply(&source).unwrap();
        let hsi = ColourSpaceConfig::new()
            .with_space(ColourSpace::Hsi)
            .apply(&source)
            .unwrap();
        let average = GrayscaleConfig::new()
            .with_mode(GrayscaleMode::Average)
            .apply(&source)
            .unwrap();

        assert_eq!(yuv, to_yuv(&source));
        assert_eq!(hsi, to_hsi(&source));
        assert_eq!(average, to_grayscale_average(&source));
    }
}
