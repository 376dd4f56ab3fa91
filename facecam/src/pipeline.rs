//! One synchronous pass over a frame producing every derived view.

use crate::{config::Config, context::ProcessingContext};
use derivative::Derivative;
use derive_setters::Setters;
use pixel_effect::{
    ChannelConfig, ColourSpace, ColourSpaceConfig, Effect, FaceRect, GrayscaleConfig,
    GrayscaleMode, PixelBuffer, PixelEffectResult, Rect, RegionCompositor, RegionEffectParams,
    RgbChannel, ThresholdChannel, ThresholdConfig, composition,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Webcam,
    Grayscale,
    Red,
    Green,
    Blue,
    RedThreshold,
    GreenThreshold,
    BlueThreshold,
    WebcamRepeat,
    Yuv,
    Hsi,
    FaceDetect,
    YuvThreshold,
    HsiThreshold,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Webcam => "webcam",
            View::Grayscale => "grayscale",
            View::Red => "red",
            View::Green => "green",
            View::Blue => "blue",
            View::RedThreshold => "red threshold",
            View::GreenThreshold => "green threshold",
            View::BlueThreshold => "blue threshold",
            View::WebcamRepeat => "webcam repeat",
            View::Yuv => "yuv",
            View::Hsi => "hsi",
            View::FaceDetect => "face detect",
            View::YuvThreshold => "yuv threshold",
            View::HsiThreshold => "hsi threshold",
        }
    }

    pub fn all() -> &'static [View] {
        &[
            View::Webcam,
            View::Grayscale,
            View::Red,
            View::Green,
            View::Blue,
            View::RedThreshold,
            View::GreenThreshold,
            View::BlueThreshold,
            View::WebcamRepeat,
            View::Yuv,
            View::Hsi,
            View::FaceDetect,
            View::YuvThreshold,
            View::HsiThreshold,
        ]
    }

    /// Whole-frame transformation for this view. `None` for the views that pass the
    /// capture through or need the face list.
    fn effect(&self, context: &ProcessingContext) -> Option<Box<dyn Effect>> {
        let thresholded = |channel: ThresholdChannel| -> Option<Box<dyn Effect>> {
            Some(Box::new(
                ThresholdConfig::new()
                    .with_channel(channel)
                    .with_cutoff(context.threshold(channel)),
            ))
        };

        match self {
            View::Webcam | View::WebcamRepeat | View::FaceDetect => None,
            View::Grayscale => Some(Box::new(
                GrayscaleConfig::new().with_mode(GrayscaleMode::Bright),
            )),
            View::Red => Some(Box::new(ChannelConfig::new().with_channel(RgbChannel::Red))),
            View::Green => Some(Box::new(ChannelConfig::new().with_channel(RgbChannel::Green))),
            View::Blue => Some(Box::new(ChannelConfig::new().with_channel(RgbChannel::Blue))),
            View::RedThreshold => thresholded(ThresholdChannel::Red),
            View::GreenThreshold => thresholded(ThresholdChannel::Green),
            View::BlueThreshold => thresholded(ThresholdChannel::Blue),
            View::Yuv => Some(Box::new(ColourSpaceConfig::new().with_space(ColourSpace::Yuv))),
            View::Hsi => Some(Box::new(ColourSpaceConfig::new().with_space(ColourSpace::Hsi))),
            View::YuvThreshold => thresholded(ThresholdChannel::YuvLuma),
            View::HsiThreshold => thresholded(ThresholdChannel::HsiIntensity),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub struct DerivedView {
    pub view: View,
    pub result: PixelEffectResult<PixelBuffer>,
}

#[derive(Debug)]
pub struct FrameOutput {
    /// The frame scaled to the capture size.
    pub capture: PixelBuffer,

    /// Every view in `View::all()` order.
    pub views: Vec<DerivedView>,

    /// Outlines drawn on the face view.
    pub drawn: Vec<Rect>,
}

impl FrameOutput {
    pub fn get(&self, view: View) -> Option<&PixelBuffer> {
        self.views
            .iter()
            .find(|derived| derived.view == view)
            .and_then(|derived| derived.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = View> + '_ {
        self.views
            .iter()
            .filter(|derived| derived.result.is_err())
            .map(|derived| derived.view)
    }
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct FramePipeline {
    #[derivative(Default(value = "160"))]
    capture_width: u32,

    #[derivative(Default(value = "120"))]
    capture_height: u32,

    compositor: RegionCompositor,
}

impl FramePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let (width, height) = (config.capture.width, config.capture.height);
        let params = RegionEffectParams::new()
            .with_blur_radius(config.region.blur_radius)
            .with_pixelate_block_size(config.region.pixelate_block_size);

        Self::new()
            .with_capture_width(width)
            .with_capture_height(height)
            .with_compositor(
                RegionCompositor::new()
                    .with_target_width(width)
                    .with_target_height(height)
                    .with_params(params),
            )
    }

    /// Fails only when the frame cannot be scaled to the capture size. A view that fails
    /// is logged and kept as an `Err` next to the others.
    pub fn process(
        &self,
        frame: &PixelBuffer,
        faces: &[FaceRect],
        context: &ProcessingContext,
    ) -> PixelEffectResult<FrameOutput> {
        let capture = composition::scale_to(frame, self.capture_width, self.capture_height)?;

        let mut drawn = Vec::new();
        let mut views = Vec::with_capacity(View::all().len());
        for &view in View::all() {
            let result = match view {
                View::FaceDetect => self
                    .compositor
                    .composite(frame, faces, context.effect())
                    .map(|composite| {
                        drawn = composite.drawn;
                        composite.frame
                    }),
                _ => match view.effect(context) {
                    Some(effect) => effect.apply(&capture),
                    None => Ok(capture.clone()),
                },
            };

            if let Err(e) = &result {
                log::warn!("{view} view failed: {e}");
            }
            views.push(DerivedView { view, result });
        }

        Ok(FrameOutput {
            capture,
            views,
            drawn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_effect::{RegionEffect, to_grayscale_bright, to_hsi};

    fn frame() -> PixelBuffer {
        PixelBuffer::from_fn(320, 240, |x, y| [(x % 256) as u8, (y % 256) as u8, 90, 255])
    }

    #[test]
    fn test_all_views_present() {
        let output = FramePipeline::new()
            .process(&frame(), &[], &ProcessingContext::new())
            .unwrap();

        assert_eq!(output.capture.dimensions(), (160, 120));
        assert_eq!(output.views.len(), View::all().len());
        assert_eq!(output.failed().count(), 0);
        for &view in View::all() {
            assert_eq!(output.get(view).unwrap().dimensions(), (160, 120));
        }
        assert_eq!(output.get(View::Webcam), Some(&output.capture));
        assert_eq!(output.get(View::WebcamRepeat), Some(&output.capture));
        assert!(output.drawn.is_empty());
    }

    #[test]
    fn test_views_match_direct_calls() {
        let output = FramePipeline::new()
            .process(&frame(), &[], &ProcessingContext::new())
            .unwrap();
        let capture = &output.capture;

        assert_eq!(output.get(View::Grayscale).unwrap(), &to_grayscale_bright(capture));
        assert_eq!(output.get(View::Hsi).unwrap(), &to_hsi(capture));
        assert!(
            output
                .get(View::Green)
                .unwrap()
                .samples()
                .all(|s| s[0] == 0 && s[2] == 0)
        );
    }

    #[test]
    fn test_thresholds_follow_context() {
        let mut context = ProcessingContext::new();
        context.set_threshold(ThresholdChannel::Red, 255).unwrap();
        context.set_threshold(ThresholdChannel::Blue, 0).unwrap();

        let output = FramePipeline::new().process(&frame(), &[], &context).unwrap();
        // 255 can never be exceeded; blue is a constant 90 > 0
        assert!(output.get(View::RedThreshold).unwrap().samples().all(|s| s[0] == 0));
        assert!(output.get(View::BlueThreshold).unwrap().samples().all(|s| s[2] == 255));
    }

    #[test]
    fn test_face_view_uses_frame_coordinates() {
        let mut context = ProcessingContext::new();
        context.set_effect(RegionEffect::Grayscale);
        let faces = [
            FaceRect::new(100.0, 60.0, 40.0, 40.0, 8.0),
            FaceRect::new(10.0, 10.0, 20.0, 20.0, 3.0),
        ];

        let output = FramePipeline::new().process(&frame(), &faces, &context).unwrap();
        assert_eq!(output.drawn, vec![Rect::new(50, 30, 20, 20)]);
    }

    #[test]
    fn test_confidence_cut_is_not_configurable() {
        let config: Config = toml::from_str(
            "[region]\neffect = \"grayscale\"\nmin_confidence = 2.0\n",
        )
        .unwrap();
        let context = ProcessingContext::from_config(&config).unwrap();
        let faces = [
            FaceRect::new(10.0, 10.0, 20.0, 20.0, 3.0),
            FaceRect::new(100.0, 60.0, 40.0, 40.0, 4.0),
        ];

        let output = FramePipeline::from_config(&config)
            .process(&frame(), &faces, &context)
            .unwrap();
        assert!(output.drawn.is_empty());
        assert_eq!(
            output.get(View::FaceDetect).unwrap(),
            &composition::scale_to(&frame(), 160, 120).unwrap()
        );
    }

    #[test]
    fn test_failed_view_does_not_abort_others() {
        let mut context = ProcessingContext::new();
        context.set_effect(RegionEffect::Pixelate);
        let pipeline = FramePipeline::new().with_compositor(
            RegionCompositor::new()
                .with_params(RegionEffectParams::new().with_pixelate_block_size(0)),
        );
        let faces = [FaceRect::new(100.0, 60.0, 40.0, 40.0, 8.0)];

        let output = pipeline.process(&frame(), &faces, &context).unwrap();
        assert_eq!(output.failed().collect::<Vec<_>>(), vec![View::FaceDetect]);
        assert!(output.get(View::FaceDetect).is_none());
        assert!(output.get(View::HsiThreshold).is_some());
        assert!(output.drawn.is_empty());
    }

    #[test]
    fn test_empty_frame_is_error() {
        assert!(
            FramePipeline::new()
                .process(&PixelBuffer::new(0, 0), &[], &ProcessingContext::new())
                .is_err()
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.capture.width = 80;
        config.capture.height = 60;

        let output = FramePipeline::from_config(&config)
            .process(&frame(), &[], &ProcessingContext::new())
            .unwrap();
        assert_eq!(output.capture.dimensions(), (80, 60));
        assert_eq!(output.get(View::FaceDetect).unwrap().dimensions(), (80, 60));
    }
}
