use crate::{
    config::Config,
    pipeline::{FrameOutput, View},
};
use derivative::Derivative;
use derive_setters::Setters;
use pixel_effect::{PixelBuffer, PixelEffectResult, Rect, composition};

pub const PANEL_WIDTH: u32 = 160;
pub const PANEL_HEIGHT: u32 = 120;

/// Top-left corner of each view on the canvas.
pub fn panel_origin(view: View) -> (u32, u32) {
    match view {
        View::Webcam => (0, 0),
        View::Grayscale => (180, 0),
        View::Red => (0, 140),
        View::Green => (180, 140),
        View::Blue => (360, 140),
        View::RedThreshold => (0, 280),
        View::GreenThreshold => (180, 280),
        View::BlueThreshold => (360, 280),
        View::WebcamRepeat => (0, 420),
        View::Yuv => (180, 420),
        View::Hsi => (360, 420),
        View::FaceDetect => (0, 560),
        View::YuvThreshold => (180, 560),
        View::HsiThreshold => (360, 560),
    }
}

/// Fixed panel grid on a light-gray canvas.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct Layout {
    #[derivative(Default(value = "870"))]
    canvas_width: u32,

    #[derivative(Default(value = "700"))]
    canvas_height: u32,

    #[derivative(Default(value = "220"))]
    background: u8,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_canvas_width(config.layout.canvas_width)
            .with_canvas_height(config.layout.canvas_height)
            .with_background(config.layout.background)
    }

    /// Draw every view that succeeded into its panel. Failed views leave the background.
    pub fn render(&self, output: &FrameOutput) -> PixelEffectResult<PixelBuffer> {
        let gray = self.background;
        let mut canvas =
            PixelBuffer::filled(self.canvas_width, self.canvas_height, [gray, gray, gray, 255]);

        for derived in &output.views {
            let Ok(image) = &derived.result else {
                continue;
            };

            let (x, y) = panel_origin(derived.view);
            let panel = Rect::new(x, y, PANEL_WIDTH, PANEL_HEIGHT);
            composition::composite(&mut canvas, image, &panel)?;
        }

        Ok(canvas)
    }
}
