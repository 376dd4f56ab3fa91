pub mod blur;
pub mod channel;
pub mod colour_space;
pub mod composition;
pub mod pixel_buffer;
pub mod pixelate;
pub mod region;
pub mod threshold;

pub use blur::{BoxBlurConfig, box_blur};
pub use channel::{ChannelConfig, RgbChannel, isolate};
pub use colour_space::{
    ColourSpace, ColourSpaceConfig, GrayscaleConfig, GrayscaleMode, to_grayscale_average,
    to_grayscale_bright, to_hsi, to_ycbcr, to_yuv,
};
pub use image::{Rgba, RgbaImage};
pub use pixel_buffer::{ColorSample, PixelBuffer, Rect, Sample};
pub use pixelate::{PixelateConfig, pixelate};
pub use region::{
    FaceRect, MIN_FACE_CONFIDENCE, RegionComposite, RegionCompositor, RegionEffect,
    RegionEffectParams,
};
pub use threshold::{ThresholdChannel, ThresholdConfig, threshold};

pub type PixelEffectResult<T> = Result<T, PixelEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum PixelEffectError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: expected {expected} bytes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Sample ({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Fast image buffer error: {0}")]
    ResizeBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Fast image resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),
}

/// A pure transformation: reads `image` and returns a new buffer of derived samples.
pub trait Effect {
    fn apply(&self, image: &PixelBuffer) -> PixelEffectResult<PixelBuffer>;
}
