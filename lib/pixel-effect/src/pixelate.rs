use crate::{Effect, PixelBuffer, PixelEffectError, PixelEffectResult, Rect, colour_space};
use derivative::Derivative;
use derive_setters::Setters;

/// Grayscale block mosaic.
///
/// Samples are reduced to their plain RGB average, then every non-overlapping
/// `block_size` x `block_size` tile is painted with the mean intensity of the samples it
/// covers. Tiles at the right and bottom edges may be partial. Alpha becomes 255.
pub fn pixelate(image: &PixelBuffer, block_size: i32) -> PixelEffectResult<PixelBuffer> {
    if block_size <= 0 {
        return Err(PixelEffectError::InvalidParameter(format!(
            "block size must be > 0, got {block_size}"
        )));
    }

    let block = block_size as u32;
    let gray = colour_space::to_grayscale_average(image);

    // one sample per tile holding that tile's mean intensity
    let means = PixelBuffer::from_fn(
        image.width().div_ceil(block),
        image.height().div_ceil(block),
        |bx, by| {
            let tile = Rect::new(bx * block, by * block, block, block);
            let mean = gray
                .crop(&tile)
                .map_or(0, |tile| tile.mean_intensity().round() as u8);
            [mean, mean, mean, 255]
        },
    );

    let mut output = gray;
    for (x, y, pixel) in output.image_mut().enumerate_pixels_mut() {
        pixel.0 = means.get(x / block, y / block)?;
    }

    Ok(output)
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PixelateConfig {
    #[derivative(Default(value = "10"))]
    block_size: i32,
}

impl PixelateConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for PixelateConfig {
    fn apply(&self, image: &PixelBuffer) -> PixelEffectResult<PixelBuffer> {
        pixelate(image, self.block_size)
    }
}
