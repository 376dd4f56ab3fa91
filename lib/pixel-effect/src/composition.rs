//! Writing processed sub-buffers back into a larger frame.

use crate::{PixelBuffer, PixelEffectError, PixelEffectResult, Rect};
use fast_image_resize::{PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image as FastImage};
use image::Rgba;

/// Outline colour drawn around composited regions.
pub const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Nearest-neighbour rescale. Returns a copy when the size already matches.
pub fn scale_to(image: &PixelBuffer, width: u32, height: u32) -> PixelEffectResult<PixelBuffer> {
    if image.is_empty() || width == 0 || height == 0 {
        return Err(PixelEffectError::InvalidParameter(format!(
            "cannot scale {}x{} to {width}x{height}",
            image.width(),
            image.height()
        )));
    }

    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let src = FastImage::from_vec_u8(
        image.width(),
        image.height(),
        image.as_raw().to_vec(),
        PixelType::U8x4,
    )?;
    let mut dst = FastImage::new(width, height, PixelType::U8x4);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Nearest);
    Resizer::new().resize(&src, &mut dst, &options)?;

    PixelBuffer::from_raw(width, height, dst.buffer().to_vec())
}

/// Overwrite `canvas` with `image` at (`x`, `y`). Parts falling outside are dropped.
pub fn paste(canvas: &mut PixelBuffer, image: &PixelBuffer, x: u32, y: u32) {
    image::imageops::replace(canvas.image_mut(), image.as_image(), x as i64, y as i64);
}

/// Unfilled one-pixel rectangle, clipped to the canvas.
pub fn draw_outline(canvas: &mut PixelBuffer, rect: &Rect, color: Rgba<u8>) {
    if rect.is_empty() {
        return;
    }

    let outline = imageproc::rect::Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height);
    imageproc::drawing::draw_hollow_rect_mut(canvas.image_mut(), outline, color);
}

/// Scale `image` to `rect`'s size and paste it there.
pub fn composite(canvas: &mut PixelBuffer, image: &PixelBuffer, rect: &Rect) -> PixelEffectResult<()> {
    let scaled = scale_to(image, rect.width, rect.height)?;
    paste(canvas, &scaled, rect.x, rect.y);
    Ok(())
}
