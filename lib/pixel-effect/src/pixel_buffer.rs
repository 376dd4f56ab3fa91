//! Owned RGBA sample grid
//!
//! Every transformation reads one `PixelBuffer` and returns a new one. The stride
//! arithmetic lives in `offset` and nowhere else.

use crate::{PixelEffectError, PixelEffectResult};
use image::{Rgba, RgbaImage};

pub const CHANNELS: usize = 4;

/// One pixel: R, G, B, A.
pub type Sample = [u8; CHANNELS];

/// Integer rectangle in buffer coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with a `width` x `height` grid. `None` when nothing is left.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        if self.is_empty() || self.x >= width || self.y >= height {
            return None;
        }

        Some(Rect {
            x: self.x,
            y: self.y,
            width: self.width.min(width - self.x),
            height: self.height.min(height - self.y),
        })
    }
}

/// Colour triple pulled out of a sample for per-pixel math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSample {
    pub fn sum(&self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }

    pub fn average(&self) -> f32 {
        self.sum() as f32 / 3.0
    }

    /// Channels scaled to [0, 1].
    pub fn normalized(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl From<Sample> for ColorSample {
    fn from(sample: Sample) -> Self {
        Self {
            r: sample[0],
            g: sample[1],
            b: sample[2],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn filled(width: u32, height: u32, sample: Sample) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(sample)),
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Sample) -> Self {
        Self {
            image: RgbaImage::from_fn(width, height, |x, y| Rgba(f(x, y))),
        }
    }

    /// Wrap a row-major RGBA byte vector. Fails unless `raw.len() == width * height * 4`.
    pub fn from_raw(width: u32, height: u32, raw: Vec<u8>) -> PixelEffectResult<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        let actual = raw.len();
        if actual != expected {
            return Err(PixelEffectError::DimensionMismatch { expected, actual });
        }

        RgbaImage::from_raw(width, height, raw)
            .map(|image| Self { image })
            .ok_or(PixelEffectError::DimensionMismatch { expected, actual })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        let (width, height) = self.dimensions();
        (x < width && y < height).then(|| (y as usize * width as usize + x as usize) * CHANNELS)
    }

    fn out_of_bounds(&self, x: u32, y: u32) -> PixelEffectError {
        PixelEffectError::OutOfBounds {
            x,
            y,
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn get(&self, x: u32, y: u32) -> PixelEffectResult<Sample> {
        let offset = self.offset(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        let raw = self.image.as_raw();

        let mut sample = [0u8; CHANNELS];
        sample.copy_from_slice(&raw[offset..offset + CHANNELS]);
        Ok(sample)
    }

    pub fn set(&mut self, x: u32, y: u32, sample: Sample) -> PixelEffectResult<()> {
        let offset = self.offset(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        let raw: &mut [u8] = &mut self.image;
        raw[offset..offset + CHANNELS].copy_from_slice(&sample);
        Ok(())
    }

    /// Single channel value, `channel` in 0..4 (R, G, B, A).
    pub fn channel(&self, x: u32, y: u32, channel: usize) -> PixelEffectResult<u8> {
        if channel >= CHANNELS {
            return Err(PixelEffectError::InvalidParameter(format!(
                "channel index {channel} is not in 0..{CHANNELS}"
            )));
        }

        Ok(self.get(x, y)?[channel])
    }

    /// Samples in row-major order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.image.pixels().map(|pixel| pixel.0)
    }

    /// New buffer of the same size with `f` applied to every sample.
    pub fn map_samples(&self, mut f: impl FnMut(Sample) -> Sample) -> PixelBuffer {
        let mut image = self.image.clone();
        for pixel in image.pixels_mut() {
            pixel.0 = f(pixel.0);
        }

        Self { image }
    }

    /// Copy of the region under `rect`, clipped to the buffer.
    /// `None` for a zero-area rect or one lying fully outside.
    pub fn crop(&self, rect: &Rect) -> Option<PixelBuffer> {
        let rect = rect.clip_to(self.width(), self.height())?;
        let view = image::imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height);

        Some(Self {
            image: view.to_image(),
        })
    }

    /// Mean of the R, G, B channels over the whole buffer.
    pub fn mean_intensity(&self) -> f64 {
        let count = self.width() as u64 * self.height() as u64;
        if count == 0 {
            return 0.0;
        }

        let total: u64 = self
            .samples()
            .map(|sample| ColorSample::from(sample).sum() as u64)
            .sum();

        total as f64 / (count * 3) as f64
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self::from_image(image)
    }
}
