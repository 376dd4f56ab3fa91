use crate::{Effect, PixelBuffer, PixelEffectError, PixelEffectResult};
use derivative::Derivative;
use derive_setters::Setters;

/// Per-channel summed-area table over R, G, B with a zero top row and left column.
struct IntegralImage {
    stride: usize,
    sums: Vec<[u64; 3]>,
}

impl IntegralImage {
    fn new(image: &PixelBuffer) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let mut table = Self {
            stride: width + 1,
            sums: vec![[0u64; 3]; (width + 1) * (height + 1)],
        };

        for (x, y, pixel) in image.as_image().enumerate_pixels() {
            // table row/column 0 is the zero border
            let (x, y) = (x as usize + 1, y as usize + 1);
            let up = table.at(x, y - 1);
            let left = table.at(x - 1, y);
            let corner = table.at(x - 1, y - 1);

            let cell = table.index(x, y);
            for c in 0..3 {
                table.sums[cell][c] = pixel[c] as u64 + up[c] + left[c] - corner[c];
            }
        }

        table
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }

    fn at(&self, x: usize, y: usize) -> [u64; 3] {
        self.sums[self.index(x, y)]
    }

    /// Sum over the inclusive window [x0, x1] x [y0, y1].
    fn window(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> [u64; 3] {
        let (a, b, c, d) = (
            self.at(x1 + 1, y1 + 1),
            self.at(x0, y1 + 1),
            self.at(x1 + 1, y0),
            self.at(x0, y0),
        );

        [
            a[0] + d[0] - b[0] - c[0],
            a[1] + d[1] - b[1] - c[1],
            a[2] + d[2] - b[2] - c[2],
        ]
    }
}

/// Mean of R, G, B over the `(2 * radius + 1)²` neighbourhood clipped to the image.
/// Edge pixels average fewer samples. Alpha is untouched.
pub fn box_blur(image: &PixelBuffer, radius: i32) -> PixelEffectResult<PixelBuffer> {
    if radius < 0 {
        return Err(PixelEffectError::InvalidParameter(format!(
            "blur radius must be >= 0, got {radius}"
        )));
    }

    if radius == 0 || image.is_empty() {
        return Ok(image.clone());
    }

    let radius = radius as usize;
    let (width, height) = (image.width() as usize, image.height() as usize);
    let integral = IntegralImage::new(image);

    let mut output = image.clone();
    for (x, y, pixel) in output.image_mut().enumerate_pixels_mut() {
        let (x, y) = (x as usize, y as usize);
        let (x0, x1) = (x.saturating_sub(radius), (x + radius).min(width - 1));
        let (y0, y1) = (y.saturating_sub(radius), (y + radius).min(height - 1));

        let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64;
        let sums = integral.window(x0, y0, x1, y1);

        for c in 0..3 {
            pixel[c] = ((sums[c] + count / 2) / count) as u8;
        }
    }

    Ok(output)
}

/// Box blur configuration
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BoxBlurConfig {
    #[derivative(Default(value = "3"))]
    radius: i32,
}

impl BoxBlurConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for BoxBlurConfig {
    fn apply(&self, image: &PixelBuffer) -> PixelEffectResult<PixelBuffer> {
        box_blur(image, self.radius)
    }
}
