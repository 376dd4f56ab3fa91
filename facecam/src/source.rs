//! Collaborators at the edge of the pipeline: where frames and face rects come from.

use anyhow::{Context, Result};
use pixel_effect::{FaceRect, PixelBuffer};
use std::path::Path;

pub trait FrameSource {
    fn next_frame(&mut self) -> Result<PixelBuffer>;
}

/// Face detector. Rects are in the pixel coordinates of the frame passed in.
pub trait RegionDetector {
    fn detect(&mut self, frame: &PixelBuffer) -> Vec<FaceRect>;
}

/// Serves the same decoded image on every call.
#[derive(Debug, Clone)]
pub struct StillFrameSource {
    frame: PixelBuffer,
}

impl StillFrameSource {
    pub fn new(frame: PixelBuffer) -> Self {
        Self { frame }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("decode {} failed", path.display()))?
            .to_rgba8();
        log::info!("loaded {} ({}x{})", path.display(), image.width(), image.height());

        Ok(Self::new(PixelBuffer::from_image(image)))
    }
}

impl FrameSource for StillFrameSource {
    fn next_frame(&mut self) -> Result<PixelBuffer> {
        Ok(self.frame.clone())
    }
}

/// Colour gradient that drifts by a few pixels each frame.
#[derive(Debug, Clone)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    frame: u32,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: 0,
        }
    }
}

impl FrameSource for TestPatternSource {
    fn next_frame(&mut self) -> Result<PixelBuffer> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("test pattern size {}x{} is empty", self.width, self.height);
        }

        let (width, height) = (self.width, self.height);
        let shift = self.frame.wrapping_mul(4) % width;
        self.frame = self.frame.wrapping_add(1);

        Ok(PixelBuffer::from_fn(width, height, |x, y| {
            let column = (x + shift) % width;
            [
                (column * 255 / width) as u8,
                (y * 255 / height) as u8,
                ((column + y) / 2 % 256) as u8,
                255,
            ]
        }))
    }
}

/// Returns the same rect list on every call.
#[derive(Debug, Clone, Default)]
pub struct FixedDetector {
    faces: Vec<FaceRect>,
}

impl FixedDetector {
    pub fn new(faces: Vec<FaceRect>) -> Self {
        Self { faces }
    }
}

impl RegionDetector for FixedDetector {
    fn detect(&mut self, _frame: &PixelBuffer) -> Vec<FaceRect> {
        self.faces.clone()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetector;

impl RegionDetector for NoDetector {
    fn detect(&mut self, _frame: &PixelBuffer) -> Vec<FaceRect> {
        Vec::new()
    }
}

/// `x,y,width,height,confidence` as given on the command line.
pub fn parse_face_rect(s: &str) -> Result<FaceRect, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid face rect `{s}`: {e}"))?;

    match values.as_slice() {
        &[x, y, width, height, confidence] => Ok(FaceRect::new(x, y, width, height, confidence)),
        _ => Err(format!(
            "face rect `{s}` needs 5 values (x,y,width,height,confidence), got {}",
            values.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_face_rect() {
        let face = parse_face_rect("10, 12.5,20,30,6").unwrap();
        assert_eq!(face, FaceRect::new(10.0, 12.5, 20.0, 30.0, 6.0));

        assert!(parse_face_rect("1,2,3,4").is_err());
        assert!(parse_face_rect("1,2,3,4,5,6").is_err());
        assert!(parse_face_rect("a,2,3,4,5").is_err());
    }

    #[test]
    fn test_still_source_repeats() -> Result<()> {
        let frame = PixelBuffer::filled(4, 3, [1, 2, 3, 255]);
        let mut source = StillFrameSource::new(frame.clone());
        assert_eq!(source.next_frame()?, frame);
        assert_eq!(source.next_frame()?, frame);
        Ok(())
    }

    #[test]
    fn test_still_source_missing_file() {
        assert!(StillFrameSource::open("/nonexistent/frame.png").is_err());
    }

    #[test]
    fn test_pattern_moves() -> Result<()> {
        let mut source = TestPatternSource::new(64, 48);
        let first = source.next_frame()?;
        let second = source.next_frame()?;

        assert_eq!(first.dimensions(), (64, 48));
        assert_ne!(first, second);
        assert!(TestPatternSource::new(0, 4).next_frame().is_err());
        Ok(())
    }

    #[test]
    fn test_detectors() {
        let frame = PixelBuffer::new(8, 8);
        let face = FaceRect::new(1.0, 1.0, 4.0, 4.0, 9.0);

        assert_eq!(FixedDetector::new(vec![face]).detect(&frame), vec![face]);
        assert!(NoDetector.detect(&frame).is_empty());
    }
}
