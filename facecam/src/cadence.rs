use crate::source::RegionDetector;
use pixel_effect::{FaceRect, PixelBuffer};

/// Runs the detector on every `frequency`-th frame, starting with the first, and serves the
/// last result on the frames in between.
#[derive(Debug, Clone)]
pub struct DetectionCadence {
    frequency: u32,
    frame: u64,
    faces: Vec<FaceRect>,
}

impl Default for DetectionCadence {
    fn default() -> Self {
        Self::new(7)
    }
}

impl DetectionCadence {
    /// A frequency of 0 is treated as 1.
    pub fn new(frequency: u32) -> Self {
        Self {
            frequency: frequency.max(1),
            frame: 0,
            faces: Vec::new(),
        }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn faces(&mut self, frame: &PixelBuffer, detector: &mut dyn RegionDetector) -> &[FaceRect] {
        if self.frame % self.frequency as u64 == 0 {
            self.faces = detector.detect(frame);
            log::debug!("frame {}: detector returned {} rect(s)", self.frame, self.faces.len());
        }

        self.frame += 1;
        &self.faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingDetector {
        calls: u32,
    }

    impl RegionDetector for CountingDetector {
        fn detect(&mut self, _frame: &PixelBuffer) -> Vec<FaceRect> {
            self.calls += 1;
            vec![FaceRect::new(self.calls as f64, 0.0, 4.0, 4.0, 9.0)]
        }
    }

    #[test]
    fn test_detects_every_seventh_frame() {
        let frame = PixelBuffer::new(8, 8);
        let mut detector = CountingDetector { calls: 0 };
        let mut cadence = DetectionCadence::default();

        let mut seen = Vec::new();
        for _ in 0..15 {
            seen.push(cadence.faces(&frame, &mut detector)[0].x);
        }

        assert_eq!(detector.calls, 3);
        assert!(seen[..7].iter().all(|&x| x == 1.0));
        assert!(seen[7..14].iter().all(|&x| x == 2.0));
        assert_eq!(seen[14], 3.0);
    }

    #[test]
    fn test_zero_frequency_runs_every_frame() {
        let frame = PixelBuffer::new(8, 8);
        let mut detector = CountingDetector { calls: 0 };
        let mut cadence = DetectionCadence::new(0);

        for _ in 0..4 {
            cadence.faces(&frame, &mut detector);
        }
        assert_eq!(cadence.frequency(), 1);
        assert_eq!(detector.calls, 4);
    }
}
