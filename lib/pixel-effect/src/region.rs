//! Region-limited effects
//!
//! Applies the selected effect only inside detected face rectangles and composites the
//! result onto a display-sized copy of the frame.

use crate::{
    PixelBuffer, PixelEffectError, PixelEffectResult, Rect, blur,
    colour_space::{to_grayscale_average, to_ycbcr},
    composition::{self, OUTLINE_COLOR},
    pixelate,
};
use derivative::Derivative;
use derive_setters::Setters;
use image::Rgba;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::{fmt, str::FromStr};

/// Rects with a confidence at or below this value are discarded.
pub const MIN_FACE_CONFIDENCE: f64 = 4.0;

/// Detector output in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

impl FaceRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    pub fn is_confident(&self) -> bool {
        self.confidence > MIN_FACE_CONFIDENCE
    }

    /// Scale by (`sx`, `sy`) and truncate to integer pixels. Negative origins are clipped
    /// to zero; `None` when nothing of the rect remains.
    pub fn to_rect(&self, sx: f64, sy: f64) -> Option<Rect> {
        let (x, width) = span(self.x * sx, self.width * sx)?;
        let (y, height) = span(self.y * sy, self.height * sy)?;
        Some(Rect::new(x, y, width, height))
    }
}

fn span(start: f64, len: f64) -> Option<(u32, u32)> {
    if !start.is_finite() || !len.is_finite() {
        return None;
    }

    let start = start.trunc() as i64;
    let end = start.saturating_add(len.trunc() as i64);
    let start = start.max(0);
    if end <= start {
        return None;
    }

    let length = u32::try_from(end - start).unwrap_or(u32::MAX);
    Some((u32::try_from(start).ok()?, length))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum RegionEffect {
    #[default]
    None = 0,
    Grayscale,
    Blurred,
    YCbCr,
    Pixelate,
}

impl RegionEffect {
    pub fn name(&self) -> &'static str {
        match self {
            RegionEffect::None => "none",
            RegionEffect::Grayscale => "grayscale",
            RegionEffect::Blurred => "blurred",
            RegionEffect::YCbCr => "ycbcr",
            RegionEffect::Pixelate => "pixelate",
        }
    }

    pub fn all() -> &'static [RegionEffect] {
        &[
            RegionEffect::None,
            RegionEffect::Grayscale,
            RegionEffect::Blurred,
            RegionEffect::YCbCr,
            RegionEffect::Pixelate,
        ]
    }

    /// Number keys `1`..`5` select the effects in declaration order.
    pub fn from_key(key: char) -> Option<Self> {
        let digit = key.to_digit(10)?.checked_sub(1)?;
        u8::try_from(digit).ok().and_then(|v| Self::try_from(v).ok())
    }

    pub fn apply(
        &self,
        image: &PixelBuffer,
        params: &RegionEffectParams,
    ) -> PixelEffectResult<PixelBuffer> {
        match self {
            RegionEffect::None => Ok(image.clone()),
            RegionEffect::Grayscale => Ok(to_grayscale_average(image)),
            RegionEffect::Blurred => blur::box_blur(image, params.blur_radius),
            RegionEffect::YCbCr => Ok(to_ycbcr(image)),
            RegionEffect::Pixelate => pixelate::pixelate(image, params.pixelate_block_size),
        }
    }
}

impl fmt::Display for RegionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegionEffect {
    type Err = PixelEffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .find(|effect| effect.name() == name)
            .copied()
            .ok_or_else(|| PixelEffectError::InvalidParameter(format!("unknown effect `{s}`")))
    }
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct RegionEffectParams {
    #[derivative(Default(value = "10"))]
    pub blur_radius: i32,

    #[derivative(Default(value = "5"))]
    pub pixelate_block_size: i32,
}

impl RegionEffectParams {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Display frame with the processed regions drawn in.
#[derive(Debug, Clone)]
pub struct RegionComposite {
    pub frame: PixelBuffer,

    /// One entry per outline drawn, in draw order, in display coordinates.
    pub drawn: Vec<Rect>,
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct RegionCompositor {
    #[derivative(Default(value = "160"))]
    target_width: u32,

    #[derivative(Default(value = "120"))]
    target_height: u32,

    #[derivative(Default(value = "OUTLINE_COLOR"))]
    outline_color: Rgba<u8>,

    params: RegionEffectParams,
}

impl RegionCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale `source` to the target size, then for every confident face in detector
    /// order: crop the source rect, run `effect`, paste it over the scaled rect and
    /// outline it. Later faces overwrite earlier ones where they overlap.
    pub fn composite(
        &self,
        source: &PixelBuffer,
        faces: &[FaceRect],
        effect: RegionEffect,
    ) -> PixelEffectResult<RegionComposite> {
        if source.is_empty() {
            return Err(PixelEffectError::InvalidParameter(
                "source frame is empty".to_string(),
            ));
        }

        let (width, height) = (self.target_width, self.target_height);
        let mut frame = composition::scale_to(source, width, height)?;
        let sx = width as f64 / source.width() as f64;
        let sy = height as f64 / source.height() as f64;

        let mut drawn = Vec::new();
        for (index, face) in faces.iter().enumerate() {
            if !face.is_confident() {
                log::debug!(
                    "face {index} dropped: confidence {} <= {MIN_FACE_CONFIDENCE}",
                    face.confidence
                );
                continue;
            }

            let Some(crop) = face.to_rect(1.0, 1.0).and_then(|rect| source.crop(&rect)) else {
                log::debug!("face {index} skipped: empty or outside the source frame");
                continue;
            };

            let Some(target) = face
                .to_rect(sx, sy)
                .and_then(|rect| rect.clip_to(width, height))
            else {
                log::debug!("face {index} skipped: empty in display space");
                continue;
            };

            let processed = effect.apply(&crop, &self.params)?;
            composition::composite(&mut frame, &processed, &target)?;
            composition::draw_outline(&mut frame, &target, self.outline_color);
            drawn.push(target);
        }

        Ok(RegionComposite { frame, drawn })
    }
}
