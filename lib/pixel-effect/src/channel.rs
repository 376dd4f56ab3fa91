//! Channel isolation
//!
//! Keeps one of R, G, B and zeroes the other two so each plane can be viewed alone.

use crate::{Effect, PixelBuffer, PixelEffectResult};
use derivative::Derivative;
use derive_setters::Setters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RgbChannel {
    Red,
    Green,
    Blue,
}

impl RgbChannel {
    pub fn index(self) -> usize {
        match self {
            RgbChannel::Red => 0,
            RgbChannel::Green => 1,
            RgbChannel::Blue => 2,
        }
    }

    pub fn all() -> &'static [RgbChannel] {
        &[RgbChannel::Red, RgbChannel::Green, RgbChannel::Blue]
    }
}

pub fn isolate(image: &PixelBuffer, channel: RgbChannel) -> PixelBuffer {
    let keep = channel.index();
    image.map_samples(|mut sample| {
        for (i, value) in sample.iter_mut().take(3).enumerate() {
            if i != keep {
                *value = 0;
            }
        }
        sample
    })
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ChannelConfig {
    #[derivative(Default(value = "RgbChannel::Red"))]
    channel: RgbChannel,
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for ChannelConfig {
    fn apply(&self, image: &PixelBuffer) -> PixelEffectResult<PixelBuffer> {
        Ok(isolate(image, self.channel))
    }
}
