//! Process-wide effect selection and threshold sliders.

use crate::config::Config;
use anyhow::{Context, Result};
use pixel_effect::{PixelEffectError, PixelEffectResult, RegionEffect, ThresholdChannel};

const DEFAULT_CUTOFF: i32 = 127;

fn slot(channel: ThresholdChannel) -> usize {
    match channel {
        ThresholdChannel::Red => 0,
        ThresholdChannel::Green => 1,
        ThresholdChannel::Blue => 2,
        ThresholdChannel::YuvLuma => 3,
        ThresholdChannel::HsiIntensity => 4,
    }
}

/// Mutated only between frames by input handling; the pipeline reads a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingContext {
    effect: RegionEffect,
    cutoffs: [i32; 5],
}

impl Default for ProcessingContext {
    fn default() -> Self {
        Self {
            effect: RegionEffect::None,
            cutoffs: [DEFAULT_CUTOFF; 5],
        }
    }
}

impl ProcessingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut context = Self::new();
        let effect = config
            .region
            .effect
            .parse::<RegionEffect>()
            .context("invalid region effect in config")?;
        context.set_effect(effect);

        let thresholds = &config.thresholds;
        for (channel, cutoff) in ThresholdChannel::all().iter().zip([
            thresholds.red,
            thresholds.green,
            thresholds.blue,
            thresholds.yuv,
            thresholds.hsi,
        ]) {
            context
                .set_threshold(*channel, cutoff)
                .with_context(|| format!("invalid {channel:?} threshold in config"))?;
        }

        Ok(context)
    }

    pub fn effect(&self) -> RegionEffect {
        self.effect
    }

    pub fn set_effect(&mut self, effect: RegionEffect) {
        self.effect = effect;
    }

    /// Number keys `1`..`5` pick the region effect. Returns true when the selection changed.
    pub fn handle_key(&mut self, key: char) -> bool {
        match RegionEffect::from_key(key) {
            Some(effect) if effect != self.effect => {
                log::info!("region effect: {} -> {}", self.effect, effect);
                self.effect = effect;
                true
            }
            _ => false,
        }
    }

    pub fn threshold(&self, channel: ThresholdChannel) -> i32 {
        self.cutoffs[slot(channel)]
    }

    pub fn set_threshold(&mut self, channel: ThresholdChannel, cutoff: i32) -> PixelEffectResult<()> {
        if !(0..=255).contains(&cutoff) {
            return Err(PixelEffectError::InvalidParameter(format!(
                "{channel:?} cutoff {cutoff} is outside 0..=255"
            )));
        }

        self.cutoffs[slot(channel)] = cutoff;
        Ok(())
    }

    /// Frozen copy for one pipeline pass.
    pub fn snapshot(&self) -> ProcessingContext {
        *self
    }
}
