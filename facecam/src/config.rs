use anyhow::{Context, Result};
use derivative::Derivative;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub capture: Capture,
    pub thresholds: Thresholds,
    pub region: Region,
    pub detection: Detection,
    pub layout: Layout,
}

/// Working size every frame is scaled to before processing.
#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Capture {
    #[derivative(Default(value = "160"))]
    pub width: u32,

    #[derivative(Default(value = "120"))]
    pub height: u32,
}

/// Initial slider positions.
#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Thresholds {
    #[derivative(Default(value = "127"))]
    pub red: i32,

    #[derivative(Default(value = "127"))]
    pub green: i32,

    #[derivative(Default(value = "127"))]
    pub blue: i32,

    #[derivative(Default(value = "127"))]
    pub yuv: i32,

    #[derivative(Default(value = "127"))]
    pub hsi: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Region {
    /// One of `none`, `grayscale`, `blurred`, `ycbcr`, `pixelate`.
    #[derivative(Default(value = "\"none\".to_string()"))]
    pub effect: String,

    #[derivative(Default(value = "10"))]
    pub blur_radius: i32,

    #[derivative(Default(value = "5"))]
    pub pixelate_block_size: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Detection {
    // frames
    #[derivative(Default(value = "7"))]
    pub frequency: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Layout {
    #[derivative(Default(value = "870"))]
    pub canvas_width: u32,

    #[derivative(Default(value = "700"))]
    pub canvas_height: u32,

    #[derivative(Default(value = "220"))]
    pub background: u8,
}

impl Config {
    /// Read a TOML config. No path, or a path that does not exist, gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, using default config", path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read config {} failed", path.display()));
            }
        };

        let config = toml::from_str::<Config>(&text)
            .with_context(|| format!("parse config {} failed", path.display()))?;
        debug!("{config:?}");

        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
