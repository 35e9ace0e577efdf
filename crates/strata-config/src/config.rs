//! Generation settings with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

const APP_NAME: &str = "strata";

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Height field settings.
    pub terrain: TerrainConfig,
    /// Octave noise settings.
    pub noise: NoiseConfig,
    /// Splat map settings.
    pub splat: SplatConfig,
    /// Where and what to write.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How the guidance image is addressed at its borders.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GuideWrap {
    /// Edge texels extend outward.
    #[default]
    Clamp,
    /// The image tiles.
    Repeat,
}

/// Height field configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Cells along each edge of the square height grid.
    pub edge_size: usize,
    /// Vertical extent of the terrain in world units. Applied by the host,
    /// never baked into the height grid.
    pub height_scale: f64,
    /// Blend between noise (0.0) and the guidance image (1.0).
    pub mix_fraction: f64,
    /// Guidance image path. `None` means a flat mid-grey image.
    pub guide_image: Option<PathBuf>,
    /// Border addressing for the guidance image.
    pub guide_wrap: GuideWrap,
}

/// Octave noise configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// Number of octaves summed (at least 1).
    pub octaves: u32,
    /// Amplitude decay per octave, in `(0, 1]`.
    pub persistence: f64,
    /// Noise-space span covered by the grid along X.
    pub span_x: f64,
    /// Noise-space span covered by the grid along Y.
    pub span_y: f64,
    /// Noise-space origin along X.
    pub origin_x: f64,
    /// Noise-space origin along Y.
    pub origin_y: f64,
    /// Permutation seed for the gradient noise.
    pub seed: u32,
}

/// Splat map configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplatConfig {
    /// Splat grid width (columns).
    pub width: usize,
    /// Splat grid height (rows).
    pub height: usize,
    /// Number of texture layers; ground, cliff and road need at least 3.
    pub layer_count: usize,
    /// Road band thickness in rows.
    pub road_width: f64,
    /// Signed row shift of the road band from the vertical midline.
    pub road_offset: f64,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the generated images are written into.
    pub directory: PathBuf,
    /// Write `height.png` (16-bit grayscale).
    pub write_height: bool,
    /// Write `splat.png` (RGBA layer weights).
    pub write_splat: bool,
    /// Write `preview.png` (color-banded height preview).
    pub write_preview: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,strata_terrain=trace").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            edge_size: 128,
            height_scale: 50.0,
            mix_fraction: 0.7,
            guide_image: None,
            guide_wrap: GuideWrap::Clamp,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 3,
            persistence: 0.5,
            span_x: 5.0,
            span_y: 5.0,
            origin_x: 0.0,
            origin_y: 0.0,
            seed: 0,
        }
    }
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            layer_count: 3,
            road_width: 24.0,
            road_offset: 0.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("out"),
            write_height: true,
            write_splat: true,
            write_preview: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for strata, if the OS exposes one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_NAME))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it differs from `self`, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
