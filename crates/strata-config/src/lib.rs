//! Configuration for the strata terrain generator.
//!
//! Generation parameters persist to disk as a RON file and can be overridden
//! from the command line. Values are only checked for syntax here; range
//! validation happens in `strata-terrain` when a generation pass starts.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, GuideWrap, NoiseConfig, OutputConfig, SplatConfig,
    TerrainConfig, default_config_dir,
};
pub use error::ConfigError;
