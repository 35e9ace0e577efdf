//! Host side of the generator: turns a [`Config`] into a generation run and
//! writes the resulting grids as images.

use std::path::{Path, PathBuf};

use strata_config::{Config, ConfigError, GuideWrap};
use strata_terrain::{
    ExportError, GeneratedTerrain, GuidanceImage, HeightFieldParams, NoiseParams, SplatParams,
    TerrainError, TerrainSettings, WrapMode, export, generate_terrain,
};
use tracing::{info, warn};

/// File written for the height grid.
pub const HEIGHT_FILE: &str = "height.png";
/// File written for the splat grid.
pub const SPLAT_FILE: &str = "splat.png";
/// File written for the height preview.
pub const PREVIEW_FILE: &str = "preview.png";

/// Grey level of the guidance image used when none is configured.
const FLAT_GUIDE: f32 = 0.5;

/// Errors surfaced by a generation run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// `config.ron` exists but could not be read or parsed.
    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),

    /// The guidance image could not be decoded.
    #[error("failed to load guidance image {path}: {source}")]
    Guide {
        /// Image path.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Generation rejected the parameters or a sampler failed.
    #[error("terrain generation failed: {0}")]
    Terrain(#[from] TerrainError),

    /// Writing an output image failed.
    #[error("failed to write output: {0}")]
    Export(#[from] ExportError),
}

/// Paths written by [`run`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunOutputs {
    /// Height image, if written.
    pub height: Option<PathBuf>,
    /// Splat image, if written.
    pub splat: Option<PathBuf>,
    /// Preview image, if written.
    pub preview: Option<PathBuf>,
}

/// Load `config.ron` from `config_dir`, creating a default one if missing.
///
/// A default config that cannot be written is only a warning; an existing
/// file that cannot be read or parsed is an error.
pub fn load_config(config_dir: &Path) -> Result<Config, AppError> {
    match Config::load_or_create(config_dir) {
        Ok(config) => Ok(config),
        Err(ConfigError::WriteError(e)) => {
            eprintln!("Could not write default config to {}: {e}", config_dir.display());
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Translate the persisted config into generator settings.
pub fn settings_from_config(config: &Config) -> TerrainSettings {
    TerrainSettings {
        height: HeightFieldParams {
            edge_size: config.terrain.edge_size,
            mix_fraction: config.terrain.mix_fraction,
            noise: NoiseParams {
                octaves: config.noise.octaves,
                persistence: config.noise.persistence,
                span_x: config.noise.span_x,
                span_y: config.noise.span_y,
                origin_x: config.noise.origin_x,
                origin_y: config.noise.origin_y,
                seed: config.noise.seed,
            },
        },
        height_scale: config.terrain.height_scale,
        splat: SplatParams {
            width: config.splat.width,
            height: config.splat.height,
            layer_count: config.splat.layer_count,
            road_width: config.splat.road_width,
            road_offset: config.splat.road_offset,
        },
    }
}

fn wrap_mode(wrap: GuideWrap) -> WrapMode {
    match wrap {
        GuideWrap::Clamp => WrapMode::Clamp,
        GuideWrap::Repeat => WrapMode::Repeat,
    }
}

/// Load the configured guidance image, or a flat mid-grey one.
pub fn load_guide(config: &Config) -> Result<GuidanceImage, AppError> {
    let image = match &config.terrain.guide_image {
        Some(path) => {
            let image = GuidanceImage::open(path).map_err(|source| AppError::Guide {
                path: path.clone(),
                source,
            })?;
            let (w, h) = image.dimensions();
            info!(path = %path.display(), width = w, height = h, "loaded guidance image");
            image
        }
        None => {
            warn!("no guidance image configured, using a flat {FLAT_GUIDE} grey");
            GuidanceImage::uniform(FLAT_GUIDE)
        }
    };
    Ok(image.with_wrap(wrap_mode(config.terrain.guide_wrap)))
}

/// Write the grids the output config asks for.
pub fn write_outputs(
    terrain: &GeneratedTerrain,
    config: &Config,
) -> Result<RunOutputs, ExportError> {
    let dir: &Path = &config.output.directory;
    let mut outputs = RunOutputs::default();

    if config.output.write_height {
        let path = dir.join(HEIGHT_FILE);
        export::save_height_grid(terrain.heights(), &path)?;
        outputs.height = Some(path);
    }
    if config.output.write_splat {
        let path = dir.join(SPLAT_FILE);
        export::save_splat_grid(&terrain.splat, &path)?;
        outputs.splat = Some(path);
    }
    if config.output.write_preview {
        let path = dir.join(PREVIEW_FILE);
        export::save_height_preview(terrain.heights(), &path)?;
        outputs.preview = Some(path);
    }

    for path in [&outputs.height, &outputs.splat, &outputs.preview]
        .into_iter()
        .flatten()
    {
        info!(path = %path.display(), "wrote output");
    }
    Ok(outputs)
}

/// Load the guide, generate both grids, and write them out.
pub fn run(config: &Config) -> Result<RunOutputs, AppError> {
    let settings = settings_from_config(config);
    // Reject bad parameters before touching the guidance image.
    settings.validate().map_err(TerrainError::from)?;

    let guide = load_guide(config)?;
    let terrain = generate_terrain(&guide, &settings)?;
    Ok(write_outputs(&terrain, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_terrain::ConfigurationError;

    fn small_config(out: &Path) -> Config {
        let mut config = Config::default();
        config.terrain.edge_size = 16;
        config.splat.width = 16;
        config.splat.height = 16;
        config.splat.road_width = 4.0;
        config.output.directory = out.to_path_buf();
        config
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(strata_config::CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_truncated_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(strata_config::CONFIG_FILE_NAME),
            "(terrain: (edge_size: 16, mix_fraction: 1.0",
        )
        .unwrap();
        assert!(matches!(
            load_config(dir.path()),
            Err(AppError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_settings_mirror_config() {
        let mut config = Config::default();
        config.noise.seed = 7;
        config.splat.road_offset = -9.5;
        let settings = settings_from_config(&config);
        assert_eq!(settings.height.edge_size, 128);
        assert_eq!(settings.height.noise.seed, 7);
        assert_eq!(settings.height_scale, 50.0);
        assert_eq!(settings.splat.road_offset, -9.5);
        assert_eq!(settings.splat.layer_count, 3);
    }

    #[test]
    fn test_missing_guide_path_falls_back_to_flat() {
        let config = Config::default();
        let guide = load_guide(&config).unwrap();
        assert_eq!(guide.dimensions(), (1, 1));
        assert_eq!(guide.texel(0, 0), FLAT_GUIDE);
    }

    #[test]
    fn test_unreadable_guide_is_reported() {
        let mut config = Config::default();
        config.terrain.guide_image = Some(PathBuf::from("/definitely/not/here.png"));
        assert!(matches!(load_guide(&config), Err(AppError::Guide { .. })));
    }

    #[test]
    fn test_run_writes_requested_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let guide_path = dir.path().join("guide.png");
        image::GrayImage::from_fn(8, 8, |x, _| image::Luma([(x * 30) as u8]))
            .save(&guide_path)
            .unwrap();

        let out = dir.path().join("out");
        let mut config = small_config(&out);
        config.terrain.guide_image = Some(guide_path);
        config.terrain.guide_wrap = GuideWrap::Repeat;
        config.output.write_preview = true;

        let outputs = run(&config).unwrap();
        assert_eq!(outputs.height, Some(out.join(HEIGHT_FILE)));
        assert_eq!(outputs.preview, Some(out.join(PREVIEW_FILE)));

        let splat = image::open(out.join(SPLAT_FILE)).unwrap();
        assert_eq!((splat.width(), splat.height()), (16, 16));
        assert!(out.join(HEIGHT_FILE).exists());
    }

    #[test]
    fn test_run_skips_disabled_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_config(dir.path());
        config.output.write_splat = false;

        let outputs = run(&config).unwrap();
        assert!(outputs.splat.is_none());
        assert!(!dir.path().join(SPLAT_FILE).exists());
    }

    #[test]
    fn test_invalid_config_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_config(dir.path());
        config.terrain.mix_fraction = 2.0;

        let err = run(&config).unwrap_err();
        assert!(matches!(
            err,
            AppError::Terrain(TerrainError::Configuration(
                ConfigurationError::MixFractionOutOfRange(_)
            ))
        ));
        assert!(!dir.path().join(HEIGHT_FILE).exists());
    }
}
