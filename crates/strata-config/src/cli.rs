//! Command-line argument parsing for the strata generator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(
    name = "strata",
    about = "Generate a terrain height field and splat map from a guidance image"
)]
pub struct CliArgs {
    /// Grayscale guidance image.
    #[arg(long)]
    pub guide: Option<PathBuf>,

    /// Height grid edge size in cells.
    #[arg(long)]
    pub edge_size: Option<usize>,

    /// Vertical terrain scale in world units.
    #[arg(long)]
    pub height_scale: Option<f64>,

    /// Guidance/noise blend (0 = pure noise, 1 = pure guidance).
    #[arg(long = "mix")]
    pub mix_fraction: Option<f64>,

    /// Number of noise octaves.
    #[arg(long)]
    pub octaves: Option<u32>,

    /// Amplitude decay per octave.
    #[arg(long)]
    pub persistence: Option<f64>,

    /// Noise span along X.
    #[arg(long)]
    pub span_x: Option<f64>,

    /// Noise span along Y.
    #[arg(long)]
    pub span_y: Option<f64>,

    /// Noise permutation seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Road band thickness in splat rows.
    #[arg(long)]
    pub road_width: Option<f64>,

    /// Road band shift from the midline in splat rows.
    #[arg(long, allow_hyphen_values = true)]
    pub road_offset: Option<f64>,

    /// Splat grid size (used for both width and height).
    #[arg(long)]
    pub splat_size: Option<usize>,

    /// Output directory.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Also write a color-banded height preview.
    #[arg(long)]
    pub preview: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref guide) = args.guide {
            self.terrain.guide_image = Some(guide.clone());
        }
        if let Some(edge) = args.edge_size {
            self.terrain.edge_size = edge;
        }
        if let Some(scale) = args.height_scale {
            self.terrain.height_scale = scale;
        }
        if let Some(mix) = args.mix_fraction {
            self.terrain.mix_fraction = mix;
        }
        if let Some(octaves) = args.octaves {
            self.noise.octaves = octaves;
        }
        if let Some(p) = args.persistence {
            self.noise.persistence = p;
        }
        if let Some(x) = args.span_x {
            self.noise.span_x = x;
        }
        if let Some(y) = args.span_y {
            self.noise.span_y = y;
        }
        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(w) = args.road_width {
            self.splat.road_width = w;
        }
        if let Some(offset) = args.road_offset {
            self.splat.road_offset = offset;
        }
        if let Some(size) = args.splat_size {
            self.splat.width = size;
            self.splat.height = size;
        }
        if let Some(ref out) = args.out {
            self.output.directory = out.clone();
        }
        if args.preview {
            self.output.write_preview = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
