//! The `strata` binary: generate a height field and splat map to disk.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-app -- --guide mesa.png --mix 0.8 --out out/`.

use std::path::PathBuf;

use clap::Parser;
use strata_config::{CliArgs, default_config_dir};
use tracing::error;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("strata-config"));

    let mut config = match strata_app::load_config(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = strata_app::run(&config) {
        error!("{e}");
        std::process::exit(1);
    }
}
