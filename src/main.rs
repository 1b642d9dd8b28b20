// main.rs

// --- External Crate Imports ---
use anyhow::{anyhow, Error, Result};
use clap::Parser;
use log::info;
use std::time::Instant;

mod charts;
mod diagnostics;
mod experiment;
mod palette;
mod render;
mod stats;
mod tables;
mod walker;

// --- Main Function ---
fn main() -> Result<(), Error> {
    let total_time_start = Instant::now();
    let cli_args = cli::CliArgs::parse();

    // Initialize logger
    let log_level = cli_args
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or_else(|_| {
            eprintln!(
                "Warning: Invalid log level '{}' provided. Defaulting to Info.",
                cli_args.log_level
            );
            log::LevelFilter::Info
        });
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_micros()
        .init();

    info!("Starting pca_plots with args: {:?}", cli_args);

    if !cli_args.folder_path.is_dir() {
        return Err(anyhow!(
            "Folder path {} is not a directory.",
            cli_args.folder_path.display()
        ));
    }

    let summary = walker::process_pca_tree(&cli_args.folder_path, cli_args.num_colors)?;

    info!(
        "pca_plots finished in {:.2?}: {} directories visited, {} files written.",
        total_time_start.elapsed(),
        summary.directories_visited,
        summary.written.len()
    );
    Ok(())
}

// --- Module Implementations ---

mod cli {
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Render PCA variance, score and eigenspectra plots for an experiment tree.", long_about = None, propagate_version = true)]
    pub(crate) struct CliArgs {
        /// Root folder holding the DS_*.csv classification file.
        #[arg(value_name = "FOLDER_PATH")]
        pub(crate) folder_path: PathBuf,

        /// Number of principal components to plot.
        #[arg(value_name = "NUM_COLORS", value_parser = parse_component_count)]
        pub(crate) num_colors: usize,

        #[arg(long, default_value = "Info")]
        pub(crate) log_level: String,
    }

    fn parse_component_count(raw: &str) -> Result<usize, String> {
        match raw.parse::<usize>() {
            Ok(0) => Err("must be at least 1".to_string()),
            Ok(n) => Ok(n),
            Err(e) => Err(format!("'{}' is not a positive integer: {}", raw, e)),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_positional_arguments() {
            let args = CliArgs::try_parse_from(["pca_plots", "/data/run", "4"]).unwrap();
            assert_eq!(args.folder_path, PathBuf::from("/data/run"));
            assert_eq!(args.num_colors, 4);
            assert_eq!(args.log_level, "Info");
        }

        #[test]
        fn rejects_zero_components() {
            assert!(CliArgs::try_parse_from(["pca_plots", "/data/run", "0"]).is_err());
            assert!(CliArgs::try_parse_from(["pca_plots", "/data/run", "-2"]).is_err());
        }
    }
}
