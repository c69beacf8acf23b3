//! Presets command implementation
//!
//! Lists, shows and saves the preset catalog (built-ins merged with the
//! configured preset file).

use crate::cli::load_config_or_default;
use crate::core::catalog::PresetCatalog;
use crate::domain::{ExportFormat, Preset};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for the presets command
#[derive(Args, Debug)]
pub struct PresetsArgs {
    #[command(subcommand)]
    pub command: PresetsCommand,
}

#[derive(Subcommand, Debug)]
pub enum PresetsCommand {
    /// List presets
    List {
        /// Only presets of this format (e.g. mp4_h264)
        #[arg(long)]
        format: Option<String>,
    },

    /// Show one preset as JSON
    Show {
        /// Preset id
        id: String,
    },

    /// Write the catalog to a preset file
    Save {
        /// Destination; defaults to the configured preset file
        path: Option<PathBuf>,
    },
}

impl PresetsArgs {
    /// Execute the presets command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let mut catalog = PresetCatalog::new();
        if let Some(file) = &config.presets.file {
            if let Err(e) = catalog.load(file) {
                eprintln!("Failed to load presets from {}: {e}", file.display());
                return Ok(2);
            }
        }

        match &self.command {
            PresetsCommand::List { format } => {
                let presets = match format {
                    Some(tag) => match tag.parse::<ExportFormat>() {
                        Ok(format) => catalog.list_by_format(format),
                        Err(e) => {
                            eprintln!("{e}");
                            return Ok(2);
                        }
                    },
                    None => catalog.list_all(),
                };
                Self::print_table(&presets);
                Ok(0)
            }
            PresetsCommand::Show { id } => match catalog.get(id) {
                Some(preset) => {
                    println!("{}", serde_json::to_string_pretty(&preset)?);
                    Ok(0)
                }
                None => {
                    eprintln!("Preset not found: {id}");
                    Ok(1)
                }
            },
            PresetsCommand::Save { path } => {
                let Some(path) = path.clone().or_else(|| config.presets.file.clone()) else {
                    eprintln!("No destination given and no [presets] file configured");
                    return Ok(2);
                };
                catalog.save(&path)?;
                println!("✅ Saved {} presets to {}", catalog.len(), path.display());
                Ok(0)
            }
        }
    }

    fn print_table(presets: &[Preset]) {
        println!(
            "{:<18} {:<18} {:<11} {:>8} {:>6}  NAME",
            "ID", "FORMAT", "RESOLUTION", "KBPS", "FPS"
        );
        for preset in presets {
            println!(
                "{:<18} {:<18} {:<11} {:>8} {:>6}  {}",
                preset.id.as_str(),
                preset.format.as_str(),
                preset.resolution.to_string(),
                preset.bitrate,
                preset.fps,
                preset.name
            );
        }
    }
}
