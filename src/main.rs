// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! SDIS - Surface Defect Inspection System
//!
//! Processes uploaded images and videos with an object detector/tracker,
//! counts distinct surface defects, and keeps an auditable run history
//! that report artifacts are regenerated from.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sdis::app::InspectionApp;
use sdis::config::AppConfig;
use sdis::detect::builtin::LuminanceDetector;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sdis", about = "Surface Defect Inspection System")]
struct Cli {
    /// Root directory for uploads, reports and the history ledger
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// YAML file mapping class ids to labels
    #[arg(long, default_value = "data.yaml")]
    classes: PathBuf,

    /// Fourcc codec tag for annotated video output
    #[arg(long, default_value = "avc1")]
    codec: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect and count defects in one image or video file
    Process {
        /// Media file to process
        file: PathBuf,
    },
    /// Regenerate the report artifacts from the run history
    Report,
    /// Reset the history and purge the storage areas
    Clear,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig {
        data_dir: cli.data_dir,
        classes_file: cli.classes,
        codec: cli.codec,
    };

    let mut app = InspectionApp::new(config, Box::new(LuminanceDetector::new()))?;

    match cli.command {
        Command::Process { file } => {
            let run = app.handle_upload(&file)?;
            match (&run.error, run.defect_count) {
                (Some(cause), _) => println!("Processing failed: {cause}"),
                (None, count) => println!(
                    "Found {} defect(s), annotated output: {}",
                    count.unwrap_or(0),
                    run.file
                ),
            }
        }
        Command::Report => match app.generate_report()? {
            None => println!("No data to report"),
            Some(artifacts) => println!(
                "Report written: {} and {}",
                artifacts.document.display(),
                artifacts.json.display()
            ),
        },
        Command::Clear => {
            app.clear()?;
            println!("History and storage areas cleared");
        }
    }

    Ok(())
}
