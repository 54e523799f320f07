// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Storage layout and pipeline settings. Everything lives under one data
//! directory: uploads (inputs and annotated outputs), report artifacts and
//! the history ledger.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory for all persisted state.
    pub data_dir: PathBuf,
    /// YAML class registry consumed at startup.
    pub classes_file: PathBuf,
    /// Fourcc tag for encoded video output; avc1 plays in browsers.
    pub codec: String,
}

impl AppConfig {
    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn report_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            classes_file: PathBuf::from("data.yaml"),
            codec: "avc1".to_string(),
        }
    }
}
