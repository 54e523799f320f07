// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application coordinator.
//!
//! Owns the immutable startup state (class registry, detector, storage
//! layout) and drives one upload from intake through processing to the
//! history ledger. Processing failures are recorded as failed runs, never
//! silently dropped.

use crate::config::AppConfig;
use crate::detect::Detector;
use crate::error::{StartupError, StorageError};
use crate::io::ledger::{clear_directory, HistoryLedger};
use crate::io::report::{self, ReportArtifacts};
use crate::media::processor::MediaProcessor;
use crate::models::detection::MediaKind;
use crate::models::registry::ClassRegistry;
use crate::models::run::MediaRun;
use log::{error, info};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct InspectionApp {
    config: AppConfig,
    registry: ClassRegistry,
    detector: Box<dyn Detector>,
    ledger: HistoryLedger,
}

impl InspectionApp {
    /// Initialize process-wide state. Fails when the class registry is
    /// missing or the storage areas cannot be created.
    pub fn new(config: AppConfig, detector: Box<dyn Detector>) -> Result<Self, StartupError> {
        let registry = ClassRegistry::load(&config.classes_file)?;
        for dir in [config.upload_dir(), config.report_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| StartupError::StorageDir { path: dir.clone(), source })?;
        }
        let ledger = HistoryLedger::new(config.ledger_path());
        info!(
            "initialized with {} class(es), data dir {}",
            registry.len(),
            config.data_dir.display()
        );
        Ok(Self {
            config,
            registry,
            detector,
            ledger,
        })
    }

    /// Run one upload end to end and append its record to the ledger.
    ///
    /// The returned run describes either the annotated output and defect
    /// count or the failure cause; exactly one record is appended either
    /// way. Only ledger/storage write failures propagate as errors.
    pub fn handle_upload(&mut self, source: &Path) -> Result<MediaRun, StorageError> {
        let stored = self.store_upload(source)?;
        let stored_name = file_name(&stored);
        let kind = MediaKind::from_path(&stored);

        let processor = MediaProcessor::new(
            &self.registry,
            self.config.upload_dir(),
            self.config.codec.clone(),
        );
        let run = match processor.process(&stored, kind, self.detector.as_mut()) {
            Ok(outcome) => MediaRun::success(outcome.output_file, kind, outcome.defect_count),
            Err(e) => {
                error!("processing {} failed: {}", stored_name, e);
                MediaRun::failure(stored_name, kind, e.to_string())
            }
        };

        self.ledger.append(run.clone())?;
        Ok(run)
    }

    /// Copy the source into upload storage under a collision-resistant
    /// name, preserving the original filename for extension-based
    /// classification.
    fn store_upload(&self, source: &Path) -> Result<PathBuf, StorageError> {
        let original = file_name(source);
        let stored_name = format!("{}_{}", Uuid::new_v4(), original);
        let dest = self.config.upload_dir().join(&stored_name);
        std::fs::copy(source, &dest).map_err(|source| StorageError::Write {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }

    /// Rebuild the report artifacts from the current ledger snapshot.
    /// Returns `None` when the ledger is empty; nothing is written then.
    pub fn generate_report(&self) -> Result<Option<ReportArtifacts>, StorageError> {
        let history = self.ledger.load();
        match report::build(&history) {
            None => Ok(None),
            Some(table) => {
                report::write_artifacts(&history, &table, &self.config.report_dir()).map(Some)
            }
        }
    }

    pub fn history(&self) -> Vec<MediaRun> {
        self.ledger.load()
    }

    /// Reset the ledger and purge both storage areas, best effort.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.ledger.reset()?;
        clear_directory(&self.config.upload_dir());
        clear_directory(&self.config.report_dir());
        info!("history and storage areas cleared");
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}
