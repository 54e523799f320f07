// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media run records.
//!
//! A `MediaRun` is the unit of work for one uploaded file. It is created
//! when processing finishes (successfully or not), appended to the history
//! ledger, and never modified afterwards.

use super::detection::MediaKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One end-to-end processing attempt for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRun {
    /// When the run was finalized.
    pub date: DateTime<Utc>,
    /// Output file for successful runs, stored input file for failed ones.
    pub file: String,
    pub kind: MediaKind,
    /// Distinct defects counted over the whole run; absent for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect_count: Option<u32>,
    /// Human-readable failure cause; absent for successful runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MediaRun {
    /// Finalize a successful run.
    pub fn success(file: String, kind: MediaKind, defect_count: u32) -> Self {
        Self {
            date: Utc::now(),
            file,
            kind,
            defect_count: Some(defect_count),
            error: None,
        }
    }

    /// Finalize a failed run, retaining the cause for auditability.
    pub fn failure(file: String, kind: MediaKind, error: String) -> Self {
        Self {
            date: Utc::now(),
            file,
            kind,
            defect_count: None,
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
