// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error taxonomy.
//!
//! Three failure domains with different recovery policies: startup errors
//! are fatal, processing errors are recovered at the request boundary and
//! recorded as failed runs, storage read errors are swallowed into an
//! empty history while write errors propagate.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal initialization failures; the process must not serve requests.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot read class registry {path}: {source}")]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse class registry {path}: {source}")]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot create storage directory {path}: {source}")]
    StorageDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-run failures, recovered at the request boundary.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("cannot decode input {path}: {cause}")]
    Decode { path: PathBuf, cause: String },
    #[error("cannot open frame source {path}: {cause}")]
    SourceOpen { path: PathBuf, cause: String },
    #[error("cannot open video writer for {path}: {cause}")]
    SinkOpen { path: PathBuf, cause: String },
    #[error("cannot write frame {index}: {cause}")]
    SinkWrite { index: u64, cause: String },
    #[error("frame {index} has a malformed buffer")]
    MalformedFrame { index: u64 },
    #[error("detector failed: {0}")]
    Detector(String),
    #[error("cannot encode annotated output {path}: {cause}")]
    Encode { path: PathBuf, cause: String },
    #[error("no frames were written to {path}")]
    EmptyOutput { path: PathBuf },
    #[error("video support is not compiled in (enable the `video-opencv` feature)")]
    VideoUnsupported,
}

/// History ledger and report artifact failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
