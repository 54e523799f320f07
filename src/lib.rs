// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! SDIS - Surface Defect Inspection System
//!
//! Core library for detecting, tracking and counting surface defects in
//! uploaded images and videos. The pipeline annotates the media, counts
//! distinct defect identities across frames, and keeps an auditable
//! history ledger that report artifacts are regenerated from.
//!
//! The detection model itself is an external capability consumed through
//! the [`detect::Detector`] trait; a lightweight fallback implementation
//! ships in [`detect::builtin`].

pub mod app;
pub mod config;
pub mod detect;
pub mod error;
pub mod io;
pub mod media;
pub mod models;
