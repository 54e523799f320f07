// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core data structures for detections, media runs and the class registry.

pub mod detection;
pub mod registry;
pub mod run;
