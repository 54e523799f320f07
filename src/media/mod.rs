// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media processing: frame buffers, annotation and the per-file pipeline.

pub mod annotate;
pub mod frame;
pub mod processor;
#[cfg(feature = "video-opencv")]
pub mod video;
