// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection data structures.
//!
//! This module defines the types the detector/tracker reports for a single
//! inference call: bounding boxes, class ids, confidences and optional
//! track identities, plus the media-kind classification derived from
//! file extensions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// An axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    /// Create a new bounding box from its top-left corner and size.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Area of the box; zero for degenerate boxes.
    pub fn area(&self) -> f32 {
        if self.w <= 0.0 || self.h <= 0.0 {
            0.0
        } else {
            self.w * self.h
        }
    }

    /// Intersection-over-union with another box, in `[0.0, 1.0]`.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.w).min(other.x + other.w);
        let y2 = (self.y + self.h).min(other.y + other.h);

        let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// One detected object.
///
/// `track_id` is present only in tracking mode. The tracker contract
/// guarantees stability for the same physical object across consecutive
/// frames of one run, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub track_id: Option<i64>,
}

impl Detection {
    /// A plain detection without a track identity.
    pub fn new(class_id: usize, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
            track_id: None,
        }
    }

    /// A detection carrying a tracker-assigned identity.
    pub fn tracked(class_id: usize, confidence: f32, bbox: BoundingBox, track_id: i64) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
            track_id: Some(track_id),
        }
    }
}

/// The result of one inference call: every object found in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionFrame {
    pub detections: Vec<Detection>,
}

impl DetectionFrame {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Distinct-defect count for a single standalone frame.
    ///
    /// Detections that carry a track identity are deduplicated by id;
    /// detections without one each count as a separate defect.
    pub fn distinct_defects(&self) -> u32 {
        let mut ids: HashSet<i64> = HashSet::new();
        let mut untracked = 0u32;
        for det in &self.detections {
            match det.track_id {
                Some(id) => {
                    ids.insert(id);
                }
                None => untracked += 1,
            }
        }
        ids.len() as u32 + untracked
    }
}

/// Media classification derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Extensions treated as video input; everything else is an image.
const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "avi", "mov"];

impl MediaKind {
    /// Classify a file path by its extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext {
            Some(e) if VIDEO_EXTENSIONS.contains(&e.as_str()) => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }

    /// Human label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Image => "Picture",
        }
    }
}

/// Content type for serving a stored file, derived from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") | Some("avi") | Some("mov") => "video/mp4",
        Some("jpg") | Some("jpeg") | Some("png") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
