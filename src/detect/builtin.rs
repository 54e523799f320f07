// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Built-in fallback detector and tracker.
//!
//! A lightweight luminance-anomaly detector paired with a greedy IoU
//! association tracker. It keeps the binary functional end-to-end without
//! a model file; production deployments plug a real inference backend into
//! the `Detector` trait instead.

use crate::detect::{Detector, TrackSession};
use crate::error::ProcessingError;
use crate::media::frame::Frame;
use crate::models::detection::{BoundingBox, Detection, DetectionFrame};
use log::debug;

/// Flags grid cells whose mean luminance deviates strongly from the frame
/// mean and merges adjacent flagged cells into defect boxes.
#[derive(Debug, Clone)]
pub struct LuminanceDetector {
    /// Side length of the scanning grid cell in pixels.
    cell_size: u32,
    /// Minimum absolute deviation (0-255 luma units) to flag a cell.
    deviation_threshold: f32,
}

impl LuminanceDetector {
    pub fn new() -> Self {
        Self {
            cell_size: 16,
            deviation_threshold: 48.0,
        }
    }

    fn luma(frame: &Frame) -> Vec<u8> {
        frame
            .data
            .chunks_exact(3)
            .map(|rgb| {
                let r = rgb[0] as u32;
                let g = rgb[1] as u32;
                let b = rgb[2] as u32;
                ((r * 299 + g * 587 + b * 114) / 1000) as u8
            })
            .collect()
    }

    fn find_regions(&self, frame: &Frame) -> Vec<(BoundingBox, f32)> {
        let luma = Self::luma(frame);
        if luma.is_empty() {
            return Vec::new();
        }

        let w = frame.width as usize;
        let h = frame.height as usize;
        let cell = self.cell_size.max(1) as usize;
        let cells_x = w.div_ceil(cell);
        let cells_y = h.div_ceil(cell);

        let frame_mean = luma.iter().map(|&v| v as u64).sum::<u64>() as f32 / luma.len() as f32;

        // Per-cell mean deviation from the frame mean.
        let mut deviation = vec![0.0f32; cells_x * cells_y];
        for cy in 0..cells_y {
            for cx in 0..cells_x {
                let mut sum = 0u64;
                let mut count = 0u64;
                for y in (cy * cell)..((cy + 1) * cell).min(h) {
                    let row = y * w;
                    for x in (cx * cell)..((cx + 1) * cell).min(w) {
                        sum += luma[row + x] as u64;
                        count += 1;
                    }
                }
                if count > 0 {
                    deviation[cy * cells_x + cx] = sum as f32 / count as f32 - frame_mean;
                }
            }
        }

        let flagged: Vec<bool> = deviation
            .iter()
            .map(|d| d.abs() >= self.deviation_threshold)
            .collect();

        // Merge 4-connected flagged cells into pixel-space boxes.
        let mut visited = vec![false; flagged.len()];
        let mut regions = Vec::new();
        for start in 0..flagged.len() {
            if !flagged[start] || visited[start] {
                continue;
            }
            let mut stack = vec![start];
            visited[start] = true;
            let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
            let (mut max_x, mut max_y) = (0usize, 0usize);
            let mut peak = 0.0f32;

            while let Some(idx) = stack.pop() {
                let cx = idx % cells_x;
                let cy = idx / cells_x;
                min_x = min_x.min(cx);
                min_y = min_y.min(cy);
                max_x = max_x.max(cx);
                max_y = max_y.max(cy);
                peak = peak.max(deviation[idx].abs());

                let mut push = |nx: usize, ny: usize| {
                    let nidx = ny * cells_x + nx;
                    if flagged[nidx] && !visited[nidx] {
                        visited[nidx] = true;
                        stack.push(nidx);
                    }
                };
                if cx > 0 {
                    push(cx - 1, cy);
                }
                if cx + 1 < cells_x {
                    push(cx + 1, cy);
                }
                if cy > 0 {
                    push(cx, cy - 1);
                }
                if cy + 1 < cells_y {
                    push(cx, cy + 1);
                }
            }

            let px = (min_x * cell) as f32;
            let py = (min_y * cell) as f32;
            let pw = (((max_x + 1) * cell).min(w) - min_x * cell) as f32;
            let ph = (((max_y + 1) * cell).min(h) - min_y * cell) as f32;
            let confidence = (peak / 255.0).min(1.0);
            regions.push((BoundingBox::new(px, py, pw, ph), confidence));
        }
        regions
    }
}

impl Default for LuminanceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for LuminanceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<DetectionFrame, ProcessingError> {
        let detections = self
            .find_regions(frame)
            .into_iter()
            .map(|(bbox, confidence)| Detection::new(0, confidence, bbox))
            .collect::<Vec<_>>();
        debug!("luminance detector found {} region(s)", detections.len());
        Ok(DetectionFrame::new(detections))
    }

    fn open_session(&self) -> Box<dyn TrackSession> {
        Box::new(IouSession::new(self.clone()))
    }
}

struct TrackState {
    id: i64,
    bbox: BoundingBox,
    missing: u32,
}

/// Per-run tracking session: detects with the owned detector, then carries
/// identities forward by greedy best-IoU matching against live tracks.
pub struct IouSession {
    detector: LuminanceDetector,
    tracks: Vec<TrackState>,
    next_id: i64,
    iou_threshold: f32,
    max_missing: u32,
}

impl IouSession {
    fn new(detector: LuminanceDetector) -> Self {
        Self {
            detector,
            tracks: Vec::new(),
            next_id: 1,
            iou_threshold: 0.3,
            max_missing: 10,
        }
    }

    fn associate(&mut self, detections: Vec<Detection>) -> Vec<Detection> {
        let mut claimed = vec![false; self.tracks.len()];
        let mut matched_any = vec![false; self.tracks.len()];
        let mut out = Vec::with_capacity(detections.len());

        let prior_tracks = self.tracks.len();
        for det in detections {
            let mut best: Option<(usize, f32)> = None;
            for (i, track) in self.tracks.iter().enumerate().take(prior_tracks) {
                if claimed[i] {
                    continue;
                }
                let iou = det.bbox.iou(&track.bbox);
                if iou >= self.iou_threshold && best.map_or(true, |(_, b)| iou > b) {
                    best = Some((i, iou));
                }
            }

            let id = match best {
                Some((i, _)) => {
                    claimed[i] = true;
                    matched_any[i] = true;
                    self.tracks[i].bbox = det.bbox;
                    self.tracks[i].missing = 0;
                    self.tracks[i].id
                }
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.tracks.push(TrackState {
                        id,
                        bbox: det.bbox,
                        missing: 0,
                    });
                    id
                }
            };
            out.push(Detection {
                track_id: Some(id),
                ..det
            });
        }

        // Age out tracks that stayed unmatched too long.
        for (i, track) in self.tracks.iter_mut().enumerate() {
            if i < matched_any.len() && !matched_any[i] {
                track.missing += 1;
            }
        }
        let max_missing = self.max_missing;
        self.tracks.retain(|t| t.missing <= max_missing);
        out
    }
}

impl TrackSession for IouSession {
    fn track(&mut self, frame: &Frame) -> Result<DetectionFrame, ProcessingError> {
        let detected = self.detector.detect(frame)?;
        Ok(DetectionFrame::new(self.associate(detected.detections)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark frame with a bright square burned in at (x, y).
    fn frame_with_spot(x: u32, y: u32, index: u64) -> Frame {
        let mut frame = Frame::filled(128, 128, 20, index);
        for sy in y..(y + 32).min(128) {
            for sx in x..(x + 32).min(128) {
                let idx = ((sy * 128 + sx) * 3) as usize;
                frame.data[idx] = 250;
                frame.data[idx + 1] = 250;
                frame.data[idx + 2] = 250;
            }
        }
        frame
    }

    #[test]
    fn test_uniform_frame_has_no_defects() {
        let mut detector = LuminanceDetector::new();
        let result = detector.detect(&Frame::filled(64, 64, 128, 0)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_bright_spot_is_detected() {
        let mut detector = LuminanceDetector::new();
        let result = detector.detect(&frame_with_spot(48, 48, 0)).unwrap();
        assert_eq!(result.detections.len(), 1);
        let bbox = result.detections[0].bbox;
        assert!(bbox.x <= 48.0 && bbox.x + bbox.w >= 80.0);
        assert!(result.detections[0].confidence > 0.0);
    }

    #[test]
    fn test_two_spots_give_two_regions() {
        let mut frame = frame_with_spot(0, 0, 0);
        let second = frame_with_spot(96, 96, 0);
        // Copy the second spot into the same frame.
        for y in 96..128u32 {
            for x in 96..128u32 {
                let idx = ((y * 128 + x) * 3) as usize;
                frame.data[idx..idx + 3].copy_from_slice(&second.data[idx..idx + 3]);
            }
        }
        let mut detector = LuminanceDetector::new();
        let result = detector.detect(&frame).unwrap();
        assert_eq!(result.detections.len(), 2);
    }

    #[test]
    fn test_session_keeps_identity_across_frames() {
        let detector = LuminanceDetector::new();
        let mut session = detector.open_session();

        let first = session.track(&frame_with_spot(40, 40, 0)).unwrap();
        // Small drift, same object.
        let second = session.track(&frame_with_spot(44, 40, 1)).unwrap();

        assert_eq!(first.detections.len(), 1);
        assert_eq!(second.detections.len(), 1);
        assert_eq!(first.detections[0].track_id, second.detections[0].track_id);
    }

    #[test]
    fn test_session_assigns_new_identity_to_distant_object() {
        let detector = LuminanceDetector::new();
        let mut session = detector.open_session();

        let first = session.track(&frame_with_spot(0, 0, 0)).unwrap();
        let second = session.track(&frame_with_spot(96, 96, 1)).unwrap();

        assert_ne!(first.detections[0].track_id, second.detections[0].track_id);
    }

    #[test]
    fn test_fresh_session_restarts_identities() {
        let detector = LuminanceDetector::new();

        let mut first_run = detector.open_session();
        let a = first_run.track(&frame_with_spot(40, 40, 0)).unwrap();

        let mut second_run = detector.open_session();
        let b = second_run.track(&frame_with_spot(40, 40, 0)).unwrap();

        // Ids restart per run; equality here shows state was not shared.
        assert_eq!(a.detections[0].track_id, Some(1));
        assert_eq!(b.detections[0].track_id, Some(1));
    }
}
