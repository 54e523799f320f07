// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detector/tracker seam.
//!
//! The detection model is an external capability consumed through these
//! traits. `Detector::detect` answers one standalone inference call;
//! `Detector::open_session` hands out fresh per-run tracking state so that
//! identity continuity is scoped to exactly one video run.

pub mod builtin;

use crate::error::ProcessingError;
use crate::media::frame::Frame;
use crate::models::detection::DetectionFrame;

/// An object detection backend.
pub trait Detector: Send {
    /// Run one inference call against a standalone image.
    fn detect(&mut self, frame: &Frame) -> Result<DetectionFrame, ProcessingError>;

    /// Open fresh tracking state for one video run.
    ///
    /// Sessions must never be shared between runs; identities are only
    /// meaningful within the session that produced them.
    fn open_session(&self) -> Box<dyn TrackSession>;
}

/// Stateful per-run tracking handle.
///
/// Implementations carry internal state across calls and must assign the
/// same `track_id` to the same physical object on consecutive frames.
pub trait TrackSession {
    fn track(&mut self, frame: &Frame) -> Result<DetectionFrame, ProcessingError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted detector for pipeline tests.

    use super::*;
    use crate::models::detection::Detection;

    /// Replays a fixed sequence of detection frames, one per call.
    pub struct ScriptedDetector {
        frames: Vec<Vec<Detection>>,
        cursor: usize,
        fail_at: Option<usize>,
    }

    impl ScriptedDetector {
        pub fn new(frames: Vec<Vec<Detection>>) -> Self {
            Self {
                frames,
                cursor: 0,
                fail_at: None,
            }
        }

        /// Fail the n-th call (0-based) instead of returning detections.
        pub fn failing_at(mut self, call: usize) -> Self {
            self.fail_at = Some(call);
            self
        }

        fn next(&mut self) -> Result<DetectionFrame, ProcessingError> {
            let call = self.cursor;
            self.cursor += 1;
            if self.fail_at == Some(call) {
                return Err(ProcessingError::Detector("scripted failure".into()));
            }
            let detections = self.frames.get(call).cloned().unwrap_or_default();
            Ok(DetectionFrame::new(detections))
        }
    }

    impl Detector for ScriptedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<DetectionFrame, ProcessingError> {
            self.next()
        }

        fn open_session(&self) -> Box<dyn TrackSession> {
            Box::new(ScriptedDetector {
                frames: self.frames.clone(),
                cursor: 0,
                fail_at: self.fail_at,
            })
        }
    }

    impl TrackSession for ScriptedDetector {
        fn track(&mut self, _frame: &Frame) -> Result<DetectionFrame, ProcessingError> {
            self.next()
        }
    }
}
