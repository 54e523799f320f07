// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-media processing pipeline.
//!
//! Orchestrates detection over one uploaded file, accumulates distinct
//! defect identities, and produces an annotated output file. Image mode is
//! a single inference call; video mode runs a frame-sequential tracking
//! loop over `FrameSource`/`FrameSink` so the pipeline logic is
//! independent of the video backend.

use crate::detect::{Detector, TrackSession};
use crate::error::ProcessingError;
use crate::media::annotate::annotate;
use crate::media::frame::Frame;
use crate::models::detection::MediaKind;
use crate::models::registry::ClassRegistry;
use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Frame rate substituted when the source reports none or not-a-number.
pub const DEFAULT_FPS: f64 = 25.0;

/// Sequential frame producer for one video run.
///
/// `read` returns `None` at end of stream; a failed read is also end of
/// stream, never an error. Implementations release their handle on drop;
/// `release` exists for releasing eagerly before post-checks.
pub trait FrameSource {
    fn fps(&self) -> f64;
    fn dimensions(&self) -> (u32, u32);
    fn read(&mut self) -> Option<Frame>;
    fn release(&mut self) {}
}

/// Sequential frame consumer for one video run. Frames must be written in
/// exactly the order they were read.
pub trait FrameSink {
    fn write(&mut self, frame: &Frame) -> Result<(), ProcessingError>;
    fn release(&mut self) -> Result<(), ProcessingError> {
        Ok(())
    }
}

/// Result of one successful media run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    /// Annotated output filename, relative to the output directory.
    pub output_file: String,
    pub defect_count: u32,
}

/// Runs detection/tracking over one media file and writes the annotated
/// output next to the upload storage.
pub struct MediaProcessor<'a> {
    registry: &'a ClassRegistry,
    output_dir: PathBuf,
    #[cfg_attr(not(feature = "video-opencv"), allow(dead_code))]
    codec: String,
}

impl<'a> MediaProcessor<'a> {
    pub fn new(registry: &'a ClassRegistry, output_dir: PathBuf, codec: String) -> Self {
        Self {
            registry,
            output_dir,
            codec,
        }
    }

    /// Process one uploaded file and return the annotated output reference
    /// and the distinct-defect count.
    pub fn process(
        &self,
        path: &Path,
        kind: MediaKind,
        detector: &mut dyn Detector,
    ) -> Result<ProcessOutcome, ProcessingError> {
        match kind {
            MediaKind::Image => self.process_image(path, detector),
            MediaKind::Video => self.process_video(path, detector),
        }
    }

    fn process_image(
        &self,
        path: &Path,
        detector: &mut dyn Detector,
    ) -> Result<ProcessOutcome, ProcessingError> {
        let img = image::open(path)
            .map_err(|e| ProcessingError::Decode {
                path: path.to_path_buf(),
                cause: e.to_string(),
            })?
            .to_rgb8();

        let frame = Frame::new(img.width(), img.height(), img.as_raw().clone(), 0);
        let result = detector.detect(&frame)?;
        let defect_count = result.distinct_defects();

        let mut annotated = img;
        annotate(&mut annotated, &result.detections, self.registry);

        let output_file = output_name("annotated_", path);
        let output_path = self.output_dir.join(&output_file);
        annotated
            .save(&output_path)
            .map_err(|e| ProcessingError::Encode {
                path: output_path.clone(),
                cause: e.to_string(),
            })?;

        info!(
            "image {} -> {} ({} defect(s))",
            path.display(),
            output_file,
            defect_count
        );
        Ok(ProcessOutcome {
            output_file,
            defect_count,
        })
    }

    #[cfg(feature = "video-opencv")]
    fn process_video(
        &self,
        path: &Path,
        detector: &mut dyn Detector,
    ) -> Result<ProcessOutcome, ProcessingError> {
        use crate::media::video::{VideoFileSink, VideoFileSource};

        let mut source = VideoFileSource::open(path)?;
        let fps = sanitize_fps(source.fps());
        let (width, height) = source.dimensions();

        let output_file = output_name("processed_", path);
        let output_path = self.output_dir.join(&output_file);
        let mut sink = VideoFileSink::open(&output_path, &self.codec, fps, width, height)?;

        let mut session = detector.open_session();
        let run_result =
            run_tracking_pipeline(&mut source, &mut sink, session.as_mut(), self.registry);

        // Release unconditionally before inspecting the output file.
        source.release();
        let close_result = sink.release();
        let defect_count = run_result?;
        close_result?;

        let size = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(ProcessingError::EmptyOutput { path: output_path });
        }

        info!(
            "video {} -> {} ({} defect(s))",
            path.display(),
            output_file,
            defect_count
        );
        Ok(ProcessOutcome {
            output_file,
            defect_count,
        })
    }

    #[cfg(not(feature = "video-opencv"))]
    fn process_video(
        &self,
        _path: &Path,
        _detector: &mut dyn Detector,
    ) -> Result<ProcessOutcome, ProcessingError> {
        Err(ProcessingError::VideoUnsupported)
    }
}

/// Fall back to a safe default when the container reports a bogus rate.
pub fn sanitize_fps(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        DEFAULT_FPS
    }
}

fn output_name(prefix: &str, path: &Path) -> String {
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    format!("{prefix}{base}")
}

/// The frame-sequential tracking loop.
///
/// Reads frames in arrival order, feeds every non-empty frame to one
/// tracking session, unions tracked identities over the whole run, and
/// writes annotated frames in the same order they were read. Returns the
/// distinct-identity count.
pub fn run_tracking_pipeline(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    session: &mut dyn TrackSession,
    registry: &ClassRegistry,
) -> Result<u32, ProcessingError> {
    let mut identities: HashSet<i64> = HashSet::new();
    let mut read_count = 0u64;
    let mut written = 0u64;

    while let Some(frame) = source.read() {
        read_count += 1;
        if frame.is_empty() {
            // Transient decode glitch; keep the loop alive.
            debug!("skipping empty frame {}", frame.index);
            continue;
        }

        let result = session.track(&frame)?;
        for det in &result.detections {
            if let Some(id) = det.track_id {
                identities.insert(id);
            }
        }

        // Every tracked frame must reach the sink; a buffer that cannot be
        // materialized aborts the run.
        let index = frame.index;
        let Some(mut img) = frame.into_rgb_image() else {
            return Err(ProcessingError::MalformedFrame { index });
        };
        annotate(&mut img, &result.detections, registry);
        let annotated = Frame::from_rgb_image(img, index);
        sink.write(&annotated)?;
        written += 1;
    }

    debug!(
        "pipeline done: {} read, {} written, {} distinct identities",
        read_count,
        written,
        identities.len()
    );
    Ok(identities.len() as u32)
}
