// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! OpenCV-backed video frame source and sink.
//!
//! Thin adapters from `VideoCapture`/`VideoWriter` to the pipeline's
//! `FrameSource`/`FrameSink` traits. OpenCV hands frames over as BGR; the
//! adapters convert to and from the pipeline's RGB frames.

use crate::error::ProcessingError;
use crate::media::frame::Frame;
use crate::media::processor::{FrameSink, FrameSource};
use opencv::core::{Mat, Size};
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoWriter};
use std::path::{Path, PathBuf};

/// Sequential reader over a video container.
pub struct VideoFileSource {
    cap: VideoCapture,
    index: u64,
}

impl VideoFileSource {
    pub fn open(path: &Path) -> Result<Self, ProcessingError> {
        let path_str = path.to_str().ok_or_else(|| ProcessingError::SourceOpen {
            path: path.to_path_buf(),
            cause: "non-UTF-8 path".into(),
        })?;
        let cap = VideoCapture::from_file(path_str, videoio::CAP_ANY).map_err(|e| {
            ProcessingError::SourceOpen {
                path: path.to_path_buf(),
                cause: e.to_string(),
            }
        })?;
        if !cap.is_opened().unwrap_or(false) {
            return Err(ProcessingError::SourceOpen {
                path: path.to_path_buf(),
                cause: "container not recognized".into(),
            });
        }
        Ok(Self { cap, index: 0 })
    }
}

impl FrameSource for VideoFileSource {
    fn fps(&self) -> f64 {
        self.cap.get(videoio::CAP_PROP_FPS).unwrap_or(0.0)
    }

    fn dimensions(&self) -> (u32, u32) {
        let width = self.cap.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0);
        let height = self.cap.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0);
        (width as u32, height as u32)
    }

    fn read(&mut self) -> Option<Frame> {
        let mut mat = Mat::default();
        // A failed read is end of stream, not an error.
        if !self.cap.read(&mut mat).unwrap_or(false) {
            return None;
        }
        let index = self.index;
        self.index += 1;
        if mat.empty() {
            // Decode glitch; surface as an empty frame so the pipeline
            // skips it without terminating.
            return Some(Frame::new(0, 0, Vec::new(), index));
        }
        Some(mat_to_frame(&mat, index).unwrap_or_else(|| Frame::new(0, 0, Vec::new(), index)))
    }

    fn release(&mut self) {
        let _ = self.cap.release();
    }
}

/// Sequential writer into a video container.
pub struct VideoFileSink {
    writer: VideoWriter,
    path: PathBuf,
}

impl VideoFileSink {
    pub fn open(
        path: &Path,
        codec: &str,
        fps: f64,
        width: u32,
        height: u32,
    ) -> Result<Self, ProcessingError> {
        let sink_err = |cause: String| ProcessingError::SinkOpen {
            path: path.to_path_buf(),
            cause,
        };

        let path_str = path
            .to_str()
            .ok_or_else(|| sink_err("non-UTF-8 path".into()))?;
        let [c0, c1, c2, c3] = fourcc_chars(codec);
        let fourcc = VideoWriter::fourcc(c0, c1, c2, c3).map_err(|e| sink_err(e.to_string()))?;
        let writer = VideoWriter::new(
            path_str,
            fourcc,
            fps,
            Size::new(width as i32, height as i32),
            true,
        )
        .map_err(|e| sink_err(e.to_string()))?;
        if !writer.is_opened().unwrap_or(false) {
            return Err(sink_err(format!(
                "codec {codec} rejected for {width}x{height} @ {fps} fps"
            )));
        }
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }
}

impl FrameSink for VideoFileSink {
    fn write(&mut self, frame: &Frame) -> Result<(), ProcessingError> {
        let mat = frame_to_mat(frame).map_err(|e| ProcessingError::SinkWrite {
            index: frame.index,
            cause: e.to_string(),
        })?;
        self.writer
            .write(&mat)
            .map_err(|e| ProcessingError::SinkWrite {
                index: frame.index,
                cause: e.to_string(),
            })
    }

    fn release(&mut self) -> Result<(), ProcessingError> {
        self.writer
            .release()
            .map_err(|e| ProcessingError::SinkWrite {
                index: 0,
                cause: format!("closing {}: {e}", self.path.display()),
            })
    }
}

/// Pad or truncate a codec tag to the four fourcc characters.
fn fourcc_chars(codec: &str) -> [char; 4] {
    let mut out = [' '; 4];
    for (i, c) in codec.chars().take(4).enumerate() {
        out[i] = c;
    }
    out
}

fn mat_to_frame(mat: &Mat, index: u64) -> Option<Frame> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0).ok()?;
    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let data = rgb.data_bytes().ok()?.to_vec();
    Some(Frame::new(width, height, data, index))
}

fn frame_to_mat(frame: &Frame) -> Result<Mat, opencv::Error> {
    let flat = Mat::from_slice(&frame.data)?;
    let shaped = flat.reshape(3, frame.height as i32)?;
    let mut bgr = Mat::default();
    imgproc::cvt_color(&shaped, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}
