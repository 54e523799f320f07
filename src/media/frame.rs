// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Owned frame buffers.
//!
//! A `Frame` is one decoded image or video frame as a packed RGB8 buffer,
//! the common currency between frame sources, the detector seam and the
//! annotator.

use image::RgbImage;

/// One decoded frame in packed RGB8 layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes, row-major RGB.
    pub data: Vec<u8>,
    /// Position in the source stream, starting at 0.
    pub index: u64,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>, index: u64) -> Self {
        Self {
            width,
            height,
            data,
            index,
        }
    }

    /// A uniformly filled frame. Used by tests and synthetic sources.
    pub fn filled(width: u32, height: u32, value: u8, index: u64) -> Self {
        let len = width as usize * height as usize * 3;
        Self::new(width, height, vec![value; len], index)
    }

    /// A frame that decoded to nothing; the pipeline skips these.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// View the buffer as an `image` crate buffer for annotation/encoding.
    ///
    /// Returns `None` when the buffer length does not match the declared
    /// dimensions.
    pub fn into_rgb_image(self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data)
    }

    pub fn from_rgb_image(img: RgbImage, index: u64) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw(), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::filled(8, 4, 200, 7);
        assert_eq!(frame.pixel_count(), 32);
        assert_eq!(frame.data.len(), 8 * 4 * 3);
        assert_eq!(frame.index, 7);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_pixel_count_exceeding_u32() {
        // 100k x 100k overflows a u32 pixel product.
        let frame = Frame::new(100_000, 100_000, Vec::new(), 0);
        assert_eq!(frame.pixel_count(), 10_000_000_000);
    }

    #[test]
    fn test_empty_frames() {
        assert!(Frame::new(0, 0, Vec::new(), 0).is_empty());
        assert!(Frame::new(4, 4, Vec::new(), 0).is_empty());
    }

    #[test]
    fn test_rgb_image_roundtrip() {
        let frame = Frame::filled(6, 6, 33, 2);
        let img = frame.clone().into_rgb_image().unwrap();
        let back = Frame::from_rgb_image(img, frame.index);
        assert_eq!(frame, back);
    }

    #[test]
    fn test_mismatched_buffer_rejected() {
        let frame = Frame::new(4, 4, vec![0u8; 5], 0);
        assert!(frame.into_rgb_image().is_none());
    }
}
