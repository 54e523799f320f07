// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pixel-level annotation.
//!
//! Burns bounding boxes and class labels directly into the frame buffer so
//! annotated outputs are self-contained. Labels use a small embedded 5x7
//! glyph set; real fonts are out of scope for burned-in overlays.

use crate::models::detection::Detection;
use crate::models::registry::ClassRegistry;
use image::{Rgb, RgbImage};

/// Box colors cycled by class id.
const PALETTE: [[u8; 3]; 6] = [
    [255, 64, 64],
    [64, 200, 64],
    [64, 128, 255],
    [255, 200, 0],
    [200, 64, 255],
    [0, 200, 200],
];

const BOX_THICKNESS: u32 = 2;
const GLYPH_SCALE: u32 = 2;

pub fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(PALETTE[class_id % PALETTE.len()])
}

/// Draw every detection onto the image: a colored box plus a
/// `LABEL #id` tag above its top-left corner.
pub fn annotate(img: &mut RgbImage, detections: &[Detection], registry: &ClassRegistry) {
    for det in detections {
        let color = class_color(det.class_id);
        let (x0, y0, x1, y1) = clamp_box(img, det);
        draw_rect(img, x0, y0, x1, y1, color);

        let label = match det.track_id {
            Some(id) => format!("{} #{}", registry.label(det.class_id), id),
            None => registry.label(det.class_id).to_string(),
        };
        let text_h = 7 * GLYPH_SCALE + 2;
        let ty = y0.saturating_sub(text_h);
        draw_text(img, &label.to_ascii_uppercase(), x0, ty, color);
    }
}

fn clamp_box(img: &RgbImage, det: &Detection) -> (u32, u32, u32, u32) {
    let (w, h) = img.dimensions();
    let clamp = |v: f32, max: u32| -> u32 { v.max(0.0).min(max.saturating_sub(1) as f32) as u32 };
    let x0 = clamp(det.bbox.x, w);
    let y0 = clamp(det.bbox.y, h);
    let x1 = clamp(det.bbox.x + det.bbox.w, w);
    let y1 = clamp(det.bbox.y + det.bbox.h, h);
    (x0, y0, x1.max(x0), y1.max(y0))
}

fn draw_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    for t in 0..BOX_THICKNESS {
        let xx0 = x0 + t;
        let yy0 = y0 + t;
        let xx1 = x1.saturating_sub(t);
        let yy1 = y1.saturating_sub(t);
        if xx0 > xx1 || yy0 > yy1 {
            continue;
        }
        for x in xx0..=xx1.min(w - 1) {
            if yy0 < h {
                img.put_pixel(x, yy0, color);
            }
            if yy1 < h {
                img.put_pixel(x, yy1, color);
            }
        }
        for y in yy0..=yy1.min(h - 1) {
            if xx0 < w {
                img.put_pixel(xx0, y, color);
            }
            if xx1 < w {
                img.put_pixel(xx1, y, color);
            }
        }
    }
}

fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    let mut cursor = x;
    for ch in text.chars() {
        let columns = glyph(ch);
        for (cx, bits) in columns.iter().enumerate() {
            for row in 0..7u32 {
                if bits & (1 << row) == 0 {
                    continue;
                }
                for sx in 0..GLYPH_SCALE {
                    for sy in 0..GLYPH_SCALE {
                        let px = cursor + cx as u32 * GLYPH_SCALE + sx;
                        let py = y + row * GLYPH_SCALE + sy;
                        if px < w && py < h {
                            img.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
        cursor += 6 * GLYPH_SCALE;
    }
}

/// Column-major 5x7 glyphs, bit 0 = top row. Uppercase-only; callers
/// uppercase label text before drawing.
fn glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0x3E, 0x51, 0x49, 0x45, 0x3E],
        '1' => [0x00, 0x42, 0x7F, 0x40, 0x00],
        '2' => [0x42, 0x61, 0x51, 0x49, 0x46],
        '3' => [0x21, 0x41, 0x45, 0x4B, 0x31],
        '4' => [0x18, 0x14, 0x12, 0x7F, 0x10],
        '5' => [0x27, 0x45, 0x45, 0x45, 0x39],
        '6' => [0x3C, 0x4A, 0x49, 0x49, 0x30],
        '7' => [0x01, 0x71, 0x09, 0x05, 0x03],
        '8' => [0x36, 0x49, 0x49, 0x49, 0x36],
        '9' => [0x06, 0x49, 0x49, 0x29, 0x1E],
        'A' => [0x7E, 0x11, 0x11, 0x11, 0x7E],
        'B' => [0x7F, 0x49, 0x49, 0x49, 0x36],
        'C' => [0x3E, 0x41, 0x41, 0x41, 0x22],
        'D' => [0x7F, 0x41, 0x41, 0x22, 0x1C],
        'E' => [0x7F, 0x49, 0x49, 0x49, 0x41],
        'F' => [0x7F, 0x09, 0x09, 0x09, 0x01],
        'G' => [0x3E, 0x41, 0x49, 0x49, 0x7A],
        'H' => [0x7F, 0x08, 0x08, 0x08, 0x7F],
        'I' => [0x00, 0x41, 0x7F, 0x41, 0x00],
        'J' => [0x20, 0x40, 0x41, 0x3F, 0x01],
        'K' => [0x7F, 0x08, 0x14, 0x22, 0x41],
        'L' => [0x7F, 0x40, 0x40, 0x40, 0x40],
        'M' => [0x7F, 0x02, 0x0C, 0x02, 0x7F],
        'N' => [0x7F, 0x04, 0x08, 0x10, 0x7F],
        'O' => [0x3E, 0x41, 0x41, 0x41, 0x3E],
        'P' => [0x7F, 0x09, 0x09, 0x09, 0x06],
        'Q' => [0x3E, 0x41, 0x51, 0x21, 0x5E],
        'R' => [0x7F, 0x09, 0x19, 0x29, 0x46],
        'S' => [0x46, 0x49, 0x49, 0x49, 0x31],
        'T' => [0x01, 0x01, 0x7F, 0x01, 0x01],
        'U' => [0x3F, 0x40, 0x40, 0x40, 0x3F],
        'V' => [0x1F, 0x20, 0x40, 0x20, 0x1F],
        'W' => [0x3F, 0x40, 0x38, 0x40, 0x3F],
        'X' => [0x63, 0x14, 0x08, 0x14, 0x63],
        'Y' => [0x07, 0x08, 0x70, 0x08, 0x07],
        'Z' => [0x61, 0x51, 0x49, 0x45, 0x43],
        '#' => [0x14, 0x7F, 0x14, 0x7F, 0x14],
        '-' => [0x08, 0x08, 0x08, 0x08, 0x08],
        '_' => [0x40, 0x40, 0x40, 0x40, 0x40],
        '.' => [0x00, 0x60, 0x60, 0x00, 0x00],
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00],
        _ => [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    }
}
