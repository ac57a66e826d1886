//! OCR collaborator boundary.
//!
//! The core only requires that an engine turns an image into text lines in
//! reading order; the concrete engine is injected into the scanner. The
//! `native` feature ships a pure-Rust implementation backed by
//! `pure-onnx-ocr`.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;

use crate::error::OcrError;

/// A recognized text fragment with its position on the page.
#[derive(Debug, Clone)]
pub struct OcrFragment {
    /// Top-left x coordinate.
    pub x: f32,
    /// Top-left y coordinate.
    pub y: f32,
    /// Recognized text.
    pub text: String,
}

/// Image-to-text collaborator.
pub trait OcrSource {
    /// Recognize text in `image` and return lines in reading order.
    fn recognize_lines(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError>;
}

/// Group positioned fragments into physical lines.
///
/// Fragments within `band` vertical distance are considered one line and
/// joined left to right.
pub fn fragments_to_lines(mut fragments: Vec<OcrFragment>, band: f32) -> Vec<String> {
    fragments.sort_by(|a, b| {
        let row_a = (a.y / band) as i32;
        let row_b = (b.y / band) as i32;
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        }
    });

    let mut lines: Vec<String> = Vec::new();
    let mut current_y = f32::NEG_INFINITY;
    let mut current = String::new();

    for fragment in fragments {
        if (fragment.y - current_y).abs() < band {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&fragment.text);
        } else {
            if !current.is_empty() {
                lines.push(current);
            }
            current = fragment.text;
            current_y = fragment.y;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
