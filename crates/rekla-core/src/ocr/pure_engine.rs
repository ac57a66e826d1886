//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::OcrError;

use super::{fragments_to_lines, OcrFragment, OcrSource};

/// Vertical distance within which fragments belong to the same line.
const LINE_BAND: f32 = 15.0;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX
/// Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    ///
    /// Expects `det.onnx`, `latin_rec.onnx` and `latin_dict.txt` as laid
    /// out by the standard PaddleOCR latin model export.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine })
    }
}

impl OcrSource for PureOcrEngine {
    fn recognize_lines(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        let start = Instant::now();

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let fragments: Vec<OcrFragment> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                OcrFragment {
                    x,
                    y,
                    text: r.text.replace("[UNK]", " "),
                }
            })
            .collect();

        let lines = fragments_to_lines(fragments, LINE_BAND);

        debug!(
            "OCR produced {} lines in {}ms",
            lines.len(),
            start.elapsed().as_millis()
        );

        Ok(lines)
    }
}

/// Top-left corner of a recognition polygon.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    let mut x = f32::INFINITY;
    let mut y = f32::INFINITY;
    for coord in polygon.exterior().coords() {
        x = x.min(coord.x as f32);
        y = y.min(coord.y as f32);
    }
    if !x.is_finite() {
        (0.0, 0.0)
    } else {
        (x, y)
    }
}
