// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Line recognition (PP-OCR CRNN model with CTC output)

use anyhow::{bail, Context, Result};
use ndarray::{Array4, ArrayView2, ArrayViewD, Axis};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::preprocessing::REC_INPUT_HEIGHT;
use super::runtime::OnnxStage;

/// Class 0 of the CTC output
const BLANK: usize = 0;

/// Text read from one cropped region
#[derive(Debug, Clone, Default)]
pub struct RecognizedText {
    pub text: String,
    /// Mean of `char_confidences`, 0 when nothing was read
    pub confidence: f32,
    pub char_confidences: Vec<f32>,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OcrRecognitionModel {
    stage: OnnxStage,
    /// Class index to character; blank at 0, space last
    charset: Arc<Vec<char>>,
}

impl OcrRecognitionModel {
    /// Load `rec_model.onnx` together with its `ppocr_keys_v1.txt` charset
    pub async fn new<P: AsRef<Path>>(
        model_path: P,
        dict_path: P,
        intra_threads: usize,
    ) -> Result<Self> {
        let dict_path = dict_path.as_ref();
        if !dict_path.is_file() {
            bail!("OCR character dictionary not found: {}", dict_path.display());
        }

        let file = File::open(dict_path)
            .with_context(|| format!("Failed to open {}", dict_path.display()))?;
        let charset = parse_dictionary(BufReader::new(file))?;
        info!("OCR charset has {} classes", charset.len());

        let stage = OnnxStage::open(model_path.as_ref(), "recognition", intra_threads)?;
        Ok(Self {
            stage,
            charset: Arc::new(charset),
        })
    }

    /// Number of output classes, blank and space included
    pub fn dictionary_size(&self) -> usize {
        self.charset.len()
    }

    /// Read a `[1, 3, 48, W]` tensor from `preprocess_for_recognition`
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        match input.dim() {
            (1, 3, h, w) if h == REC_INPUT_HEIGHT as usize && w >= 4 => {}
            _ => bail!(
                "Recognition expects a [1, 3, {}, W>=4] tensor, got {:?}",
                REC_INPUT_HEIGHT,
                input.shape()
            ),
        }

        let output = self.stage.run(input)?;
        let steps = class_probabilities(output.view())?;
        Ok(ctc_greedy_decode(steps, &self.charset))
    }
}

/// Build the class table from a key file holding one character per line
///
/// Empty lines are skipped. The blank class is prepended and a space class
/// appended, which is the layout the Chinese PP-OCR models were trained with.
pub fn parse_dictionary<R: BufRead>(reader: R) -> Result<Vec<char>> {
    let mut charset = vec!['\0'];
    for line in reader.lines() {
        let line = line.context("Failed to read dictionary line")?;
        charset.extend(line.trim_end_matches('\r').chars().next());
    }
    charset.push(' ');
    Ok(charset)
}

/// `[1, T, C]` or `[T, C]` to `[T, C]`
fn class_probabilities(output: ArrayViewD<'_, f32>) -> Result<ArrayView2<'_, f32>> {
    let steps = match output.ndim() {
        2 => output,
        3 => output.index_axis_move(Axis(0), 0),
        _ => bail!("Unexpected recognition output shape {:?}", output.shape()),
    };
    Ok(steps.into_dimensionality()?)
}

/// Best-path CTC decoding
///
/// Each timestep votes for its most likely class; runs of the same class
/// collapse to one character and blanks separate genuine repeats. Classes the
/// charset does not cover are skipped.
pub fn ctc_greedy_decode(steps: ArrayView2<f32>, charset: &[char]) -> RecognizedText {
    let mut result = RecognizedText::default();
    let mut previous = BLANK;

    for step in steps.outer_iter() {
        let Some((class, prob)) = step
            .iter()
            .copied()
            .enumerate()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
        else {
            continue;
        };

        if class != previous && class != BLANK {
            if let Some(&ch) = charset.get(class) {
                result.text.push(ch);
                result.char_confidences.push(prob);
            }
        }
        previous = class;
    }

    let read = result.char_confidences.len();
    if read > 0 {
        result.confidence =
            (result.char_confidences.iter().sum::<f32>() / read as f32).clamp(0.0, 1.0);
    }
    result.text = result.text.trim().to_string();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use std::io::Cursor;

    fn charset() -> Vec<char> {
        parse_dictionary(Cursor::new("你\n好\n世\n界\n")).unwrap()
    }

    /// 0.9 on the chosen class at each step, 0.01 elsewhere
    fn steps(classes: &[usize], num_classes: usize) -> Array2<f32> {
        Array2::from_shape_fn((classes.len(), num_classes), |(t, c)| {
            if classes[t] == c {
                0.9
            } else {
                0.01
            }
        })
    }

    #[test]
    fn test_charset_layout() {
        assert_eq!(charset(), vec!['\0', '你', '好', '世', '界', ' ']);
        let crlf = parse_dictionary(Cursor::new("中\r\n\r\n国\r\n")).unwrap();
        assert_eq!(crlf, vec!['\0', '中', '国', ' ']);
    }

    #[test]
    fn test_repeats_collapse_unless_split_by_blank() {
        let charset = charset();
        // 你 你 _ 好 好 _ 好
        let decoded = ctc_greedy_decode(steps(&[1, 1, 0, 2, 2, 0, 2], 6).view(), &charset);
        assert_eq!(decoded.text, "你好好");
        assert_eq!(decoded.char_confidences.len(), 3);
        assert!((decoded.confidence - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_space_class_inside_line() {
        let charset = charset();
        assert_eq!(ctc_greedy_decode(steps(&[1, 5, 3], 6).view(), &charset).text, "你 世");
    }

    #[test]
    fn test_only_blanks() {
        let decoded = ctc_greedy_decode(steps(&[0, 0, 0], 6).view(), &charset());
        assert!(decoded.is_empty());
        assert_eq!(decoded.confidence, 0.0);
    }

    #[test]
    fn test_class_beyond_charset_skipped() {
        let decoded = ctc_greedy_decode(steps(&[1, 9], 10).view(), &charset());
        assert_eq!(decoded.text, "你");
    }

    #[test]
    fn test_class_probabilities_shapes() {
        let batched = Array3::<f32>::zeros((1, 7, 6)).into_dyn();
        assert_eq!(class_probabilities(batched.view()).unwrap().dim(), (7, 6));

        let flat = ndarray::Array1::<f32>::zeros(5).into_dyn();
        assert!(class_probabilities(flat.view()).is_err());
    }

    #[tokio::test]
    async fn test_missing_dictionary() {
        let err = OcrRecognitionModel::new("/nonexistent/rec_model.onnx", "/nonexistent/keys.txt", 1)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    #[ignore] // needs ./models/paddleocr-onnx
    async fn test_blank_line_confidence_in_range() {
        let Ok(model) = OcrRecognitionModel::new(
            "./models/paddleocr-onnx/rec_model.onnx",
            "./models/paddleocr-onnx/ppocr_keys_v1.txt",
            2,
        )
        .await
        else {
            return;
        };
        let result = model.recognize(&Array4::<f32>::zeros((1, 3, 48, 320))).unwrap();
        assert!((0.0..=1.0).contains(&result.confidence));
    }
}
