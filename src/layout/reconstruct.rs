// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Reading-order reconstruction of OCR fragments
//!
//! Fragments are grouped into visual lines by quantizing their vertical
//! center, lines are ordered top-to-bottom and fragments inside a line
//! left-to-right.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use super::fragment::{FragmentDefect, TextFragment};
use crate::transliteration::Transliterator;

/// Default quantization step in pixels
pub const DEFAULT_QUANTIZATION_STEP: f64 = 10.0;

/// Separator placed between fragment texts of one line
const FRAGMENT_SEPARATOR: &str = " ";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconstructError {
    #[error("invalid fragment at index {index}: {defect}")]
    InvalidFragment {
        index: usize,
        #[source]
        defect: FragmentDefect,
    },

    #[error("quantization step must be a positive finite number, got {0}")]
    InvalidQuantizationStep(f64),
}

/// One visual line of text in reading order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructedLine {
    /// Fragment texts joined by a single space
    pub text: String,
    /// Same line run through the transliteration provider, if one was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    /// Quantized vertical coordinate shared by the line's fragments
    pub bucket_key: f64,
    /// Number of fragments merged into the line
    pub fragment_count: usize,
}

/// Fragments assigned to the same quantized vertical coordinate
#[derive(Debug)]
pub struct LineBucket<'a> {
    key: f64,
    fragments: Vec<&'a TextFragment>,
}

impl<'a> LineBucket<'a> {
    pub fn key(&self) -> f64 {
        self.key
    }

    pub fn fragments(&self) -> &[&'a TextFragment] {
        &self.fragments
    }

    /// Order fragments left-to-right and join their texts
    ///
    /// `sort_by` is stable, so fragments sharing an x keep detection order.
    fn into_line(mut self) -> ReconstructedLine {
        self.fragments.sort_by(|a, b| a.left().total_cmp(&b.left()));

        let text = self
            .fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR);

        ReconstructedLine {
            text,
            transliteration: None,
            bucket_key: self.key,
            fragment_count: self.fragments.len(),
        }
    }
}

/// Groups OCR fragments into ordered text lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineReconstructor {
    quantization_step: f64,
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self {
            quantization_step: DEFAULT_QUANTIZATION_STEP,
        }
    }
}

impl LineReconstructor {
    /// Create a reconstructor with a custom quantization step (pixels)
    pub fn new(quantization_step: f64) -> Result<Self, ReconstructError> {
        if !quantization_step.is_finite() || quantization_step <= 0.0 {
            return Err(ReconstructError::InvalidQuantizationStep(quantization_step));
        }
        Ok(Self { quantization_step })
    }

    pub fn quantization_step(&self) -> f64 {
        self.quantization_step
    }

    /// Index of the bucket a vertical center falls into
    ///
    /// `f64::round` rounds half away from zero: with a step of 10 a center
    /// of 5 lands in bucket 10 and 25 in bucket 30, where round-half-to-even
    /// would give 0 and 20.
    fn bucket_index(&self, y_center: f64) -> i64 {
        (y_center / self.quantization_step).round() as i64
    }

    /// Quantized vertical coordinate for a center: `round(y / step) * step`
    pub fn bucket_key(&self, y_center: f64) -> f64 {
        self.bucket_index(y_center) as f64 * self.quantization_step
    }

    /// Validate every fragment and group them into ascending buckets
    ///
    /// Validation runs over the whole input before any grouping so that a
    /// malformed fragment never yields partial output.
    pub fn group<'a>(
        &self,
        fragments: &'a [TextFragment],
    ) -> Result<Vec<LineBucket<'a>>, ReconstructError> {
        for (index, fragment) in fragments.iter().enumerate() {
            fragment
                .validate()
                .map_err(|defect| ReconstructError::InvalidFragment { index, defect })?;
        }

        let mut buckets: BTreeMap<i64, Vec<&'a TextFragment>> = BTreeMap::new();
        for fragment in fragments {
            buckets
                .entry(self.bucket_index(fragment.y_center()))
                .or_default()
                .push(fragment);
        }

        Ok(buckets
            .into_iter()
            .map(|(index, fragments)| LineBucket {
                key: index as f64 * self.quantization_step,
                fragments,
            })
            .collect())
    }

    /// Rebuild reading-order lines from unordered fragments
    pub fn reconstruct(
        &self,
        fragments: &[TextFragment],
    ) -> Result<Vec<ReconstructedLine>, ReconstructError> {
        let lines: Vec<ReconstructedLine> = self
            .group(fragments)?
            .into_iter()
            .map(LineBucket::into_line)
            .collect();

        debug!(
            "Reconstructed {} lines from {} fragments (step {})",
            lines.len(),
            fragments.len(),
            self.quantization_step
        );

        Ok(lines)
    }

    /// Rebuild lines and attach a transliteration of each joined line
    pub fn reconstruct_transliterated(
        &self,
        fragments: &[TextFragment],
        transliterator: &dyn Transliterator,
    ) -> Result<Vec<ReconstructedLine>, ReconstructError> {
        let mut lines = self.reconstruct(fragments)?;
        for line in &mut lines {
            line.transliteration = Some(transliterator.transliterate(&line.text));
        }
        Ok(lines)
    }
}
