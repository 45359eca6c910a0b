// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR detections as consumed by the line reconstructor

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of corners every fragment box must carry
pub const BOX_CORNERS: usize = 4;

/// A point in image pixel coordinates
///
/// Serialized as a `[x, y]` pair, the shape OCR libraries emit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Why a fragment was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FragmentDefect {
    #[error("box has {0} points, expected 4")]
    WrongCornerCount(usize),

    #[error("box corner {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),

    #[error("confidence is not a finite number")]
    NonFiniteConfidence,

    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f32),
}

/// One OCR detection: a quadrilateral, its recognized text and a confidence
///
/// Corners are expected in top-left, top-right, bottom-right, bottom-left
/// order. The box is kept as a sequence so that malformed detections coming
/// from JSON or a provider can be rejected instead of silently truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    #[serde(rename = "box")]
    pub bbox: Vec<Point>,
    pub text: String,
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(bbox: Vec<Point>, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }

    /// Build a fragment from an axis-aligned rectangle
    pub fn from_rect(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        text: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self::new(
            vec![
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
            ],
            text,
            confidence,
        )
    }

    /// Check the box shape, that every number is finite and that the
    /// confidence lies in `[0, 1]`
    pub fn validate(&self) -> Result<(), FragmentDefect> {
        if self.bbox.len() != BOX_CORNERS {
            return Err(FragmentDefect::WrongCornerCount(self.bbox.len()));
        }
        if let Some(corner) = self.bbox.iter().position(|p| !p.is_finite()) {
            return Err(FragmentDefect::NonFiniteCoordinate(corner));
        }
        if !self.confidence.is_finite() {
            return Err(FragmentDefect::NonFiniteConfidence);
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(FragmentDefect::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }

    /// Midpoint between the top-left and bottom-right corners' y
    ///
    /// Only meaningful on a validated fragment.
    pub fn y_center(&self) -> f64 {
        (self.bbox[0].y + self.bbox[2].y) / 2.0
    }

    /// X of the top-left corner, the left-to-right sort key
    pub fn left(&self) -> f64 {
        self.bbox[0].x
    }
}
