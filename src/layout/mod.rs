// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text layout reconstruction
//!
//! Components:
//! - `fragment` - OCR detections (box, text, confidence) and their validation
//! - `reconstruct` - Grouping of fragments into reading-order lines

pub mod fragment;
pub mod reconstruct;

pub use fragment::{FragmentDefect, Point, TextFragment, BOX_CORNERS};
pub use reconstruct::{
    LineBucket, LineReconstructor, ReconstructError, ReconstructedLine, DEFAULT_QUANTIZATION_STEP,
};
