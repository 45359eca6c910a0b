// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text region detection (PP-OCR DB model)
//!
//! The model emits a per-pixel text probability map. Pixels above
//! `pixel_threshold` are grouped into 4-connected components; each component
//! that is large and confident enough becomes an axis-aligned region, grown by
//! the DB unclip distance to recover the glyph edges the model shrinks away.

use anyhow::{anyhow, Result};
use ndarray::{Array4, ArrayView2, ArrayViewD, Axis};
use std::collections::VecDeque;
use std::path::Path;
use tracing::debug;

use super::preprocessing::OCR_INPUT_SIZE;
use super::runtime::OnnxStage;

/// Side of the square detection input
pub const DETECTION_INPUT_SIZE: u32 = OCR_INPUT_SIZE;

/// Tuning knobs for turning the probability map into regions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionOptions {
    /// Pixel probability above which a pixel counts as text
    pub pixel_threshold: f32,
    /// Minimum mean probability for a region to be kept
    pub box_threshold: f32,
    /// Regions with fewer pixels are treated as noise
    pub min_region_pixels: usize,
    /// DB unclip ratio; the shrunk text kernel is grown by area * ratio / perimeter
    pub unclip_ratio: f32,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            pixel_threshold: 0.3,
            box_threshold: 0.6,
            min_region_pixels: 10,
            unclip_ratio: 1.5,
        }
    }
}

/// Axis-aligned text region in detection-input pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean pixel probability inside the component
    pub score: f32,
}

impl TextRegion {
    pub fn has_extent(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Offset every edge outward by `area * ratio / perimeter`
    pub fn unclip(self, ratio: f32) -> TextRegion {
        let perimeter = 2.0 * (self.width + self.height);
        if ratio <= 0.0 || perimeter <= 0.0 {
            return self;
        }
        let d = self.area() * ratio / perimeter;
        TextRegion {
            x: self.x - d,
            y: self.y - d,
            width: self.width + 2.0 * d,
            height: self.height + 2.0 * d,
            score: self.score,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrDetectionModel {
    stage: OnnxStage,
    options: DetectionOptions,
}

impl OcrDetectionModel {
    pub async fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let stage = OnnxStage::open(model_path.as_ref(), "detection", intra_threads)?;
        Ok(Self {
            stage,
            options: DetectionOptions::default(),
        })
    }

    /// Replace the post-processing options; thresholds are clamped to [0, 1]
    pub fn with_options(mut self, options: DetectionOptions) -> Self {
        self.options = DetectionOptions {
            pixel_threshold: options.pixel_threshold.clamp(0.0, 1.0),
            box_threshold: options.box_threshold.clamp(0.0, 1.0),
            ..options
        };
        self
    }

    pub fn options(&self) -> &DetectionOptions {
        &self.options
    }

    /// Find text regions in a `[1, 3, H, W]` tensor from `preprocess_for_detection`
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextRegion>> {
        let (batch, channels, height, width) = input.dim();
        if batch != 1 || channels != 3 {
            anyhow::bail!(
                "Detection expects a [1, 3, H, W] tensor, got {:?}",
                input.shape()
            );
        }

        let output = self.stage.run(input)?;
        let prob_map = probability_map(output.view())?;
        let regions = extract_regions(prob_map, height, width, &self.options);
        debug!("Detection kept {} regions", regions.len());
        Ok(regions)
    }
}

/// Strip leading unit axes from a `[1, 1, H, W]` or `[1, H, W]` output
fn probability_map(output: ArrayViewD<'_, f32>) -> Result<ArrayView2<'_, f32>> {
    let mut view = output;
    while view.ndim() > 2 {
        view = view.index_axis_move(Axis(0), 0);
    }
    view.into_dimensionality()
        .map_err(|e| anyhow!("Unexpected detection output shape: {}", e))
}

/// Connected-component pass over the probability map
///
/// Regions come back in scan order (top-left seed first), scaled to the
/// `input_height` x `input_width` space and unclipped.
pub fn extract_regions(
    prob_map: ArrayView2<f32>,
    input_height: usize,
    input_width: usize,
    options: &DetectionOptions,
) -> Vec<TextRegion> {
    let (rows, cols) = prob_map.dim();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let sx = input_width as f32 / cols as f32;
    let sy = input_height as f32 / rows as f32;

    let mut seen = vec![false; rows * cols];
    let mut regions = Vec::new();

    for (seed, &p) in prob_map.iter().enumerate() {
        if seen[seed] || p < options.pixel_threshold {
            continue;
        }
        let component = Component::grow(&prob_map, &mut seen, seed, options.pixel_threshold);
        if component.pixels < options.min_region_pixels {
            continue;
        }
        let score = component.mass / component.pixels as f32;
        if score < options.box_threshold {
            continue;
        }

        let region = TextRegion {
            x: component.left as f32 * sx,
            y: component.top as f32 * sy,
            width: (component.right + 1 - component.left) as f32 * sx,
            height: (component.bottom + 1 - component.top) as f32 * sy,
            score,
        };
        regions.push(region.unclip(options.unclip_ratio));
    }

    regions
}

/// Bounds and probability mass of one component
struct Component {
    left: usize,
    right: usize,
    top: usize,
    bottom: usize,
    pixels: usize,
    mass: f32,
}

impl Component {
    /// Breadth-first fill from `seed` (row-major index), marking `seen`
    fn grow(prob_map: &ArrayView2<f32>, seen: &mut [bool], seed: usize, threshold: f32) -> Self {
        let (rows, cols) = prob_map.dim();
        let (row, col) = (seed / cols, seed % cols);
        let mut component = Component {
            left: col,
            right: col,
            top: row,
            bottom: row,
            pixels: 0,
            mass: 0.0,
        };

        seen[seed] = true;
        let mut queue = VecDeque::from([(row, col)]);
        while let Some((r, c)) = queue.pop_front() {
            component.pixels += 1;
            component.mass += prob_map[[r, c]];
            component.left = component.left.min(c);
            component.right = component.right.max(c);
            component.top = component.top.min(r);
            component.bottom = component.bottom.max(r);

            let neighbours = [
                (r > 0).then(|| (r - 1, c)),
                (r + 1 < rows).then(|| (r + 1, c)),
                (c > 0).then(|| (r, c - 1)),
                (c + 1 < cols).then(|| (r, c + 1)),
            ];
            for (nr, nc) in neighbours.into_iter().flatten() {
                let idx = nr * cols + nc;
                if !seen[idx] && prob_map[[nr, nc]] >= threshold {
                    seen[idx] = true;
                    queue.push_back((nr, nc));
                }
            }
        }

        component
    }
}
