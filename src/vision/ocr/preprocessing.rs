// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Turning images into model input tensors
//!
//! Detection sees the whole screenshot letterboxed onto a 640x640 gray
//! canvas; [`Letterbox`] remembers the fit so detected regions can be mapped
//! back onto the source pixels. Recognition sees one crop at a time, scaled
//! to a fixed height with its aspect ratio kept.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

use super::model::BoundingBox;

/// Side of the square detection canvas
pub const OCR_INPUT_SIZE: u32 = 640;

/// Crop height expected by the Chinese recognition models
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Widest recognition input; longer lines are squeezed
pub const REC_MAX_WIDTH: u32 = 1280;

/// Narrowest recognition input the model accepts
const REC_MIN_WIDTH: u32 = 4;

/// Per-channel ImageNet statistics used by the detection model
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

const CANVAS_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// Pack an RGB image into a `[1, 3, H, W]` tensor, normalizing each byte
fn to_nchw(rgb: &RgbImage, normalize: impl Fn(usize, f32) -> f32) -> Array4<f32> {
    let (w, h) = rgb.dimensions();
    Array4::from_shape_fn((1, 3, h as usize, w as usize), |(_, c, y, x)| {
        let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
        normalize(c, value)
    })
}

/// Letterbox to 640x640 and apply ImageNet normalization
pub fn preprocess_for_detection(image: &DynamicImage) -> Array4<f32> {
    let canvas = resize_with_padding(image, OCR_INPUT_SIZE);
    to_nchw(&canvas.to_rgb8(), |c, v| (v - MEAN[c]) / STD[c])
}

/// Scale a crop to 48px high and map every channel onto [-1, 1]
///
/// Width follows the aspect ratio, bounded to `[4, REC_MAX_WIDTH]`.
pub fn preprocess_for_recognition(image: &DynamicImage) -> Array4<f32> {
    let (w, h) = image.dimensions();
    let width = (w as f32 * REC_INPUT_HEIGHT as f32 / h.max(1) as f32)
        .round()
        .clamp(REC_MIN_WIDTH as f32, REC_MAX_WIDTH as f32) as u32;

    let scaled = image.resize_exact(width, REC_INPUT_HEIGHT, FilterType::Lanczos3);
    to_nchw(&scaled.to_rgb8(), |_, v| v * 2.0 - 1.0)
}

/// Fit `image` inside a `side` x `side` gray square, centered
pub fn resize_with_padding(image: &DynamicImage, side: u32) -> DynamicImage {
    let fit = Letterbox::new(image, side);
    let mut canvas = RgbImage::from_pixel(side, side, CANVAS_GRAY);

    if !fit.is_degenerate() {
        let scaled = image
            .resize_exact(fit.scaled_width, fit.scaled_height, FilterType::Lanczos3)
            .to_rgb8();
        imageops::replace(&mut canvas, &scaled, fit.offset_x as i64, fit.offset_y as i64);
    }

    DynamicImage::ImageRgb8(canvas)
}

/// Where a source image landed on the square detection canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Canvas pixels per source pixel
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    pub fn new(image: &DynamicImage, side: u32) -> Self {
        let (source_width, source_height) = image.dimensions();
        let mut fit = Self {
            scale: 1.0,
            offset_x: 0,
            offset_y: 0,
            scaled_width: 0,
            scaled_height: 0,
            source_width,
            source_height,
        };
        if fit.is_degenerate() {
            return fit;
        }

        let side_f = side as f32;
        fit.scale = (side_f / source_width as f32).min(side_f / source_height as f32);
        fit.scaled_width = ((source_width as f32 * fit.scale).round() as u32).clamp(1, side);
        fit.scaled_height = ((source_height as f32 * fit.scale).round() as u32).clamp(1, side);
        fit.offset_x = (side - fit.scaled_width) / 2;
        fit.offset_y = (side - fit.scaled_height) / 2;
        fit
    }

    fn is_degenerate(&self) -> bool {
        self.source_width == 0 || self.source_height == 0
    }

    /// Canvas point to source point, unclamped
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.offset_x as f32) / self.scale,
            (y - self.offset_y as f32) / self.scale,
        )
    }

    /// Canvas rectangle to the source pixels it covers
    ///
    /// The result is clipped to the source; `None` means the rectangle lies
    /// entirely in the padding.
    pub fn map_rect(&self, x: f32, y: f32, width: f32, height: f32) -> Option<BoundingBox> {
        let (left, top) = self.to_source(x, y);
        let (right, bottom) = self.to_source(x + width, y + height);

        let clip_x = |v: f32| v.clamp(0.0, self.source_width as f32) as u32;
        let clip_y = |v: f32| v.clamp(0.0, self.source_height as f32) as u32;
        let (left, right) = (clip_x(left.floor()), clip_x(right.ceil()));
        let (top, bottom) = (clip_y(top.floor()), clip_y(bottom.ceil()));

        (right > left && bottom > top).then(|| BoundingBox {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// Copy a region out of the source image
pub fn crop_region(image: &DynamicImage, region: &BoundingBox) -> DynamicImage {
    image.crop_imm(region.x, region.y, region.width, region.height)
}
