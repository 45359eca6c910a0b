// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::layout::{LineReconstructor, TextFragment};
use crate::service::{Extraction, ImageToPinyin};
use crate::translation::TargetLanguage;
use crate::vision::{capture_clipboard_image, decode_image_bytes, ClipboardError};

/// img-to-pinyin command line
#[derive(Parser, Debug)]
#[command(name = "img-to-pinyin-cli")]
#[command(version)]
#[command(about = "Extract Chinese text from images and convert it to pinyin", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "IMG_TO_PINYIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory with det_model.onnx, rec_model.onnx and ppocr_keys_v1.txt
    #[arg(long, global = true, env = "OCR_MODEL_DIR")]
    pub ocr_model_dir: Option<String>,

    /// Vertical bucket size in pixels used to group fragments into lines
    #[arg(long, global = true, env = "QUANTIZATION_STEP")]
    pub quantization_step: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract text and pinyin from an image file
    Extract(ExtractArgs),

    /// Extract text and pinyin from the image on the clipboard
    Clipboard(ClipboardArgs),

    /// Rebuild reading order from recorded OCR fragments (JSON)
    Reconstruct(ReconstructArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Image file (PNG, JPEG, WebP, GIF, BMP, TIFF)
    pub image: PathBuf,

    /// Also translate the text (en or vi)
    #[arg(long)]
    pub translate: Option<TargetLanguage>,

    /// Print JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ClipboardArgs {
    /// Also translate the text (en or vi)
    #[arg(long)]
    pub translate: Option<TargetLanguage>,

    /// Print JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// JSON file: an array of fragments or an object with a `fragments` array
    pub fragments: PathBuf,

    /// Print JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

/// Accepted layouts of a recorded fragment file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FragmentFile {
    Bare(Vec<TextFragment>),
    Wrapped { fragments: Vec<TextFragment> },
}

impl FragmentFile {
    fn into_fragments(self) -> Vec<TextFragment> {
        match self {
            FragmentFile::Bare(fragments) | FragmentFile::Wrapped { fragments } => fragments,
        }
    }
}

/// What a command prints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(flatten)]
    pub extraction: Extraction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    /// Why the result is empty when there was nothing to read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl Report {
    /// Empty result that only carries a notice
    pub fn notice(message: impl Into<String>) -> Self {
        Report {
            extraction: Extraction::default(),
            translation: None,
            notice: Some(message.into()),
        }
    }

    /// Plain-text rendering with the same section titles as the web page
    pub fn render_text(&self) -> String {
        if let Some(notice) = &self.notice {
            return format!("{}\n", notice);
        }
        let mut out = format!(
            "Extracted Text\n{}\n\nPinyin\n{}\n",
            self.extraction.text, self.extraction.pinyin
        );
        if let Some(translation) = &self.translation {
            out.push_str(&format!("\nTranslation\n{}\n", translation));
        }
        out
    }

    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(self.render_text())
        }
    }
}

/// Configuration file, then environment, then flags
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.apply_env()?;

    if let Some(dir) = &cli.ocr_model_dir {
        config.ocr.model_dir = Some(dir.clone());
    }
    if let Some(step) = cli.quantization_step {
        config.layout.quantization_step = step;
    }

    config.validate()?;
    Ok(config)
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    let output = match cli.command {
        Commands::Extract(args) => extract_file(&config, args).await?,
        Commands::Clipboard(args) => extract_clipboard(&config, args).await?,
        Commands::Reconstruct(args) => reconstruct_file(&config, &args)?,
    };

    print!("{}", output);
    Ok(())
}

async fn ocr_service(config: &AppConfig) -> Result<ImageToPinyin> {
    let service = ImageToPinyin::from_config(config).await?;
    if !service.has_ocr() {
        return Err(anyhow!(
            "OCR model not available; check --ocr-model-dir (currently {:?})",
            config.ocr.model_dir
        ));
    }
    Ok(service)
}

async fn finish(
    service: &ImageToPinyin,
    extraction: Extraction,
    translate: Option<TargetLanguage>,
    json: bool,
) -> Result<String> {
    let translation = match translate {
        Some(target) => Some(service.translate(&extraction.text, target).await),
        None => None,
    };
    Report {
        extraction,
        translation,
        notice: None,
    }
    .render(json)
}

async fn extract_file(config: &AppConfig, args: ExtractArgs) -> Result<String> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let (image, image_info) = decode_image_bytes(&bytes)?;
    info!(
        "Loaded {} ({}x{})",
        args.image.display(),
        image_info.width,
        image_info.height
    );

    let service = ocr_service(config).await?;
    let extraction = service.extract(image).await?;
    finish(&service, extraction, args.translate, args.json).await
}

async fn extract_clipboard(config: &AppConfig, args: ClipboardArgs) -> Result<String> {
    // An empty clipboard is an empty result, not a failure
    let image = match tokio::task::spawn_blocking(capture_clipboard_image).await? {
        Ok(image) => image,
        Err(ClipboardError::NoImage) => {
            warn!("No image on the clipboard");
            return Report::notice(ClipboardError::NoImage.to_string()).render(args.json);
        }
        Err(e) => return Err(e.into()),
    };

    let service = ocr_service(config).await?;
    let extraction = service.extract(image).await?;
    finish(&service, extraction, args.translate, args.json).await
}

/// Reconstruction needs no models, so the OCR directory is never touched
fn reconstruct_file(config: &AppConfig, args: &ReconstructArgs) -> Result<String> {
    let fragments = read_fragments(&args.fragments)?;
    let service = ImageToPinyin::new(
        LineReconstructor::new(config.layout.quantization_step)?,
        Arc::new(config.transliterator()),
    );
    let extraction = service.extract_fragments(&fragments)?;

    Report {
        extraction,
        translation: None,
        notice: None,
    }
    .render(args.json)
}

fn read_fragments(path: &Path) -> Result<Vec<TextFragment>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: FragmentFile = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a fragment list", path.display()))?;
    Ok(file.into_fragments())
}
