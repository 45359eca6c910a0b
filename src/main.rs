// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use img_to_pinyin::{
    api::{start_server, AppState},
    config::AppConfig,
    service::ImageToPinyin,
    version,
};
use std::{env, net::SocketAddr, path::PathBuf};
use tracing::{info, warn};

/// Image to Pinyin web server
#[derive(Parser, Debug)]
#[command(name = "img-to-pinyin")]
#[command(version)]
#[command(about = "Serve the Image to Pinyin web page and JSON API", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "IMG_TO_PINYIN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    listen: Option<String>,

    /// Directory with the PaddleOCR ONNX models and dictionary
    #[arg(long)]
    ocr_model_dir: Option<String>,

    /// Vertical bucket size in pixels used to group fragments into lines
    #[arg(long)]
    quantization_step: Option<f64>,

    /// Translation endpoint
    #[arg(long)]
    translate_endpoint: Option<String>,

    /// Disable translation
    #[arg(long)]
    no_translation: bool,
}

/// Configuration file, then environment, then flags
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.apply_env()?;

    if let Some(listen) = &args.listen {
        config.server.listen_addr = listen.clone();
    }
    if let Some(dir) = &args.ocr_model_dir {
        config.ocr.model_dir = Some(dir.clone());
    }
    if let Some(step) = args.quantization_step {
        config.layout.quantization_step = step;
    }
    if let Some(endpoint) = &args.translate_endpoint {
        config.translation.endpoint = endpoint.clone();
    }
    if args.no_translation {
        config.translation.enabled = false;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    info!("Starting {}", version::get_version_string());

    let config = load_config(&args)?;
    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.listen_addr))?;

    let service = ImageToPinyin::from_config(&config).await?;
    if !service.has_ocr() {
        warn!(
            "OCR model not loaded (model dir {:?}); extraction endpoints will return 503",
            config.ocr.model_dir
        );
    }
    info!(
        "Line quantization step: {}px, translation: {}",
        service.reconstructor().quantization_step(),
        if service.has_translator() { "enabled" } else { "disabled" }
    );

    start_server(AppState::new(service), addr).await?;

    info!("Goodbye");
    Ok(())
}
