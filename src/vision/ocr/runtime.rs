// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime plumbing shared by the detection and recognition stages

use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array4, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Single-input, single-output CPU session behind a lock
#[derive(Clone)]
pub struct OnnxStage {
    label: &'static str,
    session: Arc<Mutex<Session>>,
    input_name: String,
}

impl std::fmt::Debug for OnnxStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxStage")
            .field("label", &self.label)
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OnnxStage {
    /// Open `path` as the `label` stage (e.g. "detection")
    pub fn open(path: &Path, label: &'static str, intra_threads: usize) -> Result<Self> {
        if !path.is_file() {
            bail!("OCR {} model not found: {}", label, path.display());
        }
        info!("Loading OCR {} model from {}", label, path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to register CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads.max(1))
            .context("Failed to set intra-op threads")?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load OCR {} model {}", label, path.display()))?;

        // PaddleOCR exports name their only input "x"
        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => "x".to_string(),
        };
        debug!("OCR {} session ready, input '{}'", label, input_name);

        Ok(Self {
            label,
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }

    /// Run one NCHW batch and copy out the first output
    pub fn run(&self, input: &Array4<f32>) -> Result<ArrayD<f32>> {
        let tensor = Value::from_array(input.to_owned())
            .with_context(|| format!("Failed to build {} input tensor", self.label))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("OCR {} session lock poisoned", self.label))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .with_context(|| format!("OCR {} inference failed", self.label))?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .with_context(|| format!("OCR {} output is not an f32 tensor", self.label))?
            .to_owned();
        debug!("OCR {} output shape {:?}", self.label, output.shape());
        Ok(output)
    }
}
