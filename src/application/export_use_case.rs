// ============================================================
// Layer 2 — Export Use Case
// ============================================================
// Re-export weights from a finished run without retraining:
//   1. Read train_config.json from the artifact directory
//   2. Rebuild a DigitCnn with the saved model config
//   3. Load the latest checkpoint into it
//   4. Write the .dat files for the requested target

use anyhow::Result;
use std::path::PathBuf;

use crate::application::train_use_case::export_model;
use crate::domain::layout::ExportTarget;
use crate::infra::{checkpoint::CheckpointManager, exporter::ExportManifest};
use crate::ml::{
    backend::{self, InnerBackend},
    model::DigitCnn,
};

pub struct ExportUseCase {
    artifact_dir: String,
    export_dir:   Option<String>,
    target:       Option<ExportTarget>,
}

impl ExportUseCase {
    /// `export_dir` and `target` fall back to the values the run was trained with
    pub fn new(artifact_dir: String, export_dir: Option<String>, target: Option<ExportTarget>) -> Self {
        Self { artifact_dir, export_dir, target }
    }

    pub fn execute(&self) -> Result<ExportManifest> {
        let ckpt = CheckpointManager::new(&self.artifact_dir)?;
        let cfg  = ckpt.load_config()?;

        let device = backend::device();
        let model: DigitCnn<InnerBackend> = ckpt.load_model(cfg.model.init(&device), &device)?;

        let dir = match &self.export_dir {
            Some(dir) => PathBuf::from(dir),
            None      => cfg.export_dir(),
        };
        let target = self.target.unwrap_or(cfg.target);

        tracing::info!("Exporting for target '{}' to '{}'", target, dir.display());
        export_model(&model, dir, target)
    }
}
