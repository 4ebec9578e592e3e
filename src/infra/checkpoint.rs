// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's DefaultRecorder,
// so `export` can run again without retraining. Weights are
// stored at full f32 precision; a re-export writes the same
// bytes as the export at the end of training.
//
// File layout inside the artifact directory:
//
//   artifacts/
//     model_epoch_1.mpk   ← weights after epoch 1
//     ...
//     model_epoch_12.mpk
//     latest_epoch.json   ← number of the newest checkpoint
//     train_config.json   ← the TrainConfig of the run
//
// The config is needed to rebuild a DigitCnn with the same
// dropout settings before its record can be loaded.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{DefaultRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::DigitCnn;

const LATEST_EPOCH_FILE: &str = "latest_epoch.json";
const CONFIG_FILE: &str = "train_config.json";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Record `model` as `model_epoch_{epoch}` and mark it as the latest.
    pub fn save_model<B: Backend>(&self, model: &DigitCnn<B>, epoch: usize) -> Result<()> {
        // The recorder adds the extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        DefaultRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join(LATEST_EPOCH_FILE);
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", latest_path.display()))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the newest checkpoint into `model`, which must have
    /// the same architecture.
    pub fn load_model<B: Backend>(&self, model: DigitCnn<B>, device: &B::Device) -> Result<DigitCnn<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = DefaultRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?", path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'export'.",
                path.display()
            )
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join(LATEST_EPOCH_FILE);

        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot find '{}'. Have you run 'train' first?", path.display()))?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::domain::layout::ExportTarget;
    use crate::ml::model::DigitCnnConfig;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_model_round_trips_through_checkpoint() {
        let dir     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path()).unwrap();
        let device  = Default::default();

        let trained: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);
        manager.save_model(&trained, 1).unwrap();
        manager.save_model(&trained, 2).unwrap();
        assert_eq!(manager.latest_epoch().unwrap(), 2);

        let fresh: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);
        let loaded = manager.load_model(fresh, &device).unwrap();

        let expected = trained.fc2.weight.val().into_data().to_vec::<f32>().unwrap();
        let actual   = loaded.fc2.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_config_round_trip() {
        let dir     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path()).unwrap();

        let cfg = TrainConfig {
            epochs: 3,
            target: ExportTarget::Keras,
            train_limit: Some(100),
            ..TrainConfig::default()
        };
        manager.save_config(&cfg).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.epochs, 3);
        assert_eq!(loaded.target, ExportTarget::Keras);
        assert_eq!(loaded.train_limit, Some(100));
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path()).unwrap();
        let device  = Default::default();
        let model: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);

        assert!(manager.load_model(model, &device).is_err());
        assert!(manager.load_config().is_err());
    }
}
