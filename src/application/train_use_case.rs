// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train/test digits     (Layer 4 - data)
//   Step 2: Optional seeded subsets    (Layer 4 - data)
//   Step 3: Normalise + one-hot        (Layer 4 - data)
//   Step 4: Save config                (Layer 6 - infra)
//   Step 5: Seed, build model, summary (Layer 5 - ml)
//   Step 6: Run training loop          (Layer 5 - ml)
//   Step 7: Final test evaluation      (Layer 5 - ml)
//   Step 8: Export weight files        (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};

use crate::data::{
    batcher::{DigitBatch, DigitBatcher},
    dataset::DigitDataset,
    loader::{BurnMnistSource, IdxDirSource},
    preprocessor::Preprocessor,
    sampler::take_random,
};
use crate::domain::layout::{ExportTarget, ImageLayout};
use crate::domain::traits::DigitSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    exporter::{ExportManifest, WeightExporter},
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    backend::{self, InnerBackend, TrainBackend},
    evaluator::{evaluate, Evaluation},
    model::{DigitCnn, DigitCnnConfig},
    params::extract_parameters,
    summary::ModelSummary,
    trainer::train,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run depends on. Saved as train_config.json so
// `export` can rebuild the same model later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Directory with raw IDX files; None uses Burn's MNIST download
    pub data_dir:     Option<String>,
    pub artifact_dir: String,
    /// Defaults to `<artifact_dir>/weights`
    pub export_dir:   Option<String>,
    pub batch_size:   usize,
    pub epochs:       usize,
    pub seed:         u64,
    pub image_layout: ImageLayout,
    pub target:       ExportTarget,
    pub train_limit:  Option<usize>,
    pub test_limit:   Option<usize>,
    pub num_workers:  usize,
    pub model:        DigitCnnConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:     None,
            artifact_dir: "artifacts".to_string(),
            export_dir:   None,
            batch_size:   128,
            epochs:       12,
            seed:         1337,
            image_layout: ImageLayout::ChannelsLast,
            target:       ExportTarget::Mps,
            train_limit:  None,
            test_limit:   None,
            num_workers:  1,
            model:        DigitCnnConfig::new(),
        }
    }
}

impl TrainConfig {
    pub fn export_dir(&self) -> PathBuf {
        match &self.export_dir {
            Some(dir) => PathBuf::from(dir),
            None      => PathBuf::from(&self.artifact_dir).join("weights"),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch size must be at least 1");
        ensure!(self.epochs > 0, "epochs must be at least 1");
        ensure!(self.num_workers > 0, "num workers must be at least 1");
        ensure!(self.train_limit != Some(0), "train limit must be at least 1");
        ensure!(self.test_limit != Some(0), "test limit must be at least 1");
        Ok(())
    }

    fn source(&self) -> Box<dyn DigitSource> {
        match &self.data_dir {
            Some(dir) => Box::new(IdxDirSource::new(dir)),
            None      => Box::new(BurnMnistSource::new()),
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub history:  Vec<EpochMetrics>,
    pub test:     Evaluation,
    pub manifest: ExportManifest,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load digits ───────────────────────────────────────────────
        let source = cfg.source();
        tracing::info!("Loading digits from {}", source.describe());
        let corpus = source.load()?;

        // ── Step 2: Optional subsets for quick runs ───────────────────────────
        let train_split = take_random(corpus.train, cfg.train_limit, cfg.seed);
        let test_split  = take_random(corpus.test, cfg.test_limit, cfg.seed);
        ensure!(!train_split.is_empty(), "train partition of {} is empty", source.describe());
        ensure!(!test_split.is_empty(), "test partition of {} is empty", source.describe());

        // ── Step 3: Normalise pixels, one-hot labels ──────────────────────────
        let preprocessor = Preprocessor::new(cfg.image_layout);
        let train_data   = preprocessor.process(&train_split)?;
        let test_data    = preprocessor.process(&test_split)?;

        println!("x_train shape: {:?}", train_data.images.dims());
        println!("{} train samples", train_data.len());
        println!("{} test samples", test_data.len());

        let train_dataset = DigitDataset::new(train_data);
        let test_dataset  = DigitDataset::new(test_data);

        // ── Step 4: Save config next to the checkpoints ───────────────────────
        let checkpoints = CheckpointManager::new(&cfg.artifact_dir)?;
        checkpoints.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.artifact_dir)?;

        // ── Step 5: Seed and build the model ──────────────────────────────────
        let device = backend::device();
        TrainBackend::seed(&device, cfg.seed);
        let model: DigitCnn<TrainBackend> = cfg.model.init(&device);
        println!("{}", ModelSummary::of(&model));

        // ── Step 6: Train (validation = the test partition) ───────────────────
        let outcome = train(cfg, model, train_dataset, test_dataset.clone(), &metrics, &checkpoints)?;
        let model   = outcome.model.valid();

        // ── Step 7: Final score on the test partition ─────────────────────────
        let test_loader: Arc<dyn DataLoader<InnerBackend, DigitBatch<InnerBackend>>> =
            DataLoaderBuilder::new(DigitBatcher::new(cfg.image_layout))
                .batch_size(cfg.batch_size)
                .num_workers(cfg.num_workers)
                .build(test_dataset);
        let test = evaluate(&model, test_loader.as_ref());
        println!("Test score: {:.6}", test.loss);
        println!("Test accuracy: {:.6}", test.accuracy);

        // ── Step 8: Export ────────────────────────────────────────────────────
        let manifest = export_model(&model, cfg.export_dir(), cfg.target)?;

        Ok(TrainReport {
            history: outcome.history,
            test,
            manifest,
        })
    }
}

/// Extract `model`'s parameters and write them for `target`.
pub fn export_model<B: Backend>(
    model:  &DigitCnn<B>,
    dir:    PathBuf,
    target: ExportTarget,
) -> Result<ExportManifest> {
    let params   = extract_parameters(model)?;
    let exporter = WeightExporter::new(dir, target);
    let manifest = exporter.export(&params)?;

    for file in &manifest.files {
        println!("  {:<20} {:?} {} bytes", file.file, file.shape, file.bytes);
    }
    Ok(manifest)
}
