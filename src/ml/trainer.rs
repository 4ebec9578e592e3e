// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch Adadelta on categorical cross-entropy.
//
// Per epoch:
//   1. shuffled pass over the training set (autodiff backend,
//      dropout active), one optimizer step per batch
//   2. model.valid() → inner backend, dropout off, evaluate
//      on the validation set
//   3. print one line, append one CSV row, save a checkpoint
//
// Burn 0.20 notes:
//   - training loader yields batches on B (Autodiff<..>)
//   - validation loader must yield batches on B::InnerBackend
//   - the shuffle seed is the run seed, so two runs with the
//     same config visit batches in the same order
//
// Reference: Burn Book §5, Zeiler (2012) ADADELTA

use std::sync::Arc;

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{DigitBatch, DigitBatcher},
    dataset::DigitDataset,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::adadelta::{AdadeltaConfig, ADADELTA_LEARNING_RATE};
use crate::ml::evaluator::evaluate;
use crate::ml::model::{count_correct, DigitCnn};

/// The trained model plus one metrics row per epoch
pub struct TrainOutcome<B: AutodiffBackend> {
    pub model:   DigitCnn<B>,
    pub history: Vec<EpochMetrics>,
}

pub fn train<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    mut model:     DigitCnn<B>,
    train_dataset: DigitDataset,
    val_dataset:   DigitDataset,
    metrics:       &MetricsLogger,
    checkpoints:   &CheckpointManager,
) -> Result<TrainOutcome<B>> {
    let layout = train_dataset.layout();

    // ── Adadelta ──────────────────────────────────────────────────────────────
    let mut optim = AdadeltaConfig::new().init::<B, DigitCnn<B>>();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader: Arc<dyn DataLoader<B, DigitBatch<B>>> =
        DataLoaderBuilder::new(DigitBatcher::new(layout))
            .batch_size(cfg.batch_size)
            .shuffle(cfg.seed)
            .num_workers(cfg.num_workers)
            .build(train_dataset);

    // ── Validation data loader (InnerBackend, no autodiff graph) ──────────────
    let val_loader: Arc<dyn DataLoader<B::InnerBackend, DigitBatch<B::InnerBackend>>> =
        DataLoaderBuilder::new(DigitBatcher::new(layout))
            .batch_size(cfg.batch_size)
            .num_workers(cfg.num_workers)
            .build(val_dataset);

    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut samples  = 0usize;

        for batch in train_loader.iter() {
            let output     = model.forward_loss(batch.images, batch.targets);
            let batch_size = output.targets.dims()[0];

            let loss_val: f64 = output.loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val * batch_size as f64;
            correct  += count_correct(output.logits.clone(), output.targets.clone());
            samples  += batch_size;

            let grads = GradientsParams::from_grads(output.loss.backward(), &model);
            model = optim.step(ADADELTA_LEARNING_RATE, model, grads);
        }

        let (train_loss, train_accuracy) = if samples > 0 {
            (loss_sum / samples as f64, correct as f64 / samples as f64)
        } else {
            (f64::NAN, 0.0)
        };

        // ── Validation phase ──────────────────────────────────────────────────
        let validation = evaluate(&model.valid(), val_loader.as_ref());

        let row = EpochMetrics::new(
            epoch,
            train_loss,
            train_accuracy,
            validation.loss,
            validation.accuracy,
        );

        println!(
            "Epoch {:>3}/{} | loss={:.4} | acc={:.2}% | val_loss={:.4} | val_acc={:.2}%",
            epoch,
            cfg.epochs,
            row.train_loss,
            row.train_accuracy * 100.0,
            row.val_loss,
            row.val_accuracy * 100.0,
        );
        metrics.log(&row)?;
        history.push(row);

        checkpoints.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete after {} epochs", cfg.epochs);
    Ok(TrainOutcome { model, history })
}
