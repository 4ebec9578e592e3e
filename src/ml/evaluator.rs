// ============================================================
// Layer 5 — Evaluator
// ============================================================
// One pass over a data loader computing mean loss and
// accuracy. Used for the per-epoch validation report and the
// final test score.
//
// Call it with `model.valid()`: the inner (non-autodiff)
// backend, where Dropout is a no-op.

use burn::{data::dataloader::DataLoader, prelude::*};
use serde::{Deserialize, Serialize};

use crate::data::batcher::DigitBatch;
use crate::ml::model::{count_correct, DigitCnn};

/// Scalar test metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mean categorical cross-entropy per sample
    pub loss:     f64,
    /// Fraction of samples classified correctly, in [0, 1]
    pub accuracy: f64,
    /// Number of samples seen
    pub samples:  usize,
}

impl Evaluation {
    /// Metrics of an empty set: NaN loss, zero accuracy
    pub fn empty() -> Self {
        Self { loss: f64::NAN, accuracy: 0.0, samples: 0 }
    }
}

pub fn evaluate<B: Backend>(
    model:  &DigitCnn<B>,
    loader: &dyn DataLoader<B, DigitBatch<B>>,
) -> Evaluation {
    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut samples  = 0usize;

    for batch in loader.iter() {
        let batch_size = batch.targets.dims()[0];
        let output     = model.forward_loss(batch.images, batch.targets);

        // Batch loss is a mean; weight it by the batch size so a
        // short final batch does not skew the total.
        let batch_loss: f64 = output.loss.into_scalar().elem::<f64>();
        loss_sum += batch_loss * batch_size as f64;
        correct  += count_correct(output.logits, output.targets);
        samples  += batch_size;
    }

    if samples == 0 {
        return Evaluation::empty();
    }

    let evaluation = Evaluation {
        loss:     loss_sum / samples as f64,
        accuracy: correct as f64 / samples as f64,
        samples,
    };
    tracing::debug!("Evaluated {:?}", evaluation);
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::data::dataloader::DataLoaderBuilder;

    use crate::data::{batcher::DigitBatcher, dataset::DigitDataset, preprocessor::Preprocessor};
    use crate::domain::digit::{DigitSplit, PIXELS_PER_IMAGE};
    use crate::ml::model::DigitCnnConfig;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_evaluate_counts_every_sample() {
        let device = Default::default();
        let model: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);

        let split    = DigitSplit::new(vec![128u8; 5 * PIXELS_PER_IMAGE], vec![0, 1, 2, 3, 4]);
        let prepared = Preprocessor::default().process(&split).unwrap();
        let loader   = DataLoaderBuilder::new(DigitBatcher::default())
            .batch_size(2)
            .build(DigitDataset::new(prepared));

        let evaluation = evaluate(&model, loader.as_ref());
        assert_eq!(evaluation.samples, 5);
        assert!(evaluation.loss.is_finite() && evaluation.loss > 0.0);
        assert!((0.0..=1.0).contains(&evaluation.accuracy));
        // Identical images get identical predictions: at most one label matches
        assert!(evaluation.accuracy <= 0.2 + 1e-9);
    }
}
