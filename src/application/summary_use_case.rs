// ============================================================
// Layer 2 — Summary Use Case
// ============================================================
// Builds an untrained DigitCnn and reports its layer table.

use crate::ml::{
    backend::{self, InnerBackend},
    model::{DigitCnn, DigitCnnConfig},
    summary::ModelSummary,
};

pub struct SummaryUseCase {
    config: DigitCnnConfig,
}

impl SummaryUseCase {
    pub fn new(config: DigitCnnConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> ModelSummary {
        let device = backend::device();
        let model: DigitCnn<InnerBackend> = self.config.init(&device);
        ModelSummary::of(&model)
    }
}
