use burn::data::dataset::Dataset;
use std::sync::Arc;

use crate::data::preprocessor::PreparedSplit;
use crate::domain::layout::ImageLayout;

/// One normalised digit and its one-hot target.
#[derive(Debug, Clone)]
pub struct DigitSample {
    /// 784 floats in [0, 1], ordered per the split's image layout
    pub pixels: Vec<f32>,
    /// 10 floats, a single 1.0 at the digit's class
    pub target: Vec<f32>,
}

/// Burn dataset over a preprocessed split. The split is shared,
/// so the train loader and an evaluation pass can both hold it.
#[derive(Debug, Clone)]
pub struct DigitDataset {
    split: Arc<PreparedSplit>,
}

impl DigitDataset {
    pub fn new(split: PreparedSplit) -> Self {
        Self { split: Arc::new(split) }
    }

    pub fn layout(&self) -> ImageLayout {
        self.split.images.layout()
    }
}

impl Dataset<DigitSample> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitSample> {
        let pixels = self.split.images.image(index)?;
        let target = self.split.labels.row(index)?;
        Some(DigitSample {
            pixels: pixels.to_vec(),
            target: target.to_vec(),
        })
    }

    fn len(&self) -> usize {
        self.split.len()
    }
}
