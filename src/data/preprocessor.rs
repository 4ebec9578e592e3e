// ============================================================
// Layer 4 — Digit Preprocessor
// ============================================================
// Turns raw bytes into model-ready floats.
//
// Steps (applied to each split):
//   1. Check that pixel count == label count * 784
//   2. Rescale every pixel from 0..=255 to 0.0..=1.0
//   3. Tag the image buffer with its 4-D layout:
//        channels-last  → (N, 28, 28, 1)
//        channels-first → (N, 1, 28, 28)
//   4. One-hot encode labels into an (N, 10) matrix
//
// With a single channel both layouts share the same flat
// buffer; only the declared dimensions differ.

use thiserror::Error;

use crate::domain::digit::{DigitSplit, NUM_CLASSES, PIXELS_PER_IMAGE};
use crate::domain::layout::ImageLayout;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("label {label} at index {index} is outside 0..={max}", max = NUM_CLASSES - 1)]
    LabelOutOfRange { index: usize, label: u8 },

    #[error("{pixels} pixels cannot hold {labels} images of 784 pixels")]
    CountMismatch { pixels: usize, labels: usize },
}

// ─── ImageTensor ──────────────────────────────────────────────────────────────
/// Normalised images, `[0, 1]` floats with an explicit 4-D layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    layout: ImageLayout,
    count:  usize,
    data:   Vec<f32>,
}

impl ImageTensor {
    pub fn layout(&self) -> ImageLayout {
        self.layout
    }

    /// (N, H, W, C) or (N, C, H, W) depending on the layout
    pub fn dims(&self) -> [usize; 4] {
        self.layout.dims(self.count)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The 784 floats of image `index`
    pub fn image(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(PIXELS_PER_IMAGE)?;
        self.data.get(start..start + PIXELS_PER_IMAGE)
    }
}

// ─── OneHotLabels ─────────────────────────────────────────────────────────────
/// An (N, 10) matrix; row `i` has a single 1.0 at the label's column.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotLabels {
    rows: usize,
    data: Vec<f32>,
}

impl OneHotLabels {
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn dims(&self) -> [usize; 2] {
        [self.rows, NUM_CLASSES]
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(NUM_CLASSES)?;
        self.data.get(start..start + NUM_CLASSES)
    }

    /// Column holding the 1.0 in row `index`
    pub fn class_of(&self, index: usize) -> Option<usize> {
        self.row(index)?.iter().position(|&v| v == 1.0)
    }
}

/// One preprocessed partition. Images and labels always have the
/// same length; the Preprocessor is the only constructor.
#[derive(Debug, Clone)]
pub struct PreparedSplit {
    pub images: ImageTensor,
    pub labels: OneHotLabels,
}

impl PreparedSplit {
    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

// ─── Preprocessor ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor {
    layout: ImageLayout,
}

impl Preprocessor {
    /// Create a preprocessor emitting images in `layout`
    pub fn new(layout: ImageLayout) -> Self {
        Self { layout }
    }

    /// Run all steps on one split.
    pub fn process(&self, split: &DigitSplit) -> Result<PreparedSplit, PreprocessError> {
        let images = self.images(split)?;
        let labels = one_hot(&split.labels)?;

        tracing::debug!(
            "Preprocessed {} digits into {:?} images and {:?} labels",
            labels.len(),
            images.dims(),
            labels.dims(),
        );

        Ok(PreparedSplit { images, labels })
    }

    /// Rescale and shape the pixels of `split`.
    pub fn images(&self, split: &DigitSplit) -> Result<ImageTensor, PreprocessError> {
        if split.images.len() != split.labels.len() * PIXELS_PER_IMAGE {
            return Err(PreprocessError::CountMismatch {
                pixels: split.images.len(),
                labels: split.labels.len(),
            });
        }

        Ok(ImageTensor {
            layout: self.layout,
            count:  split.labels.len(),
            data:   split.images.iter().map(|&p| normalize_pixel(p)).collect(),
        })
    }
}

/// 0 → 0.0, 255 → 1.0
pub fn normalize_pixel(pixel: u8) -> f32 {
    pixel as f32 / 255.0
}

/// Encode integer class labels as an (N, 10) one-hot matrix.
pub fn one_hot(labels: &[u8]) -> Result<OneHotLabels, PreprocessError> {
    let mut data = vec![0.0f32; labels.len() * NUM_CLASSES];

    for (index, &label) in labels.iter().enumerate() {
        let class = label as usize;
        if class >= NUM_CLASSES {
            return Err(PreprocessError::LabelOutOfRange { index, label });
        }
        data[index * NUM_CLASSES + class] = 1.0;
    }

    Ok(OneHotLabels { rows: labels.len(), data })
}
