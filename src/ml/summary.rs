// ============================================================
// Layer 5 — Model Summary
// ============================================================
// Layer-by-layer table of a DigitCnn: output shape (batch
// axis omitted, channels-first) and learnable parameter count.
//
//   Layer            Type        Output shape      Params
//   conv1            Conv2d      [32, 26, 26]         320
//   ...
//   Total params: 600,810

use std::fmt;

use burn::prelude::*;

use crate::domain::digit::{IMAGE_HEIGHT, NUM_CLASSES};
use crate::ml::model::{DigitCnn, CONV_FILTERS, FLATTENED_FEATURES, HIDDEN_UNITS, KERNEL_SIZE, POOLED_SIDE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub name:         &'static str,
    pub kind:         &'static str,
    pub output_shape: Vec<usize>,
    pub params:       usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub rows: Vec<SummaryRow>,
}

impl ModelSummary {
    pub fn of<B: Backend>(model: &DigitCnn<B>) -> Self {
        // Square input, valid padding
        let conv1_side = IMAGE_HEIGHT - (KERNEL_SIZE - 1);
        let conv2_side = conv1_side - (KERNEL_SIZE - 1);
        let pooled     = vec![CONV_FILTERS, POOLED_SIDE, POOLED_SIDE];

        let row = |name, kind, output_shape: Vec<usize>, params| SummaryRow {
            name,
            kind,
            output_shape,
            params,
        };

        Self {
            rows: vec![
                row("conv1", "Conv2d", vec![CONV_FILTERS, conv1_side, conv1_side], model.conv1.num_params()),
                row("relu1", "Relu", vec![CONV_FILTERS, conv1_side, conv1_side], 0),
                row("conv2", "Conv2d", vec![CONV_FILTERS, conv2_side, conv2_side], model.conv2.num_params()),
                row("relu2", "Relu", vec![CONV_FILTERS, conv2_side, conv2_side], 0),
                row("pool", "MaxPool2d", pooled.clone(), 0),
                row("conv_dropout", "Dropout", pooled, 0),
                row("flatten", "Flatten", vec![FLATTENED_FEATURES], 0),
                row("fc1", "Linear", vec![HIDDEN_UNITS], model.fc1.num_params()),
                row("relu3", "Relu", vec![HIDDEN_UNITS], 0),
                row("dense_dropout", "Dropout", vec![HIDDEN_UNITS], 0),
                row("fc2", "Linear", vec![NUM_CLASSES], model.fc2.num_params()),
                row("softmax", "Softmax", vec![NUM_CLASSES], 0),
            ],
        }
    }

    pub fn total_params(&self) -> usize {
        self.rows.iter().map(|r| r.params).sum()
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(62);
        writeln!(f, "{:<16}{:<12}{:<20}{:>14}", "Layer", "Type", "Output shape", "Params")?;
        writeln!(f, "{rule}")?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<16}{:<12}{:<20}{:>14}",
                r.name,
                r.kind,
                format!("{:?}", r.output_shape),
                group_thousands(r.params),
            )?;
        }
        writeln!(f, "{rule}")?;
        write!(f, "Total params: {}", group_thousands(self.total_params()))
    }
}

/// 600810 → "600,810"
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
