// ============================================================
// Layer 3 — Layer Parameters
// ============================================================
// The learned tensors of one layer, detached from Burn, with
// the axis order they are currently stored in. The exporter
// reads `weight_layout` to decide which permutation to apply.

use crate::domain::layout::{DenseLayout, KernelLayout};
use crate::domain::tensor::HostTensor;

/// Storage order of a layer's weight tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightLayout {
    Kernel(KernelLayout),
    Dense(DenseLayout),
}

/// Weight and bias of one learnable layer.
#[derive(Debug, Clone)]
pub struct LayerParameters {
    /// Role name used in file names: conv1, conv2, fc1, fc2
    pub name:          String,
    pub weight:        HostTensor,
    pub weight_layout: WeightLayout,
    pub bias:          HostTensor,
}

impl LayerParameters {
    pub fn kernel(name: impl Into<String>, weight: HostTensor, layout: KernelLayout, bias: HostTensor) -> Self {
        Self {
            name:          name.into(),
            weight,
            weight_layout: WeightLayout::Kernel(layout),
            bias,
        }
    }

    pub fn dense(name: impl Into<String>, weight: HostTensor, layout: DenseLayout, bias: HostTensor) -> Self {
        Self {
            name:          name.into(),
            weight,
            weight_layout: WeightLayout::Dense(layout),
            bias,
        }
    }

    pub fn num_params(&self) -> usize {
        self.weight.num_elements() + self.bias.num_elements()
    }
}
