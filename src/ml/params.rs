// ============================================================
// Layer 5 — Parameter Extraction
// ============================================================
// Pulls every learned tensor out of a DigitCnn into host
// memory, tagged with the layout Burn stores it in:
//
//   Conv2d weight  [out, in, kh, kw]   OIHW
//   Linear weight  [in, out]           InOut
//
// The result is framework-free and goes straight to the
// exporter.

use anyhow::{anyhow, Context, Result};
use burn::prelude::*;
use burn::nn::{conv::Conv2d, Linear};

use crate::domain::layout::{DenseLayout, KernelLayout};
use crate::domain::parameters::LayerParameters;
use crate::domain::tensor::HostTensor;
use crate::ml::model::DigitCnn;

/// Weights and biases in forward order: conv1, conv2, fc1, fc2.
pub fn extract_parameters<B: Backend>(model: &DigitCnn<B>) -> Result<Vec<LayerParameters>> {
    Ok(vec![
        conv_parameters("conv1", &model.conv1)?,
        conv_parameters("conv2", &model.conv2)?,
        dense_parameters("fc1", &model.fc1)?,
        dense_parameters("fc2", &model.fc2)?,
    ])
}

fn conv_parameters<B: Backend>(name: &str, conv: &Conv2d<B>) -> Result<LayerParameters> {
    let weight = to_host(conv.weight.val()).with_context(|| format!("{name} weight"))?;
    let bias   = conv
        .bias
        .as_ref()
        .ok_or_else(|| anyhow!("{name} has no bias"))?;
    let bias   = to_host(bias.val()).with_context(|| format!("{name} bias"))?;

    Ok(LayerParameters::kernel(name, weight, KernelLayout::Oihw, bias))
}

fn dense_parameters<B: Backend>(name: &str, linear: &Linear<B>) -> Result<LayerParameters> {
    let weight = to_host(linear.weight.val()).with_context(|| format!("{name} weight"))?;
    let bias   = linear
        .bias
        .as_ref()
        .ok_or_else(|| anyhow!("{name} has no bias"))?;
    let bias   = to_host(bias.val()).with_context(|| format!("{name} bias"))?;

    Ok(LayerParameters::dense(name, weight, DenseLayout::InOut, bias))
}

fn to_host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<HostTensor> {
    let shape = tensor.dims().to_vec();
    let data  = tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read tensor data: {e:?}"))?;
    Ok(HostTensor::new(shape, data)?)
}
