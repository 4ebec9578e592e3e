// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Training runs on Autodiff<InnerBackend>; `model.valid()`
// drops back to InnerBackend for evaluation and export.
//
//   cargo run                          → NdArray (CPU)
//   cargo run --features wgpu          → Wgpu (GPU)

use burn::{backend::Autodiff, tensor::backend::Backend};

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray<f32>;

pub type TrainBackend = Autodiff<InnerBackend>;

pub type Device = <InnerBackend as Backend>::Device;

pub fn device() -> Device {
    let device = Device::default();
    tracing::info!("Using device: {:?}", device);
    device
}
