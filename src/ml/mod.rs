// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model, optimizer and training code lives here.
// The data layer builds Burn batches; everything downstream of
// this layer (export, checkpoints) sees host tensors or
// records, never a live autodiff graph.
//
//   backend.rs   — NdArray or Wgpu, picked by cargo feature
//   model.rs     — the fixed conv → conv → pool → dense → dense net
//   adadelta.rs  — Adadelta as a Burn SimpleOptimizer
//   trainer.rs   — epoch loop: forward, backward, step, validate
//   evaluator.rs — mean loss and accuracy over a data loader
//   params.rs    — learned tensors out of Burn into HostTensors
//   summary.rs   — layer table with parameter counts
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Compile-time backend choice
pub mod backend;

/// DigitCnn architecture and loss
pub mod model;

/// Adadelta optimizer
pub mod adadelta;

/// Training loop with per-epoch validation
pub mod trainer;

/// Loss and accuracy over a data set
pub mod evaluator;

/// Parameter extraction for export
pub mod params;

/// Printable model summary
pub mod summary;
