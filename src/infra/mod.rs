// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the artifact directory:
//
//   checkpoint.rs — Burn DefaultRecorder checkpoints plus the
//                   run's TrainConfig as JSON, so export can
//                   rebuild the model without retraining
//
//   metrics.rs    — one CSV row per epoch
//
//   exporter.rs   — raw little-endian f32 weight files in the
//                   axis order of the target runtime, and a
//                   manifest.json describing them
//
// Reference: Burn Book §5 (Checkpointing)
//            Rust Book §9 (Error Handling with anyhow)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Weight file export
pub mod exporter;
