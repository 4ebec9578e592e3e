// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw digit bytes to tensor batches:
//
//   DigitSource (loader)   → raw u8 pixels and labels
//       │
//       ▼
//   take_random (sampler)  → optional seeded subset
//       │
//       ▼
//   Preprocessor           → [0,1] floats in an ImageLayout + one-hot labels
//       │
//       ▼
//   DigitDataset           → implements Burn's Dataset trait
//       │
//       ▼
//   DigitBatcher           → [batch,1,28,28] images, [batch,10] targets
//       │
//       ▼
//   DataLoader             → feeds batches to the training loop

/// Burn MNIST and raw IDX loaders
pub mod loader;

/// Seeded random subsets for quick runs
pub mod sampler;

/// Normalisation, layout tagging and one-hot encoding
pub mod preprocessor;

/// Implements Burn's Dataset trait for preprocessed digits
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
