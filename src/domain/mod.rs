// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the digit data and the
// parameter tensors moving through the pipeline.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Keeping Burn out of this layer lets the preprocessing and
// axis-permutation logic be unit tested on plain vectors.

/// Raw digit images and labels as loaded from disk
pub mod digit;

/// Image, kernel and dense-weight axis layouts
pub mod layout;

/// Shape-tagged host tensor used at the export boundary
pub mod tensor;

/// Learned weight/bias pairs detached from the framework
pub mod parameters;

/// Core abstractions (traits) that other layers implement
pub mod traits;
