// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer loads digits through DigitSource and
// never learns where they came from:
//   - BurnMnistSource → Burn's downloadable MNIST dataset
//   - IdxDirSource    → raw IDX files in a local directory

use anyhow::Result;

use crate::domain::digit::DigitCorpus;

// ─── DigitSource ──────────────────────────────────────────────────────────────
/// Any component that can produce the train/test digit partitions.
pub trait DigitSource {
    /// Load both partitions into memory.
    fn load(&self) -> Result<DigitCorpus>;

    /// Human readable origin, used in log lines
    fn describe(&self) -> String;
}
