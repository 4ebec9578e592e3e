// ============================================================
// Layer 4 — Digit Loaders
// ============================================================
// Two DigitSource implementations:
//
//   BurnMnistSource — Burn's MnistDataset. Downloads the
//                     original archives into Burn's cache on
//                     first use, then reads them from disk.
//
//   IdxDirSource    — reads the four raw IDX files from a
//                     directory the user points at:
//                       train-images-idx3-ubyte
//                       train-labels-idx1-ubyte
//                       t10k-images-idx3-ubyte
//                       t10k-labels-idx1-ubyte
//
// IDX format (all integers big-endian):
//   images: magic 2051 | count | rows | cols | count*rows*cols bytes
//   labels: magic 2049 | count | count bytes

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use thiserror::Error;

use burn::data::dataset::{vision::MnistDataset, Dataset};

use crate::domain::digit::{DigitCorpus, DigitSplit, IMAGE_HEIGHT, IMAGE_WIDTH, PIXELS_PER_IMAGE};
use crate::domain::traits::DigitSource;

const IDX_IMAGES_MAGIC: u32 = 2051;
const IDX_LABELS_MAGIC: u32 = 2049;

// ─── BurnMnistSource ──────────────────────────────────────────────────────────

/// Loads MNIST through Burn's built-in vision dataset.
#[derive(Debug, Default)]
pub struct BurnMnistSource;

impl BurnMnistSource {
    pub fn new() -> Self {
        Self
    }
}

impl DigitSource for BurnMnistSource {
    fn load(&self) -> Result<DigitCorpus> {
        tracing::info!("Loading MNIST through burn's dataset cache");
        let train = split_from_burn(&MnistDataset::train());
        let test  = split_from_burn(&MnistDataset::test());
        Ok(DigitCorpus { train, test })
    }

    fn describe(&self) -> String {
        "burn MnistDataset".to_string()
    }
}

/// Burn stores pixels as f32 in 0..=255; cast them back to bytes.
fn split_from_burn(dataset: &MnistDataset) -> DigitSplit {
    let mut images = Vec::with_capacity(dataset.len() * PIXELS_PER_IMAGE);
    let mut labels = Vec::with_capacity(dataset.len());

    for item in dataset.iter() {
        for row in item.image.iter() {
            images.extend(row.iter().map(|&p| p.round().clamp(0.0, 255.0) as u8));
        }
        labels.push(item.label);
    }

    DigitSplit::new(images, labels)
}

// ─── IdxDirSource ─────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdxError {
    #[error("file is {len} bytes, too short for an IDX header")]
    MissingHeader { len: usize },

    #[error("bad magic number {found} (expected {expected})")]
    BadMagic { found: u32, expected: u32 },

    #[error("images are {rows}x{cols}, expected 28x28")]
    UnexpectedDimensions { rows: usize, cols: usize },

    #[error("header announces {expected} payload bytes but only {actual} are present")]
    Truncated { expected: usize, actual: usize },

    #[error("{images} images but {labels} labels")]
    CountMismatch { images: usize, labels: usize },
}

/// Loads MNIST from raw IDX files in a directory.
#[derive(Debug)]
pub struct IdxDirSource {
    dir: PathBuf,
}

impl IdxDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load_split(&self, prefix: &str) -> Result<DigitSplit> {
        let images_path = self.resolve(prefix, "images-idx3-ubyte")?;
        let labels_path = self.resolve(prefix, "labels-idx1-ubyte")?;

        let image_bytes = fs::read(&images_path)
            .with_context(|| format!("Cannot read '{}'", images_path.display()))?;
        let label_bytes = fs::read(&labels_path)
            .with_context(|| format!("Cannot read '{}'", labels_path.display()))?;

        let (count, images) = parse_idx_images(&image_bytes)
            .with_context(|| format!("Invalid IDX image file '{}'", images_path.display()))?;
        let labels = parse_idx_labels(&label_bytes)
            .with_context(|| format!("Invalid IDX label file '{}'", labels_path.display()))?;

        if count != labels.len() {
            return Err(IdxError::CountMismatch { images: count, labels: labels.len() })
                .with_context(|| format!("Mismatched '{prefix}' split in '{}'", self.dir.display()));
        }

        tracing::debug!("Read {} '{}' digits from '{}'", count, prefix, self.dir.display());
        Ok(DigitSplit::new(images, labels))
    }

    /// Accept both `train-images-idx3-ubyte` and `train-images.idx3-ubyte`
    fn resolve(&self, prefix: &str, suffix: &str) -> Result<PathBuf> {
        let (kind, ext) = suffix.split_once('-').unwrap_or((suffix, ""));
        let candidates = [
            self.dir.join(format!("{prefix}-{suffix}")),
            self.dir.join(format!("{prefix}-{kind}.{ext}")),
        ];

        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .with_context(|| {
                format!(
                    "Cannot find '{}' in '{}'",
                    candidates[0].file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                    self.dir.display()
                )
            })
    }
}

impl DigitSource for IdxDirSource {
    fn load(&self) -> Result<DigitCorpus> {
        tracing::info!("Loading IDX files from '{}'", self.dir.display());
        let train = self.load_split("train")?;
        let test  = self.load_split("t10k")?;
        Ok(DigitCorpus { train, test })
    }

    fn describe(&self) -> String {
        format!("IDX files in '{}'", self.dir.display())
    }
}

fn read_be_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let word: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(word))
}

/// Parse an IDX3 image file into (count, row-major pixel bytes).
pub fn parse_idx_images(bytes: &[u8]) -> Result<(usize, Vec<u8>), IdxError> {
    let header = |i: usize| read_be_u32(bytes, i * 4).ok_or(IdxError::MissingHeader { len: bytes.len() });

    let magic = header(0)?;
    if magic != IDX_IMAGES_MAGIC {
        return Err(IdxError::BadMagic { found: magic, expected: IDX_IMAGES_MAGIC });
    }
    let count = header(1)? as usize;
    let rows  = header(2)? as usize;
    let cols  = header(3)? as usize;

    if rows != IMAGE_HEIGHT || cols != IMAGE_WIDTH {
        return Err(IdxError::UnexpectedDimensions { rows, cols });
    }

    let payload  = &bytes[16..];
    let expected = count * PIXELS_PER_IMAGE;
    if payload.len() < expected {
        return Err(IdxError::Truncated { expected, actual: payload.len() });
    }

    Ok((count, payload[..expected].to_vec()))
}

/// Parse an IDX1 label file.
pub fn parse_idx_labels(bytes: &[u8]) -> Result<Vec<u8>, IdxError> {
    let header = |i: usize| read_be_u32(bytes, i * 4).ok_or(IdxError::MissingHeader { len: bytes.len() });

    let magic = header(0)?;
    if magic != IDX_LABELS_MAGIC {
        return Err(IdxError::BadMagic { found: magic, expected: IDX_LABELS_MAGIC });
    }
    let count = header(1)? as usize;

    let payload = &bytes[8..];
    if payload.len() < count {
        return Err(IdxError::Truncated { expected: count, actual: payload.len() });
    }

    Ok(payload[..count].to_vec())
}
