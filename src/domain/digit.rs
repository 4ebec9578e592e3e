// ============================================================
// Layer 3 — Digit Domain Types
// ============================================================
// Raw MNIST data exactly as a loader hands it over: unsigned
// 8-bit pixels and unsigned 8-bit class labels. Nothing here
// is normalised yet; that is the Preprocessor's job.

/// Image height in pixels
pub const IMAGE_HEIGHT: usize = 28;

/// Image width in pixels
pub const IMAGE_WIDTH: usize = 28;

/// Grayscale images have a single channel
pub const IMAGE_CHANNELS: usize = 1;

/// Number of pixels in one image
pub const PIXELS_PER_IMAGE: usize = IMAGE_HEIGHT * IMAGE_WIDTH * IMAGE_CHANNELS;

/// Number of digit classes (0..=9)
pub const NUM_CLASSES: usize = 10;

/// One partition (train or test) of raw digits.
///
/// `images` holds `len() * PIXELS_PER_IMAGE` bytes, image after
/// image, each image row-major. `labels[i]` belongs to image `i`.
#[derive(Debug, Clone, Default)]
pub struct DigitSplit {
    pub images: Vec<u8>,
    pub labels: Vec<u8>,
}

impl DigitSplit {
    pub fn new(images: Vec<u8>, labels: Vec<u8>) -> Self {
        Self { images, labels }
    }

    /// Number of labelled images in this split
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Pixels of image `index`, or `None` if out of range
    pub fn image(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(PIXELS_PER_IMAGE)?;
        self.images.get(start..start + PIXELS_PER_IMAGE)
    }

    /// Keep only the images at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut images = Vec::with_capacity(indices.len() * PIXELS_PER_IMAGE);
        let mut labels = Vec::with_capacity(indices.len());

        for &i in indices {
            if let (Some(pixels), Some(&label)) = (self.image(i), self.labels.get(i)) {
                images.extend_from_slice(pixels);
                labels.push(label);
            }
        }

        Self { images, labels }
    }
}

/// The full dataset: a training partition and a held-out test partition.
#[derive(Debug, Clone, Default)]
pub struct DigitCorpus {
    pub train: DigitSplit,
    pub test:  DigitSplit,
}
