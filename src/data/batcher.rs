// ============================================================
// Layer 4 — Digit Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks DigitSamples into
//
//   images:  [batch, 1, 28, 28]  (channels-first, what Conv2d wants)
//   targets: [batch, 10]         (one-hot rows)
//
// Samples arrive in the dataset's ImageLayout. The flat buffer
// is first shaped in that layout, then permuted to
// channels-first, so a channels-last pipeline still feeds the
// convolutions the right axes.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::DigitSample;
use crate::domain::digit::NUM_CLASSES;
use crate::domain::layout::ImageLayout;

/// A batch of digits ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct DigitBatch<B: Backend> {
    /// [batch, 1, 28, 28]
    pub images: Tensor<B, 4>,
    /// [batch, 10], one-hot
    pub targets: Tensor<B, 2>,
}

#[derive(Clone, Debug, Default)]
pub struct DigitBatcher {
    layout: ImageLayout,
}

impl DigitBatcher {
    /// `layout` must match the layout the samples were preprocessed in
    pub fn new(layout: ImageLayout) -> Self {
        Self { layout }
    }
}

impl<B: Backend> Batcher<B, DigitSample, DigitBatch<B>> for DigitBatcher {
    fn batch(&self, items: Vec<DigitSample>, device: &B::Device) -> DigitBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items.iter().flat_map(|s| s.pixels.iter().copied()).collect();
        let targets: Vec<f32> = items.iter().flat_map(|s| s.target.iter().copied()).collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, self.layout.dims(batch_size)),
            device,
        )
        .permute(self.layout.to_channels_first());

        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(targets, [batch_size, NUM_CLASSES]),
            device,
        );

        DigitBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn sample(fill: f32, class: usize) -> DigitSample {
        let mut target = vec![0.0; NUM_CLASSES];
        target[class] = 1.0;
        DigitSample { pixels: vec![fill; 784], target }
    }

    #[test]
    fn test_batch_shapes_for_both_layouts() {
        let device = Default::default();
        for layout in [ImageLayout::ChannelsLast, ImageLayout::ChannelsFirst] {
            let batch: DigitBatch<TestBackend> = DigitBatcher::new(layout)
                .batch(vec![sample(0.0, 1), sample(1.0, 9)], &device);
            assert_eq!(batch.images.dims(), [2, 1, 28, 28]);
            assert_eq!(batch.targets.dims(), [2, 10]);
        }
    }

    #[test]
    fn test_channels_last_keeps_pixel_positions() {
        let device = Default::default();
        let mut item = sample(0.0, 0);
        // row 3, column 5
        item.pixels[3 * 28 + 5] = 0.5;

        let batch: DigitBatch<TestBackend> =
            DigitBatcher::new(ImageLayout::ChannelsLast).batch(vec![item], &device);
        let values = batch.images.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values[3 * 28 + 5], 0.5);
    }
}
