// ============================================================
// Layer 6 — Weight Exporter
// ============================================================
// Writes every learned tensor as a raw .dat file for an
// external inference engine:
//
//   weights_conv1.dat  bias_conv1.dat
//   weights_conv2.dat  bias_conv2.dat
//   weights_fc1.dat    bias_fc1.dat
//   weights_fc2.dat    bias_fc2.dat
//   manifest.json
//
// .dat format: little-endian f32, row-major, no header. The
// reader has to know each shape in advance, so before writing:
//
//   1. the weight is permuted from its stored layout to the
//      target's layout (biases are written unchanged)
//   2. the permuted shape is checked against the shape the
//      network topology dictates for that target
//   3. the byte count is checked against elements × 4
//
// manifest.json records name, shape, layout and byte length of
// every file. The .dat files themselves stay header-free.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::digit::{IMAGE_CHANNELS, NUM_CLASSES};
use crate::domain::layout::ExportTarget;
use crate::domain::parameters::{LayerParameters, WeightLayout};
use crate::domain::tensor::{HostTensor, LayoutError};
use crate::ml::model::{CONV_FILTERS, FLATTENED_FEATURES, HIDDEN_UNITS, KERNEL_SIZE};

pub const MANIFEST_FILE: &str = "manifest.json";

/// One written file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub file:   String,
    pub layer:  String,
    pub shape:  Vec<usize>,
    /// Axis order of the data, e.g. "ohwi", "out-in", "vector"
    pub layout: String,
    pub bytes:  usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub target: ExportTarget,
    pub dtype:  String,
    pub endian: String,
    pub files:  Vec<ExportedFile>,
}

impl ExportManifest {
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

pub struct WeightExporter {
    dir:    PathBuf,
    target: ExportTarget,
}

impl WeightExporter {
    pub fn new(dir: impl Into<PathBuf>, target: ExportTarget) -> Self {
        Self { dir: dir.into(), target }
    }

    /// Reorder, check and write every layer, then the manifest.
    pub fn export(&self, layers: &[LayerParameters]) -> Result<ExportManifest> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create export directory '{}'", self.dir.display()))?;

        let mut files = Vec::with_capacity(layers.len() * 2);

        for layer in layers {
            let Some((expected, bias_len)) = expected_shapes(&layer.name, self.target) else {
                bail!("Unknown layer '{}': no reference shape to export against", layer.name);
            };

            let weight = reorder_weight(layer, self.target)?;
            check_shape(&format!("weights_{}", layer.name), &expected, weight.shape())?;
            check_shape(&format!("bias_{}", layer.name), &[bias_len], layer.bias.shape())?;

            let layout = match layer.weight_layout {
                WeightLayout::Kernel(_) => self.target.kernel_layout().name(),
                WeightLayout::Dense(_)  => self.target.dense_layout().name(),
            };

            files.push(self.write(&layer.name, "weights", layout, &weight)?);
            files.push(self.write(&layer.name, "bias", "vector", &layer.bias)?);
        }

        let manifest = ExportManifest {
            target: self.target,
            dtype:  "f32".to_string(),
            endian: "little".to_string(),
            files,
        };

        let path = self.dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("Cannot write manifest to '{}'", path.display()))?;

        tracing::info!(
            "Exported {} files ({} bytes) for target '{}' to '{}'",
            manifest.files.len(),
            manifest.total_bytes(),
            self.target,
            self.dir.display(),
        );
        Ok(manifest)
    }

    fn write(&self, layer: &str, role: &str, layout: &str, tensor: &HostTensor) -> Result<ExportedFile> {
        let file  = format!("{role}_{layer}.dat");
        let path  = self.dir.join(&file);
        let bytes = write_tensor(&path, tensor)?;

        tracing::debug!("Wrote {} {:?} ({} bytes)", file, tensor.shape(), bytes);
        Ok(ExportedFile {
            file,
            layer: layer.to_string(),
            shape: tensor.shape().to_vec(),
            layout: layout.to_string(),
            bytes,
        })
    }
}

/// Permute a layer's weight from its stored layout into `target`'s layout.
pub fn reorder_weight(layer: &LayerParameters, target: ExportTarget) -> Result<HostTensor, LayoutError> {
    match layer.weight_layout {
        WeightLayout::Kernel(source) => {
            require_rank(&layer.weight, 4)?;
            layer.weight.permute(&source.permutation_to(target.kernel_layout()))
        }
        WeightLayout::Dense(source) => {
            require_rank(&layer.weight, 2)?;
            layer.weight.permute(&source.permutation_to(target.dense_layout()))
        }
    }
}

/// Write `tensor` to `path` as raw little-endian f32 and return the
/// byte count, which must equal `elements × 4`.
pub fn write_tensor(path: &Path, tensor: &HostTensor) -> Result<usize> {
    let bytes = tensor.to_le_bytes();
    let name  = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if bytes.len() != tensor.num_elements() * std::mem::size_of::<f32>() {
        return Err(LayoutError::ByteCount {
            tensor:   name,
            written:  bytes.len(),
            elements: tensor.num_elements(),
        }
        .into());
    }

    fs::write(path, &bytes)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;
    Ok(bytes.len())
}

/// Weight shape in `target`'s layout and bias length of `layer`,
/// as fixed by the network. A bias has one entry per output unit.
pub fn expected_shapes(layer: &str, target: ExportTarget) -> Option<(Vec<usize>, usize)> {
    let kernel = target.kernel_layout();
    let dense  = target.dense_layout();
    let shapes = match layer {
        "conv1" => (kernel.shape(CONV_FILTERS, IMAGE_CHANNELS, KERNEL_SIZE, KERNEL_SIZE).to_vec(), CONV_FILTERS),
        "conv2" => (kernel.shape(CONV_FILTERS, CONV_FILTERS, KERNEL_SIZE, KERNEL_SIZE).to_vec(), CONV_FILTERS),
        "fc1"   => (dense.shape(HIDDEN_UNITS, FLATTENED_FEATURES).to_vec(), HIDDEN_UNITS),
        "fc2"   => (dense.shape(NUM_CLASSES, HIDDEN_UNITS).to_vec(), NUM_CLASSES),
        _ => return None,
    };
    Some(shapes)
}

fn require_rank(tensor: &HostTensor, rank: usize) -> Result<(), LayoutError> {
    if tensor.rank() != rank {
        return Err(LayoutError::RankMismatch {
            expected: rank,
            shape:    tensor.shape().to_vec(),
        });
    }
    Ok(())
}

fn check_shape(tensor: &str, expected: &[usize], actual: &[usize]) -> Result<(), LayoutError> {
    if expected != actual {
        return Err(LayoutError::ShapeMismatch {
            tensor:   tensor.to_string(),
            expected: expected.to_vec(),
            actual:   actual.to_vec(),
        });
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::{DenseLayout, KernelLayout};

    /// Tensor whose values are 0, 1, 2, ... so every position is distinct
    fn counting(shape: &[usize]) -> HostTensor {
        let n: usize = shape.iter().product();
        HostTensor::new(shape.to_vec(), (0..n).map(|i| i as f32).collect()).unwrap()
    }

    fn zeros(len: usize) -> HostTensor {
        HostTensor::new(vec![len], vec![0.0; len]).unwrap()
    }

    /// The four layers of the network in Burn's storage order
    fn burn_layers() -> Vec<LayerParameters> {
        vec![
            LayerParameters::kernel("conv1", counting(&[32, 1, 3, 3]), KernelLayout::Oihw, zeros(32)),
            LayerParameters::kernel("conv2", counting(&[32, 32, 3, 3]), KernelLayout::Oihw, zeros(32)),
            LayerParameters::dense("fc1", counting(&[4608, 128]), DenseLayout::InOut, zeros(128)),
            LayerParameters::dense("fc2", counting(&[128, 10]), DenseLayout::InOut, zeros(10)),
        ]
    }

    #[test]
    fn test_keras_conv1_to_mps_is_1152_bytes() {
        let dir   = tempfile::tempdir().unwrap();
        let layer = LayerParameters::kernel("conv1", counting(&[3, 3, 1, 32]), KernelLayout::Hwio, zeros(32));

        let weight = reorder_weight(&layer, ExportTarget::Mps).unwrap();
        assert_eq!(weight.shape(), &[32, 3, 3, 1]);
        // out=1, h=0, w=0, in=0 was HWIO index (0, 0, 0, 1)
        assert_eq!(weight.data()[9], 1.0);

        let bytes = write_tensor(&dir.path().join("weights_conv1.dat"), &weight).unwrap();
        // 32 * 3 * 3 * 1 elements
        assert_eq!(bytes, 1152);
        assert_eq!(fs::metadata(dir.path().join("weights_conv1.dat")).unwrap().len(), 1152);
    }

    #[test]
    fn test_dense_9216_by_128_is_transposed() {
        let dir   = tempfile::tempdir().unwrap();
        let layer = LayerParameters::dense("fc", counting(&[9216, 128]), DenseLayout::InOut, zeros(128));

        let weight = reorder_weight(&layer, ExportTarget::Mps).unwrap();
        assert_eq!(weight.shape(), &[128, 9216]);
        // [out=0, in=1] came from [in=1, out=0]
        assert_eq!(weight.data()[1], 128.0);

        let path  = dir.path().join("weights_fc.dat");
        let bytes = write_tensor(&path, &weight).unwrap();
        assert_eq!(bytes, 4_718_592);
        assert_eq!(fs::metadata(&path).unwrap().len(), 4_718_592);
    }

    #[test]
    fn test_burn_and_keras_kernels_export_identically() {
        let hwio  = counting(&[3, 3, 1, 32]);
        let oihw  = hwio.permute(&KernelLayout::Hwio.permutation_to(KernelLayout::Oihw)).unwrap();
        let keras = LayerParameters::kernel("conv1", hwio, KernelLayout::Hwio, zeros(32));
        let burn  = LayerParameters::kernel("conv1", oihw, KernelLayout::Oihw, zeros(32));

        for target in [ExportTarget::Mps, ExportTarget::Keras, ExportTarget::Native] {
            assert_eq!(
                reorder_weight(&keras, target).unwrap(),
                reorder_weight(&burn, target).unwrap(),
                "target {target}",
            );
        }
    }

    #[test]
    fn test_export_writes_all_files_and_manifest() {
        let dir      = tempfile::tempdir().unwrap();
        let exporter = WeightExporter::new(dir.path(), ExportTarget::Mps);
        let manifest = exporter.export(&burn_layers()).unwrap();

        let names: Vec<_> = manifest.files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(
            names,
            [
                "weights_conv1.dat", "bias_conv1.dat",
                "weights_conv2.dat", "bias_conv2.dat",
                "weights_fc1.dat",   "bias_fc1.dat",
                "weights_fc2.dat",   "bias_fc2.dat",
            ]
        );
        for f in &manifest.files {
            let on_disk = fs::metadata(dir.path().join(&f.file)).unwrap().len() as usize;
            assert_eq!(on_disk, f.bytes);
            assert_eq!(f.bytes, f.shape.iter().product::<usize>() * 4);
        }
        assert_eq!(manifest.files[2].shape, vec![32, 3, 3, 32]);
        assert_eq!(manifest.files[4].shape, vec![128, 4608]);
        assert_eq!(manifest.files[4].layout, "out-in");
        assert_eq!(manifest.total_bytes(), 600_810 * 4);

        let json: ExportManifest =
            serde_json::from_str(&fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(json, manifest);
    }

    #[test]
    fn test_dat_file_is_raw_little_endian() {
        let dir      = tempfile::tempdir().unwrap();
        let exporter = WeightExporter::new(dir.path(), ExportTarget::Native);
        exporter.export(&burn_layers()).unwrap();

        let bytes = fs::read(dir.path().join("weights_fc2.dat")).unwrap();
        assert_eq!(bytes.len(), 128 * 10 * 4);
        assert_eq!(&bytes[4..8], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let dir    = tempfile::tempdir().unwrap();
        let mut layers = burn_layers();
        layers[2] = LayerParameters::dense("fc1", counting(&[9216, 128]), DenseLayout::InOut, zeros(128));

        let err = WeightExporter::new(dir.path(), ExportTarget::Mps)
            .export(&layers)
            .unwrap_err();
        assert!(err.to_string().contains("weights_fc1"), "{err}");
    }

    #[test]
    fn test_wrong_bias_length_is_rejected() {
        let dir    = tempfile::tempdir().unwrap();
        let mut layers = burn_layers();
        layers[1] = LayerParameters::kernel("conv2", counting(&[32, 32, 3, 3]), KernelLayout::Oihw, zeros(10));

        let err = WeightExporter::new(dir.path(), ExportTarget::Keras)
            .export(&layers)
            .unwrap_err();
        assert!(err.to_string().contains("bias_conv2"), "{err}");
    }

    #[test]
    fn test_expected_shapes_per_target() {
        let (mps, bias) = expected_shapes("fc1", ExportTarget::Mps).unwrap();
        assert_eq!((mps, bias), (vec![128, 4608], 128));

        let (keras, bias) = expected_shapes("conv1", ExportTarget::Keras).unwrap();
        assert_eq!((keras, bias), (vec![3, 3, 1, 32], 32));

        let (native, bias) = expected_shapes("fc2", ExportTarget::Native).unwrap();
        assert_eq!((native, bias), (vec![128, 10], 10));

        assert!(expected_shapes("fc3", ExportTarget::Mps).is_none());
    }

    #[test]
    fn test_wrong_rank_is_rejected() {
        let layer = LayerParameters::kernel("conv1", counting(&[32, 9]), KernelLayout::Oihw, zeros(32));
        assert!(matches!(
            reorder_weight(&layer, ExportTarget::Mps),
            Err(LayoutError::RankMismatch { expected: 4, .. })
        ));
    }

    #[test]
    fn test_unknown_layer_is_rejected() {
        let dir   = tempfile::tempdir().unwrap();
        let layer = LayerParameters::dense("fc3", counting(&[10, 10]), DenseLayout::InOut, zeros(10));
        assert!(WeightExporter::new(dir.path(), ExportTarget::Mps).export(&[layer]).is_err());
    }
}
