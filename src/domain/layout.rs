// ============================================================
// Layer 3 — Axis Layouts
// ============================================================
// Names for every memory order the pipeline deals with, and
// the axis permutations between them.
//
//   Images:        NHWC (channels last)  or  NCHW (channels first)
//   Conv kernels:  HWIO (Keras/TF)  OIHW (Burn/PyTorch)  OHWI (MPS)
//   Dense weights: [in, out] (Burn/Keras)  or  [out, in] (MPS)
//
// A permutation `p` follows HostTensor::permute: output axis i
// is input axis p[i]. HWIO → OHWI is therefore [3, 0, 1, 2],
// the same result as swapping axes (2,3), then (1,2), then (0,1).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::digit::{IMAGE_CHANNELS, IMAGE_HEIGHT, IMAGE_WIDTH};

// ─── ImageLayout ──────────────────────────────────────────────────────────────

/// Memory order of a batch of images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageLayout {
    /// (batch, height, width, channel)
    #[default]
    ChannelsLast,
    /// (batch, channel, height, width)
    ChannelsFirst,
}

impl ImageLayout {
    /// Dimensions of a batch of `batch` digit images in this layout
    pub const fn dims(self, batch: usize) -> [usize; 4] {
        match self {
            Self::ChannelsLast  => [batch, IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_CHANNELS],
            Self::ChannelsFirst => [batch, IMAGE_CHANNELS, IMAGE_HEIGHT, IMAGE_WIDTH],
        }
    }

    /// Permutation that brings this layout to channels-first,
    /// the order Burn's convolutions consume.
    pub const fn to_channels_first(self) -> [usize; 4] {
        match self {
            Self::ChannelsLast  => [0, 3, 1, 2],
            Self::ChannelsFirst => [0, 1, 2, 3],
        }
    }
}

// ─── KernelLayout ─────────────────────────────────────────────────────────────

/// Role of one axis of a convolution kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelAxis {
    Out,
    In,
    Height,
    Width,
}

/// Axis order of a 4-D convolution kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelLayout {
    /// [kH, kW, iC, oC]
    Hwio,
    /// [oC, iC, kH, kW]
    Oihw,
    /// [oC, kH, kW, iC]
    Ohwi,
}

impl KernelLayout {
    pub const fn axes(self) -> [KernelAxis; 4] {
        use KernelAxis::*;
        match self {
            Self::Hwio => [Height, Width, In, Out],
            Self::Oihw => [Out, In, Height, Width],
            Self::Ohwi => [Out, Height, Width, In],
        }
    }

    /// Position of `axis` in this layout
    pub const fn index_of(self, axis: KernelAxis) -> usize {
        use KernelAxis::*;
        match (self, axis) {
            (Self::Hwio, Height) | (Self::Oihw, Out)    | (Self::Ohwi, Out)    => 0,
            (Self::Hwio, Width)  | (Self::Oihw, In)     | (Self::Ohwi, Height) => 1,
            (Self::Hwio, In)     | (Self::Oihw, Height) | (Self::Ohwi, Width)  => 2,
            (Self::Hwio, Out)    | (Self::Oihw, Width)  | (Self::Ohwi, In)     => 3,
        }
    }

    /// Permutation taking a kernel stored in `self` order to `target` order.
    pub fn permutation_to(self, target: KernelLayout) -> [usize; 4] {
        target.axes().map(|axis| self.index_of(axis))
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Hwio => "hwio",
            Self::Oihw => "oihw",
            Self::Ohwi => "ohwi",
        }
    }

    /// Shape of a kernel with the given sizes in this layout
    pub fn shape(self, out: usize, input: usize, height: usize, width: usize) -> [usize; 4] {
        self.axes().map(|axis| match axis {
            KernelAxis::Out    => out,
            KernelAxis::In     => input,
            KernelAxis::Height => height,
            KernelAxis::Width  => width,
        })
    }
}

// ─── DenseLayout ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenseAxis {
    Out,
    In,
}

/// Axis order of a fully-connected weight matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenseLayout {
    /// [input features, output features]
    InOut,
    /// [output features, input features]
    OutIn,
}

impl DenseLayout {
    pub const fn axes(self) -> [DenseAxis; 2] {
        match self {
            Self::InOut => [DenseAxis::In, DenseAxis::Out],
            Self::OutIn => [DenseAxis::Out, DenseAxis::In],
        }
    }

    pub const fn index_of(self, axis: DenseAxis) -> usize {
        match (self, axis) {
            (Self::InOut, DenseAxis::In) | (Self::OutIn, DenseAxis::Out) => 0,
            (Self::InOut, DenseAxis::Out) | (Self::OutIn, DenseAxis::In) => 1,
        }
    }

    pub fn permutation_to(self, target: DenseLayout) -> [usize; 2] {
        target.axes().map(|axis| self.index_of(axis))
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::InOut => "in-out",
            Self::OutIn => "out-in",
        }
    }

    pub fn shape(self, out: usize, input: usize) -> [usize; 2] {
        self.axes().map(|axis| match axis {
            DenseAxis::Out => out,
            DenseAxis::In  => input,
        })
    }
}

// ─── ExportTarget ─────────────────────────────────────────────────────────────

/// The runtime the exported weight files are meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportTarget {
    /// Metal Performance Shaders: OHWI kernels, [out, in] dense weights
    #[default]
    Mps,
    /// Keras/TensorFlow: HWIO kernels, [in, out] dense weights
    Keras,
    /// Burn's own storage order: OIHW kernels, [in, out] dense weights
    Native,
}

impl ExportTarget {
    pub const fn kernel_layout(self) -> KernelLayout {
        match self {
            Self::Mps    => KernelLayout::Ohwi,
            Self::Keras  => KernelLayout::Hwio,
            Self::Native => KernelLayout::Oihw,
        }
    }

    pub const fn dense_layout(self) -> DenseLayout {
        match self {
            Self::Mps                 => DenseLayout::OutIn,
            Self::Keras | Self::Native => DenseLayout::InOut,
        }
    }
}

// ─── String forms (used by the CLI) ───────────────────────────────────────────

impl FromStr for ImageLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "channels-last"  | "nhwc" => Ok(Self::ChannelsLast),
            "channels-first" | "nchw" => Ok(Self::ChannelsFirst),
            other => Err(format!(
                "unknown image layout '{other}' (expected channels-last or channels-first)"
            )),
        }
    }
}

impl fmt::Display for ImageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelsLast  => write!(f, "channels-last"),
            Self::ChannelsFirst => write!(f, "channels-first"),
        }
    }
}

impl FromStr for ExportTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mps"    => Ok(Self::Mps),
            "keras"  => Ok(Self::Keras),
            "native" => Ok(Self::Native),
            other => Err(format!("unknown export target '{other}' (expected mps, keras or native)")),
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mps    => write!(f, "mps"),
            Self::Keras  => write!(f, "keras"),
            Self::Native => write!(f, "native"),
        }
    }
}
