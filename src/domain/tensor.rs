// ============================================================
// Layer 3 — Host Tensor
// ============================================================
// A dense, row-major f32 array that carries its own shape.
//
// Parameters leave Burn as HostTensors so that the export
// step can permute axes and serialise bytes without touching
// the framework. Every operation checks the shape it is given;
// a wrong axis order is otherwise invisible in a raw .dat file.
//
// Row-major means the LAST axis varies fastest:
//   shape [2, 3], data [a b c d e f]  →  [[a b c]
//                                         [d e f]]

use thiserror::Error;

/// Shape, permutation and size errors raised while reordering tensors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("shape {shape:?} holds {expected} elements but {actual} values were given")]
    LengthMismatch {
        shape:    Vec<usize>,
        expected: usize,
        actual:   usize,
    },

    #[error("expected a rank-{expected} tensor, got shape {shape:?}")]
    RankMismatch { expected: usize, shape: Vec<usize> },

    #[error("{perm:?} is not a permutation of the axes 0..{rank}")]
    InvalidPermutation { perm: Vec<usize>, rank: usize },

    #[error("{tensor}: expected shape {expected:?}, got {actual:?}")]
    ShapeMismatch {
        tensor:   String,
        expected: Vec<usize>,
        actual:   Vec<usize>,
    },

    #[error("{tensor}: wrote {written} bytes for {elements} f32 elements")]
    ByteCount {
        tensor:   String,
        written:  usize,
        elements: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostTensor {
    shape: Vec<usize>,
    data:  Vec<f32>,
}

impl HostTensor {
    /// Wrap `data` as a tensor of `shape`. Fails if the element
    /// count does not match the product of the dimensions.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, LayoutError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(LayoutError::LengthMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Size in bytes once serialised as 32-bit floats
    pub fn byte_len(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// Reorder axes so that output axis `i` is input axis `perm[i]`.
    ///
    /// Same convention as `numpy.transpose(x, perm)`:
    ///   shape [2, 3, 4] with perm [2, 0, 1] → shape [4, 2, 3]
    pub fn permute(&self, perm: &[usize]) -> Result<Self, LayoutError> {
        check_permutation(perm, self.rank())?;

        let rank        = self.rank();
        let in_strides  = row_major_strides(&self.shape);
        let out_shape: Vec<usize> = perm.iter().map(|&axis| self.shape[axis]).collect();
        // Stride in the source buffer for each output axis
        let src_strides: Vec<usize> = perm.iter().map(|&axis| in_strides[axis]).collect();

        let mut data  = Vec::with_capacity(self.data.len());
        let mut index = vec![0usize; rank];

        if self.data.is_empty() {
            return Ok(Self { shape: out_shape, data });
        }

        loop {
            let offset: usize = index
                .iter()
                .zip(&src_strides)
                .map(|(i, stride)| i * stride)
                .sum();
            data.push(self.data[offset]);

            // Odometer increment, last axis fastest
            let mut axis = rank;
            loop {
                if axis == 0 {
                    return Ok(Self { shape: out_shape, data });
                }
                axis -= 1;
                index[axis] += 1;
                if index[axis] < out_shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
    }

    /// Swap the two axes of a matrix.
    pub fn transpose(&self) -> Result<Self, LayoutError> {
        if self.rank() != 2 {
            return Err(LayoutError::RankMismatch {
                expected: 2,
                shape:    self.shape.clone(),
            });
        }
        self.permute(&[1, 0])
    }

    /// Flat little-endian f32 bytes, no header
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_len());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }
}

/// The permutation that undoes `perm`.
pub fn invert_permutation(perm: &[usize]) -> Result<Vec<usize>, LayoutError> {
    check_permutation(perm, perm.len())?;
    let mut inverse = vec![0usize; perm.len()];
    for (i, &axis) in perm.iter().enumerate() {
        inverse[axis] = i;
    }
    Ok(inverse)
}

fn check_permutation(perm: &[usize], rank: usize) -> Result<(), LayoutError> {
    let invalid = || LayoutError::InvalidPermutation {
        perm: perm.to_vec(),
        rank,
    };

    if perm.len() != rank {
        return Err(invalid());
    }
    let mut seen = vec![false; rank];
    for &axis in perm {
        if axis >= rank || seen[axis] {
            return Err(invalid());
        }
        seen[axis] = true;
    }
    Ok(())
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iota(shape: &[usize]) -> HostTensor {
        let n: usize = shape.iter().product();
        HostTensor::new(shape.to_vec(), (0..n).map(|v| v as f32).collect()).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = HostTensor::new(vec![2, 3], vec![0.0; 5]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::LengthMismatch { shape: vec![2, 3], expected: 6, actual: 5 }
        );
    }

    #[test]
    fn test_transpose_moves_values() {
        let m = iota(&[2, 3]);
        let t = m.transpose().unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.data(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn test_transpose_is_self_inverse() {
        let m = iota(&[7, 5]);
        assert_eq!(m.transpose().unwrap().transpose().unwrap(), m);
    }

    #[test]
    fn test_transpose_requires_matrix() {
        assert!(matches!(
            iota(&[2, 2, 2]).transpose(),
            Err(LayoutError::RankMismatch { expected: 2, .. })
        ));
    }

    #[test]
    fn test_permute_picks_the_right_element() {
        // x[h][w][i][o] = ((h*3 + w)*2 + i)*4 + o
        let x = iota(&[3, 3, 2, 4]);
        let y = x.permute(&[3, 0, 1, 2]).unwrap();
        assert_eq!(y.shape(), &[4, 3, 3, 2]);

        // y[o][h][w][i] must equal x[h][w][i][o]
        for o in 0..4 {
            for h in 0..3 {
                for w in 0..3 {
                    for i in 0..2 {
                        let yv = y.data()[((o * 3 + h) * 3 + w) * 2 + i];
                        let xv = x.data()[((h * 3 + w) * 2 + i) * 4 + o];
                        assert_eq!(yv, xv);
                    }
                }
            }
        }
    }

    #[test]
    fn test_permute_round_trip_for_many_shapes() {
        let perm    = [3, 0, 1, 2];
        let inverse = invert_permutation(&perm).unwrap();
        assert_eq!(inverse, vec![1, 2, 3, 0]);

        for kh in 1..=3 {
            for kw in 1..=3 {
                for ic in 1..=3 {
                    for oc in [1, 2, 5] {
                        let x    = iota(&[kh, kw, ic, oc]);
                        let back = x.permute(&perm).unwrap().permute(&inverse).unwrap();
                        assert_eq!(back, x);
                    }
                }
            }
        }
    }

    #[test]
    fn test_permute_rejects_bad_permutations() {
        let x = iota(&[2, 2]);
        assert!(x.permute(&[0, 0]).is_err());
        assert!(x.permute(&[0, 2]).is_err());
        assert!(x.permute(&[0]).is_err());
    }

    #[test]
    fn test_le_bytes_length_and_order() {
        let x     = HostTensor::new(vec![2], vec![1.0, -2.5]).unwrap();
        let bytes = x.to_le_bytes();
        assert_eq!(bytes.len(), x.byte_len());
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(-2.5f32).to_le_bytes());
    }
}
