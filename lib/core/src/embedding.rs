use crate::{simd, Error, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

/// Embedding width used when nothing else is configured.
pub const DEFAULT_EMBEDDING_DIM: usize = 128;

/// A dense, fixed-length embedding of a subject or an item.
///
/// The length is fixed when the value is built and every comparison checks
/// it, so two embeddings of different widths are never silently truncated
/// or padded against each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding {
    data: Box<[f32]>,
}

impl Embedding {
    pub fn new(data: Vec<f32>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyEmbedding);
        }
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    /// Decode the packed little-endian `f32` blob the storage layer keeps.
    ///
    /// The blob must hold exactly `dim` values.
    pub fn from_le_bytes(blob: &[u8], dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::EmptyEmbedding);
        }
        if blob.len() != dim * 4 {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: blob.len() / 4,
            });
        }

        let mut buf = blob;
        let data: Vec<f32> = (0..dim).map(|_| buf.get_f32_le()).collect();
        Self::new(data)
    }

    /// Encode back into the packed little-endian blob form.
    pub fn to_le_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.data.len() * 4);
        for &x in self.data.iter() {
            buf.put_f32_le(x);
        }
        buf.freeze()
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        simd::norm(&self.data)
    }

    /// Fail unless this embedding is exactly `expected` wide.
    #[inline]
    pub fn ensure_dim(&self, expected: usize) -> Result<()> {
        if self.dim() != expected {
            return Err(Error::InvalidDimension {
                expected,
                actual: self.dim(),
            });
        }
        Ok(())
    }

    /// Cosine similarity in [-1, 1].
    ///
    /// Returns `Ok(None)` when either side has zero length, since the
    /// similarity is undefined there. Differing widths are an error.
    pub fn cosine_similarity(&self, other: &Embedding) -> Result<Option<f64>> {
        other.ensure_dim(self.dim())?;

        let denom = f64::from(self.norm()) * f64::from(other.norm());
        if denom == 0.0 {
            return Ok(None);
        }

        let dot = f64::from(simd::dot(&self.data, &other.data));
        Ok(Some(dot / denom))
    }
}

impl Embedding {
    /// `(1 - weight) * self + weight * other`.
    ///
    /// `weight` must lie in `[0, 1]` and both sides must share a width. No
    /// norm is involved, so zero-length vectors blend like any other.
    pub fn blend_toward(&self, other: &Embedding, weight: f32) -> Result<Embedding> {
        other.ensure_dim(self.dim())?;
        if !(0.0..=1.0).contains(&weight) {
            return Err(Error::InvalidWeight(f64::from(weight)));
        }

        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&u, &p)| (1.0 - weight) * u + weight * p)
            .collect();
        Self::new(data)
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = Error;

    fn try_from(data: Vec<f32>) -> Result<Self> {
        Self::new(data)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.data.into_vec()
    }
}
