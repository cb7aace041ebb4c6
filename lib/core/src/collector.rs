//! Seams to the collaborators that fetch ranking input.
//!
//! Storage lookups happen behind these traits; ranking itself only ever
//! sees the plain values they return.

use crate::embedding::Embedding;
use crate::item::{Candidate, ItemId};
use crate::signals::{FastMap, SignalBundle};
use crate::subject::{Subject, SubjectId};
use crate::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Supplies the candidate set for a ranking call.
pub trait CandidateSource {
    /// Candidates as of `now`. Implementations may pre-filter to the
    /// active ones; ranking checks eligibility again regardless.
    fn candidates(&self, now: DateTime<Utc>) -> Result<Vec<Candidate>>;
}

/// Supplies the signal bundle of a known subject.
pub trait SignalSource {
    fn signals(&self, subject: &Subject) -> Result<SignalBundle>;
}

/// Looks up an item's embedding by id.
pub trait VectorStore {
    fn embedding(&self, item: &ItemId) -> Result<Option<Embedding>>;
}

impl CandidateSource for Vec<Candidate> {
    fn candidates(&self, _now: DateTime<Utc>) -> Result<Vec<Candidate>> {
        Ok(self.clone())
    }
}

impl<S: BuildHasher> VectorStore for HashMap<ItemId, Embedding, S> {
    fn embedding(&self, item: &ItemId) -> Result<Option<Embedding>> {
        Ok(self.get(item).cloned())
    }
}

/// Bundles held in memory, keyed by subject id.
#[derive(Debug, Clone, Default)]
pub struct InMemorySignals {
    bundles: FastMap<SubjectId, SignalBundle>,
}

impl InMemorySignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subject: impl Into<SubjectId>, bundle: SignalBundle) {
        self.bundles.insert(subject.into(), bundle);
    }
}

impl SignalSource for InMemorySignals {
    fn signals(&self, subject: &Subject) -> Result<SignalBundle> {
        Ok(subject
            .id
            .as_ref()
            .and_then(|id| self.bundles.get(id))
            .cloned()
            .unwrap_or_default())
    }
}

/// Embeddings kept as packed little-endian `f32` blobs and decoded on read.
///
/// Every stored blob must hold exactly `dim` values; a blob of another
/// width fails the lookup.
#[derive(Debug, Clone)]
pub struct BlobVectorStore {
    dim: usize,
    blobs: FastMap<ItemId, Bytes>,
}

impl BlobVectorStore {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            blobs: FastMap::default(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn insert(&mut self, item: impl Into<ItemId>, blob: impl Into<Bytes>) {
        self.blobs.insert(item.into(), blob.into());
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl VectorStore for BlobVectorStore {
    fn embedding(&self, item: &ItemId) -> Result<Option<Embedding>> {
        self.blobs
            .get(item)
            .map(|blob| Embedding::from_le_bytes(blob, self.dim))
            .transpose()
    }
}

/// Every stored item as a candidate carrying its decoded embedding, in id
/// order.
impl CandidateSource for BlobVectorStore {
    fn candidates(&self, _now: DateTime<Utc>) -> Result<Vec<Candidate>> {
        let mut candidates = self
            .blobs
            .iter()
            .map(|(id, blob)| -> Result<Candidate> {
                let embedding = Embedding::from_le_bytes(blob, self.dim)?;
                Ok(Candidate::new(id.clone()).with_embedding(embedding))
            })
            .collect::<Result<Vec<_>>>()?;
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(candidates)
    }
}

/// Everything one ranking call needs, gathered from the collaborators.
#[derive(Debug, Clone)]
pub struct RankingInput {
    pub subject: Subject,
    pub candidates: Vec<Candidate>,
    pub signals: SignalBundle,
    pub collected_at: DateTime<Utc>,
}

/// Gather a ranking input for `subject`.
///
/// Anonymous subjects get an empty bundle without consulting the signal
/// source.
pub fn collect<C, S>(
    subject: Subject,
    candidates: &C,
    signals: &S,
    now: DateTime<Utc>,
) -> Result<RankingInput>
where
    C: CandidateSource + ?Sized,
    S: SignalSource + ?Sized,
{
    let candidates = candidates.candidates(now)?;
    let signals = if subject.is_anonymous() {
        SignalBundle::default()
    } else {
        signals.signals(&subject)?
    };

    Ok(RankingInput {
        subject,
        candidates,
        signals,
        collected_at: now,
    })
}
