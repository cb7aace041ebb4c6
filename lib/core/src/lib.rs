//! # featrank core
//!
//! Plain data types shared by the featrank scorers:
//!
//! - [`Embedding`] - fixed-width dense vector with SIMD cosine similarity
//! - [`Candidate`] - an item offered for ranking, with priority and [`ValidityWindow`]
//! - [`Subject`] - the (possibly anonymous) user a ranking is for
//! - [`SignalBundle`] - wishlist, ratings, events and subject embedding
//! - [`collector`] - traits for the collaborators that fetch the above
//! - [`feedback`] - moving a subject vector toward items it responded to
//!
//! ## Example
//!
//! ```rust
//! use featrank_core::{Candidate, Embedding, EventKind, ItemId, SignalBundle};
//!
//! let bundle = SignalBundle::new()
//!     .with_membership([42u64])
//!     .with_rating(42u64, 4.5)
//!     .with_event(42u64, EventKind::Cart);
//!
//! let candidate = Candidate::new(42u64)
//!     .with_priority(10)
//!     .with_embedding(Embedding::new(vec![0.1, 0.2, 0.3]).unwrap());
//!
//! assert!(bundle.is_member(&candidate.id));
//! assert_eq!(bundle.rating(&ItemId::from(42u64)), Some(4.5));
//! ```

pub mod collector;
pub mod embedding;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod item;
pub mod signals;
pub mod subject;

/// Dot product and norm kernels
///
/// - AVX2/FMA and SSE on x86_64
/// - NEON on ARM64
/// - scalar fallback elsewhere
pub mod simd;

pub use collector::{
    collect, BlobVectorStore, CandidateSource, InMemorySignals, RankingInput, SignalSource,
    VectorStore,
};
pub use embedding::{Embedding, DEFAULT_EMBEDDING_DIM};
pub use error::{Error, Result};
pub use feedback::{update_from_feedback, DEFAULT_FEEDBACK_WEIGHT};
pub use filter::{ActiveAt, CandidateFilter};
pub use item::{Candidate, ItemId, ValidityWindow};
pub use signals::{EventKind, FastMap, FastSet, Membership, SignalBundle, MAX_RATING};
pub use subject::{Subject, SubjectId};
