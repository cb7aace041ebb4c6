//! Feedback updates of a subject embedding.
//!
//! When a subject responds to a recommended item, its vector is moved a
//! step toward the item's vector. Nothing happens unless both vectors are
//! known.

use crate::collector::VectorStore;
use crate::embedding::Embedding;
use crate::item::ItemId;
use crate::Result;

/// Step size used when the caller has no better value.
pub const DEFAULT_FEEDBACK_WEIGHT: f32 = 0.1;

/// The subject vector after feedback on `item`.
///
/// Returns `Ok(None)` when the subject has no vector or the store has none
/// for `item`; the caller then keeps what it has.
pub fn update_from_feedback<V>(
    subject_vector: Option<&Embedding>,
    item: &ItemId,
    store: &V,
    weight: f32,
) -> Result<Option<Embedding>>
where
    V: VectorStore + ?Sized,
{
    let Some(subject) = subject_vector else {
        return Ok(None);
    };
    let Some(item_vector) = store.embedding(item)? else {
        return Ok(None);
    };

    subject.blend_toward(&item_vector, weight).map(Some)
}
