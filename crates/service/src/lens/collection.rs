//! Single-record operations over an in-memory collection.
//!
//! These are pure: callers load the collection, apply one of these, and
//! persist the result themselves.

use serde_json::Value;

use super::domain::{lens_id, Lens, ID_FIELD};
use crate::errors::ServiceError;

/// First record whose `id` equals `id`.
pub fn find_by_id<'a>(lenses: &'a [Lens], id: &str) -> Option<&'a Lens> {
    lenses.iter().find(|l| lens_id(l) == Some(id))
}

/// Stamp `lens` with `id` (replacing any client value) and append it.
pub fn insert(lenses: &mut Vec<Lens>, mut lens: Lens, id: String) -> Lens {
    lens.insert(ID_FIELD.to_string(), Value::String(id));
    lenses.push(lens.clone());
    lens
}

/// Shallow-merge `partial` over the record matching `id`.
///
/// Returns `Ok(None)` when no record matches, whatever `partial` holds.
/// Otherwise `partial` may repeat the record's own id but may not change it.
/// The collection is untouched unless the merge succeeds.
pub fn update(lenses: &mut [Lens], id: &str, mut partial: Lens) -> Result<Option<Lens>, ServiceError> {
    let Some(existing) = lenses.iter_mut().find(|l| lens_id(l) == Some(id)) else {
        return Ok(None);
    };
    match partial.remove(ID_FIELD) {
        None => {}
        Some(Value::String(ref given)) if given == id => {}
        Some(_) => return Err(ServiceError::Validation("lens id cannot be changed".into())),
    }
    for (key, value) in partial {
        existing.insert(key, value);
    }
    Ok(Some(existing.clone()))
}

/// Remove the record matching `id`, returning it.
pub fn delete(lenses: &mut Vec<Lens>, id: &str) -> Option<Lens> {
    let idx = lenses.iter().position(|l| lens_id(l) == Some(id))?;
    Some(lenses.remove(idx))
}
