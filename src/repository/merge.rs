//! Partial updates expressed as JSON patches.
//!
//! Arrays are replaced wholesale, never merged element by element.

use serde_json::Value;

use crate::domain::entity::Entity;
use crate::domain::validation::ensure_valid;
use crate::repository::errors::{RepositoryError, RepositoryResult};

/// Recursively merges `patch` into `target`.
///
/// Objects present on both sides merge key by key with the patch winning;
/// keys only in `target` survive. Any other patch value replaces the target
/// value outright.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                let nested = value.is_object() && target.get(&key).is_some_and(Value::is_object);
                match target.get_mut(&key) {
                    Some(existing) if nested => deep_merge(existing, value),
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Applies `patch` to `existing` and rebuilds the entity.
///
/// The merged document is checked against the entity's rule table before it
/// is deserialized, and the identity must not change.
pub fn merge_entity<E: Entity>(existing: &E, patch: Value) -> RepositoryResult<E> {
    let mut document = serde_json::to_value(existing)?;
    deep_merge(&mut document, patch);
    ensure_valid(E::validation_rules(), &document)?;

    let merged: E = serde_json::from_value(document)?;
    if merged.entity_id() != existing.entity_id() {
        return Err(RepositoryError::IdentityChange {
            entity: E::NAME,
            id: existing.entity_id().to_string(),
            attempted: merged.entity_id().to_string(),
        });
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_key_by_key() {
        let mut target = json!({
            "name": "a",
            "meta": {"color": "red", "size": {"w": 1, "h": 2}},
        });
        deep_merge(&mut target, json!({"meta": {"size": {"w": 5}, "tag": "x"}}));
        assert_eq!(
            target,
            json!({
                "name": "a",
                "meta": {"color": "red", "size": {"w": 5, "h": 2}, "tag": "x"},
            })
        );
    }

    #[test]
    fn scalars_and_arrays_replace() {
        let mut target = json!({"tags": [1, 2, 3], "meta": {"a": 1}, "n": 1});
        deep_merge(
            &mut target,
            json!({"tags": [9], "meta": "flat", "n": null, "new": true}),
        );
        assert_eq!(
            target,
            json!({"tags": [9], "meta": "flat", "n": null, "new": true})
        );
    }

    #[test]
    fn object_replaces_scalar() {
        let mut target = json!({"meta": 1});
        deep_merge(&mut target, json!({"meta": {"a": 1}}));
        assert_eq!(target, json!({"meta": {"a": 1}}));
    }
}
