//! Base contract shared by every aggregate stored in a repository.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::types::ValueObject;
use crate::domain::validation::{EntityValidationError, FieldRules, ensure_valid};

/// Identity plus a serializable snapshot.
///
/// The serde representation is what repositories merge partial updates into
/// and what the default sort lookup reads field values from. It must use the
/// same field names as [`Entity::to_json`] and the validation table.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Strongly-typed entity identifier.
    type Id: ValueObject;

    /// Type name used in diagnostics.
    const NAME: &'static str;

    /// Returns the entity identifier.
    fn entity_id(&self) -> &Self::Id;

    /// Stable JSON snapshot of the entity.
    fn to_json(&self) -> Value;

    /// Rules checked before a rebuilt entity is committed.
    fn validation_rules() -> &'static [FieldRules] {
        &[]
    }

    /// Checks the [`Entity::to_json`] snapshot against
    /// [`Entity::validation_rules`].
    fn validate(&self) -> Result<(), EntityValidationError> {
        ensure_valid(Self::validation_rules(), &self.to_json())
    }
}
