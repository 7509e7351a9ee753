//! Strongly-typed value objects used by domain entities.
//!
//! Entities carry these wrappers instead of raw primitives so that identity
//! formats are enforced at the boundary. Value objects compare structurally:
//! two values are equal when they have the same type and the same contents.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// The string is not a hyphenated UUID.
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Immutable value with structural equality.
///
/// Values of different concrete types never compare equal because equality is
/// only defined within one type.
pub trait ValueObject: Clone + Debug + Display + Eq + Send + Sync + 'static {
    /// Compares against an optional value; a missing value is never equal.
    fn equals(&self, other: Option<&Self>) -> bool {
        other.is_some_and(|other| self == other)
    }
}

/// Canonical length of a hyphenated UUID string.
const HYPHENATED_LEN: usize = 36;

/// Identity value object wrapping a validated UUID string.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Uuid {
    id: String,
}

impl Uuid {
    /// Generates a fresh random (v4) identifier.
    pub fn generate() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Validates an existing identifier.
    ///
    /// Any version or variant is accepted as long as the string is in the
    /// hyphenated 8-4-4-4-12 form.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let id = value.into();
        if id.len() != HYPHENATED_LEN || uuid::Uuid::try_parse(&id).is_err() {
            return Err(TypeConstraintError::InvalidUuid(id));
        }
        Ok(Self { id })
    }

    /// Generates an identifier when none is supplied, validates otherwise.
    pub fn from_option<S: Into<String>>(value: Option<S>) -> Result<Self, TypeConstraintError> {
        match value {
            Some(value) => Self::new(value),
            None => Ok(Self::generate()),
        }
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.id
    }
}

impl Default for Uuid {
    fn default() -> Self {
        Self::generate()
    }
}

impl ValueObject for Uuid {}

impl Display for Uuid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl AsRef<str> for Uuid {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for Uuid {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Uuid {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Uuid> for String {
    fn from(value: Uuid) -> Self {
        value.id
    }
}

impl PartialEq<&str> for Uuid {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<Uuid> for &str {
    fn eq(&self, other: &Uuid) -> bool {
        *self == other.as_str()
    }
}
