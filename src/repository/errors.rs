use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::domain::validation::EntityValidationError;

/// Raised when `update`/`delete` target an identity with no live entity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{entity} with id(s) {} not found", join_ids(.ids))]
pub struct NotFoundError {
    pub ids: Vec<String>,
    pub entity: &'static str,
}

impl NotFoundError {
    pub fn new<I: ToString>(id: I, entity: &'static str) -> Self {
        Self {
            ids: vec![id.to_string()],
            entity,
        }
    }

    pub fn many<I: ToString>(ids: &[I], entity: &'static str) -> Self {
        Self {
            ids: ids.iter().map(ToString::to_string).collect(),
            entity,
        }
    }
}

fn join_ids(ids: &[String]) -> String {
    ids.join(", ")
}

/// Errors returned by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Validation(#[from] EntityValidationError),
    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A partial update tried to rewrite the entity identity.
    #[error("{entity} {id} cannot change identity to {attempted}")]
    IdentityChange {
        entity: &'static str,
        id: String,
        attempted: String,
    },
    #[cfg(feature = "db")]
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[cfg(feature = "db")]
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[cfg(feature = "db")]
    #[error("blocking task failed: {0}")]
    Task(String),
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
