use async_trait::async_trait;
use serde_json::Value;

use crate::domain::category::Category;
use crate::domain::entity::Entity;

pub mod category;
pub mod errors;
pub mod in_memory;
pub mod in_memory_searchable;
pub mod merge;
pub mod search;
#[cfg(feature = "db")]
pub mod sqlite;

pub use errors::{NotFoundError, RepositoryError, RepositoryResult};
pub use search::{SearchInput, SearchParams, SearchResult, SortDirection};

/// CRUD operations over one entity type.
///
/// Every operation is asynchronous so in-memory and storage-backed
/// implementations can be swapped behind the same contract.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Stores `entity`, replacing any entity with the same identity.
    async fn insert(&mut self, entity: E) -> RepositoryResult<E>;

    /// Inserts every entity in order with [`Repository::insert`] semantics.
    async fn bulk_insert(&mut self, entities: Vec<E>) -> RepositoryResult<Vec<E>>;

    /// Deep-merges `patch` (a JSON object keyed like the entity's serde
    /// representation) into the stored entity.
    async fn update(&mut self, entity_id: &E::Id, patch: Value) -> RepositoryResult<E>;

    /// Removes the entity and returns it.
    async fn delete(&mut self, entity_id: &E::Id) -> RepositoryResult<E>;

    /// Returns the entity, or `None` when it does not exist.
    async fn find(&self, entity_id: &E::Id) -> RepositoryResult<Option<E>>;

    /// Returns every live entity.
    async fn find_all(&self) -> RepositoryResult<Vec<E>>;

    /// Name of the entity type this repository stores.
    fn entity_name(&self) -> &'static str {
        E::NAME
    }
}

/// Repository extension supporting filter, sort and pagination in one call.
#[async_trait]
pub trait SearchableRepository<E: Entity, F = String>: Repository<E>
where
    F: Send + Sync + 'static,
{
    /// Field names that may be used as a sort key.
    fn sortable_fields(&self) -> &[&'static str];

    async fn search(&self, params: SearchParams<F>) -> RepositoryResult<SearchResult<E>>;
}

/// Storage contract for [`Category`] aggregates.
pub trait CategoryRepository: SearchableRepository<Category> {}

impl<T: SearchableRepository<Category>> CategoryRepository for T {}
