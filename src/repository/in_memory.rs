//! Keyed in-memory storage implementing [`Repository`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entity::Entity;
use crate::repository::errors::{NotFoundError, RepositoryResult};
use crate::repository::merge::merge_entity;
use crate::repository::Repository;

/// Entities keyed by the string form of their identity, iterated in first
/// insertion order.
#[derive(Debug, Clone)]
pub struct EntityMap<E> {
    entries: HashMap<String, E>,
    order: Vec<String>,
}

impl<E> Default for EntityMap<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<E> EntityMap<E> {
    /// Inserts or overwrites; an overwritten key keeps its position.
    pub fn insert(&mut self, key: String, entity: E) -> Option<E> {
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, entity)
    }

    pub fn get(&self, key: &str) -> Option<&E> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<E> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Entities in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: Clone> EntityMap<E> {
    /// Owned snapshot of every entity in insertion order.
    pub fn to_vec(&self) -> Vec<E> {
        self.values().cloned().collect()
    }
}

/// Non-searchable in-memory repository.
///
/// Deleted entities move to a separate audit map that is not part of the
/// repository contract.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<E> {
    entities: EntityMap<E>,
    deleted: EntityMap<E>,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            entities: EntityMap::default(),
            deleted: EntityMap::default(),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entities.
    pub fn entities(&self) -> &EntityMap<E> {
        &self.entities
    }

    /// Entities removed through [`Repository::delete`].
    pub fn deleted_entities(&self) -> &EntityMap<E> {
        &self.deleted
    }

    fn store(&mut self, entity: E) -> E {
        let key = entity.entity_id().to_string();
        self.entities.insert(key, entity.clone());
        entity
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn insert(&mut self, entity: E) -> RepositoryResult<E> {
        log::debug!("Inserting {} {}", E::NAME, entity.entity_id());
        Ok(self.store(entity))
    }

    async fn bulk_insert(&mut self, entities: Vec<E>) -> RepositoryResult<Vec<E>> {
        log::debug!("Bulk inserting {} {} entities", entities.len(), E::NAME);
        Ok(entities
            .into_iter()
            .map(|entity| self.store(entity))
            .collect())
    }

    async fn update(&mut self, entity_id: &E::Id, patch: Value) -> RepositoryResult<E> {
        let key = entity_id.to_string();
        let Some(existing) = self.entities.get(&key) else {
            log::warn!("Update of missing {} {key}", E::NAME);
            return Err(NotFoundError::new(key, E::NAME).into());
        };

        let merged = merge_entity(existing, patch)?;
        self.entities.insert(key, merged.clone());
        log::debug!("Updated {} {entity_id}", E::NAME);
        Ok(merged)
    }

    async fn delete(&mut self, entity_id: &E::Id) -> RepositoryResult<E> {
        let key = entity_id.to_string();
        let Some(entity) = self.entities.remove(&key) else {
            log::warn!("Delete of missing {} {key}", E::NAME);
            return Err(NotFoundError::new(key, E::NAME).into());
        };

        self.deleted.insert(key, entity.clone());
        log::debug!("Deleted {} {entity_id}", E::NAME);
        Ok(entity)
    }

    async fn find(&self, entity_id: &E::Id) -> RepositoryResult<Option<E>> {
        Ok(self.entities.get(&entity_id.to_string()).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<E>> {
        Ok(self.entities.to_vec())
    }
}
