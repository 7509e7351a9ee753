//! Searchable in-memory repository: filter, then sort, then paginate.
//!
//! The three stages live on [`SearchPolicy`] so each can be overridden and
//! tested on its own. The engine itself only wires them together and owns
//! the storage.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::domain::entity::Entity;
use crate::repository::in_memory::{EntityMap, InMemoryRepository};
use crate::repository::search::{SearchParams, SearchResult, SortDirection};
use crate::repository::{Repository, RepositoryResult, SearchableRepository};

/// Reads the sort key of `entity` for the field `sort`.
pub type SortGetter<'a, E> = &'a dyn Fn(&E, &str) -> Value;

/// Entity-specific search behaviour plugged into
/// [`InMemorySearchableRepository`].
pub trait SearchPolicy<E: Entity>: Send + Sync {
    type Filter: Send + Sync + 'static;

    /// Fields eligible for sorting; any other field leaves the order as is.
    fn sortable_fields(&self) -> &[&'static str];

    /// Whether `entity` satisfies `filter`.
    fn matches(&self, entity: &E, filter: &Self::Filter) -> bool;

    /// Entities matching `filter`, in map order. Without a filter every
    /// entity is returned and [`SearchPolicy::matches`] never runs.
    fn apply_filter(&self, entities: &EntityMap<E>, filter: Option<&Self::Filter>) -> Vec<E> {
        let Some(filter) = filter else {
            return entities.to_vec();
        };
        entities
            .values()
            .filter(|entity| self.matches(entity, filter))
            .cloned()
            .collect()
    }

    fn apply_sort(
        &self,
        items: Vec<E>,
        sort: Option<&str>,
        sort_dir: Option<SortDirection>,
    ) -> Vec<E> {
        sort_by_field(items, sort, sort_dir, self.sortable_fields(), None)
    }

    fn apply_paginate(&self, items: Vec<E>, page: usize, per_page: usize) -> Vec<E> {
        paginate(items, page, per_page)
    }
}

/// Field value read from the entity's serde representation, `Null` when the
/// field does not exist.
pub fn field_value<E: Serialize>(entity: &E, field: &str) -> Value {
    match serde_json::to_value(entity) {
        Ok(Value::Object(mut map)) => map.remove(field).unwrap_or(Value::Null),
        Ok(_) => Value::Null,
        Err(e) => {
            log::error!("Failed to read sort field {field}: {e}");
            Value::Null
        }
    }
}

/// Total order over JSON values used for sort keys.
///
/// Values rank by kind first (`null < bool < number < string < array <
/// object`), then compare natively within a kind: numbers numerically,
/// strings lexicographically, `false < true`. Arrays and objects of the same
/// kind compare equal.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => number_key(a).total_cmp(&number_key(b)),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn number_key(number: &serde_json::Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}

/// Stable sort of `items` by `sort`.
///
/// A missing sort field, or one outside `sortable_fields`, returns `items`
/// untouched without reading a single key. Keys come from `getter` when
/// given, otherwise from [`field_value`]. Equal keys keep their input order
/// in both directions.
pub fn sort_by_field<E: Serialize>(
    items: Vec<E>,
    sort: Option<&str>,
    sort_dir: Option<SortDirection>,
    sortable_fields: &[&str],
    getter: Option<SortGetter<'_, E>>,
) -> Vec<E> {
    let Some(sort) = sort.filter(|field| sortable_fields.contains(field)) else {
        return items;
    };

    let mut keyed: Vec<(Value, E)> = items
        .into_iter()
        .map(|entity| {
            let key = match getter {
                Some(getter) => getter(&entity, sort),
                None => field_value(&entity, sort),
            };
            (key, entity)
        })
        .collect();

    match sort_dir.unwrap_or_default() {
        SortDirection::Asc => keyed.sort_by(|(a, _), (b, _)| compare_values(a, b)),
        SortDirection::Desc => keyed.sort_by(|(a, _), (b, _)| compare_values(b, a)),
    }

    keyed.into_iter().map(|(_, entity)| entity).collect()
}

/// Items of the 1-based `page`; pages past the end are empty.
pub fn paginate<E>(items: Vec<E>, page: usize, per_page: usize) -> Vec<E> {
    let start = page.saturating_sub(1).saturating_mul(per_page);
    items.into_iter().skip(start).take(per_page).collect()
}

/// In-memory repository with search support.
#[derive(Debug, Clone)]
pub struct InMemorySearchableRepository<E, S> {
    store: InMemoryRepository<E>,
    policy: S,
}

impl<E, S: Default> Default for InMemorySearchableRepository<E, S> {
    fn default() -> Self {
        Self {
            store: InMemoryRepository::default(),
            policy: S::default(),
        }
    }
}

impl<E: Entity, S: SearchPolicy<E>> InMemorySearchableRepository<E, S> {
    pub fn with_policy(policy: S) -> Self {
        Self {
            store: InMemoryRepository::default(),
            policy,
        }
    }

    pub fn policy(&self) -> &S {
        &self.policy
    }

    /// Live entities.
    pub fn entities(&self) -> &EntityMap<E> {
        self.store.entities()
    }

    /// Entities removed through [`Repository::delete`].
    pub fn deleted_entities(&self) -> &EntityMap<E> {
        self.store.deleted_entities()
    }
}

#[async_trait]
impl<E: Entity, S: SearchPolicy<E>> Repository<E> for InMemorySearchableRepository<E, S> {
    async fn insert(&mut self, entity: E) -> RepositoryResult<E> {
        self.store.insert(entity).await
    }

    async fn bulk_insert(&mut self, entities: Vec<E>) -> RepositoryResult<Vec<E>> {
        self.store.bulk_insert(entities).await
    }

    async fn update(&mut self, entity_id: &E::Id, patch: Value) -> RepositoryResult<E> {
        self.store.update(entity_id, patch).await
    }

    async fn delete(&mut self, entity_id: &E::Id) -> RepositoryResult<E> {
        self.store.delete(entity_id).await
    }

    async fn find(&self, entity_id: &E::Id) -> RepositoryResult<Option<E>> {
        self.store.find(entity_id).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<E>> {
        self.store.find_all().await
    }
}

#[async_trait]
impl<E: Entity, S: SearchPolicy<E>> SearchableRepository<E, S::Filter>
    for InMemorySearchableRepository<E, S>
{
    fn sortable_fields(&self) -> &[&'static str] {
        self.policy.sortable_fields()
    }

    async fn search(&self, params: SearchParams<S::Filter>) -> RepositoryResult<SearchResult<E>> {
        let filtered = self
            .policy
            .apply_filter(self.store.entities(), params.get_filter());
        let total = filtered.len();
        let sorted = self
            .policy
            .apply_sort(filtered, params.get_sort(), params.get_sort_dir());
        let items = self
            .policy
            .apply_paginate(sorted, params.get_page(), params.get_per_page());

        log::debug!(
            "Search over {} returned {} of {total} matches",
            E::NAME,
            items.len()
        );
        Ok(SearchResult::new(
            items,
            total,
            params.get_page(),
            params.get_per_page(),
        ))
    }
}
