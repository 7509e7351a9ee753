use async_trait::async_trait;
use diesel::expression_methods::EscapeExpressionMethods;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde_json::Value;

use crate::db::DbPool;
use crate::domain::category::Category;
use crate::domain::entity::Entity;
use crate::domain::types::Uuid;
use crate::models::category::{Category as DbCategory, CategoryChanges};
use crate::repository::category::CATEGORY_SORTABLE_FIELDS;
use crate::repository::merge::merge_entity;
use crate::repository::{
    NotFoundError, Repository, RepositoryError, RepositoryResult, SearchParams, SearchResult,
    SearchableRepository, SortDirection,
};

/// [`crate::repository::CategoryRepository`] backed by Diesel and SQLite.
///
/// Diesel calls block, so every operation runs on tokio's blocking pool with
/// a connection taken from the shared `r2d2::Pool`.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselCategoryRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| RepositoryError::Task(e.to_string()))?
    }
}

fn load_category(conn: &mut SqliteConnection, key: &str) -> RepositoryResult<Option<Category>> {
    use crate::schema::categories;

    let category = categories::table
        .find(key)
        .first::<DbCategory>(conn)
        .optional()?;

    Ok(category.map(TryInto::try_into).transpose()?)
}

fn replace_category(conn: &mut SqliteConnection, category: &Category) -> RepositoryResult<usize> {
    use crate::schema::categories;

    let row = DbCategory::from(category);
    Ok(diesel::replace_into(categories::table)
        .values(&row)
        .execute(conn)?)
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped by `\`.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Row offset of the 1-based `page`, `None` when it does not fit an `i64`.
fn page_offset(page: usize, per_page: usize) -> Option<i64> {
    let offset = page.checked_sub(1)?.checked_mul(per_page)?;
    i64::try_from(offset).ok()
}

#[async_trait]
impl Repository<Category> for DieselCategoryRepository {
    async fn insert(&mut self, entity: Category) -> RepositoryResult<Category> {
        log::debug!("Inserting Category {}", entity.category_id());
        self.run(move |conn| {
            replace_category(conn, &entity)?;
            Ok(entity)
        })
        .await
    }

    async fn bulk_insert(&mut self, entities: Vec<Category>) -> RepositoryResult<Vec<Category>> {
        log::debug!("Bulk inserting {} Category entities", entities.len());
        self.run(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                for entity in &entities {
                    replace_category(conn, entity)?;
                }
                Ok(entities)
            })
        })
        .await
    }

    async fn update(&mut self, entity_id: &Uuid, patch: Value) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let key = entity_id.to_string();
        self.run(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                let Some(existing) = load_category(conn, &key)? else {
                    log::warn!("Update of missing Category {key}");
                    return Err(NotFoundError::new(key.clone(), Category::NAME).into());
                };

                let merged = merge_entity(&existing, patch)?;
                diesel::update(categories::table.find(&key))
                    .set(CategoryChanges::from(&merged))
                    .execute(conn)?;
                log::debug!("Updated Category {key}");
                Ok(merged)
            })
        })
        .await
    }

    async fn delete(&mut self, entity_id: &Uuid) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let key = entity_id.to_string();
        self.run(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|conn| {
                let Some(existing) = load_category(conn, &key)? else {
                    log::warn!("Delete of missing Category {key}");
                    return Err(NotFoundError::new(key.clone(), Category::NAME).into());
                };

                diesel::delete(categories::table.find(&key)).execute(conn)?;
                log::debug!("Deleted Category {key}");
                Ok(existing)
            })
        })
        .await
    }

    async fn find(&self, entity_id: &Uuid) -> RepositoryResult<Option<Category>> {
        let key = entity_id.to_string();
        self.run(move |conn| load_category(conn, &key)).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        self.run(|conn| {
            let items = categories::table
                .order((categories::created_at.asc(), categories::category_id.asc()))
                .load::<DbCategory>(conn)?
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<Category>, _>>()?;
            Ok(items)
        })
        .await
    }
}

#[async_trait]
impl SearchableRepository<Category> for DieselCategoryRepository {
    fn sortable_fields(&self) -> &[&'static str] {
        CATEGORY_SORTABLE_FIELDS
    }

    async fn search(&self, params: SearchParams) -> RepositoryResult<SearchResult<Category>> {
        use crate::schema::categories;

        let page = params.get_page();
        let per_page = params.get_per_page();
        let pattern = params.get_filter().map(|filter| contains_pattern(filter));
        let sort = params
            .get_sort()
            .filter(|field| CATEGORY_SORTABLE_FIELDS.contains(field))
            .map(str::to_string);
        let sort_dir = params.get_sort_dir().unwrap_or_default();

        let (total, items) = self
            .run(move |conn| {
                let query_builder = || {
                    let mut query = categories::table.into_boxed::<Sqlite>();
                    if let Some(pattern) = &pattern {
                        query = query.filter(categories::name.like(pattern.clone()).escape('\\'));
                    }
                    query
                };

                let total = query_builder().count().get_result::<i64>(conn)? as usize;

                // Pages past what SQLite can address are empty.
                let Some(offset) = page_offset(page, per_page) else {
                    return Ok((total, Vec::new()));
                };
                let limit = i64::try_from(per_page).unwrap_or(i64::MAX);

                let items = query_builder();
                let items = match (sort.as_deref(), sort_dir) {
                    (Some("name"), SortDirection::Asc) => items.order(categories::name.asc()),
                    (Some("name"), SortDirection::Desc) => items.order(categories::name.desc()),
                    (Some("createdAt"), SortDirection::Asc) => {
                        items.order(categories::created_at.asc())
                    }
                    _ => items.order(categories::created_at.desc()),
                };

                let items = items
                    .then_order_by(categories::category_id.asc())
                    .offset(offset)
                    .limit(limit)
                    .load::<DbCategory>(conn)?
                    .into_iter()
                    .map(TryInto::try_into)
                    .collect::<Result<Vec<Category>, _>>()?;

                Ok((total, items))
            })
            .await?;

        log::debug!(
            "Category search returned {} of {total} matches",
            items.len()
        );
        Ok(SearchResult::new(items, total, page, per_page))
    }
}
