use serde_json::{Value, json};

use crate::domain::category::Category;
use crate::repository::in_memory_searchable::{
    InMemorySearchableRepository, SearchPolicy, SortGetter, field_value, sort_by_field,
};
use crate::repository::search::SortDirection;

/// Fields a category search may sort by.
pub const CATEGORY_SORTABLE_FIELDS: &[&str] = &["createdAt", "name"];

/// Search behaviour for categories kept in memory.
///
/// Without an explicit sort field the newest categories come first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategorySearch;

impl SearchPolicy<Category> for CategorySearch {
    type Filter = String;

    fn sortable_fields(&self) -> &[&'static str] {
        CATEGORY_SORTABLE_FIELDS
    }

    fn matches(&self, category: &Category, filter: &String) -> bool {
        category.name().to_lowercase().contains(&filter.to_lowercase())
    }

    fn apply_sort(
        &self,
        items: Vec<Category>,
        sort: Option<&str>,
        sort_dir: Option<SortDirection>,
    ) -> Vec<Category> {
        let (sort, sort_dir) = match sort {
            Some(sort) => (sort, sort_dir),
            None => ("createdAt", Some(SortDirection::Desc)),
        };
        let getter: SortGetter<'_, Category> = &category_sort_key;
        sort_by_field(items, Some(sort), sort_dir, CATEGORY_SORTABLE_FIELDS, Some(getter))
    }
}

/// `createdAt` sorts on epoch milliseconds rather than its string form.
fn category_sort_key(category: &Category, field: &str) -> Value {
    match field {
        "createdAt" => json!(category.created_at().timestamp_millis()),
        _ => field_value(category, field),
    }
}

/// In-memory [`crate::repository::CategoryRepository`].
pub type CategoryInMemoryRepository = InMemorySearchableRepository<Category, CategorySearch>;
