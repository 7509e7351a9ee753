use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::{Category as DomainCategory, CategoryProps};
use crate::domain::types::{TypeConstraintError, Uuid};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable, Insertable)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(primary_key(category_id))]
pub struct Category {
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Mutable columns written back after a partial update.
///
/// A `None` description clears the column.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(treat_none_as_null = true)]
pub struct CategoryChanges {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(DomainCategory::new(CategoryProps {
            category_id: Some(Uuid::new(category.category_id)?),
            name: category.name,
            description: category.description,
            is_active: Some(category.is_active),
            created_at: Some(category.created_at.and_utc()),
        }))
    }
}

impl From<&DomainCategory> for Category {
    fn from(category: &DomainCategory) -> Self {
        Self {
            category_id: category.category_id().to_string(),
            name: category.name().to_string(),
            description: category.description().map(str::to_string),
            is_active: category.is_active(),
            created_at: category.created_at().naive_utc(),
        }
    }
}

impl From<&DomainCategory> for CategoryChanges {
    fn from(category: &DomainCategory) -> Self {
        Self {
            name: category.name().to_string(),
            description: category.description().map(str::to_string),
            is_active: category.is_active(),
            created_at: category.created_at().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::CategoryCreateCommand;

    #[test]
    fn row_round_trips_domain_category() {
        let category = DomainCategory::create(CategoryCreateCommand {
            name: "Movies".to_string(),
            description: Some("Films".to_string()),
            is_active: Some(false),
        })
        .unwrap();

        let row = Category::from(&category);
        assert_eq!(row.category_id, category.category_id().as_str());
        assert_eq!(row.created_at, category.created_at().naive_utc());

        let restored = DomainCategory::try_from(row).unwrap();
        assert_eq!(restored, category);
    }

    #[test]
    fn malformed_identity_is_rejected() {
        let row = Category {
            category_id: "not-a-uuid".to_string(),
            name: "Movies".to_string(),
            description: None,
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        };
        assert_eq!(
            DomainCategory::try_from(row).unwrap_err(),
            TypeConstraintError::InvalidUuid("not-a-uuid".to_string())
        );
    }
}
