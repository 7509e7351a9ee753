use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::entity::Entity;
use crate::domain::types::Uuid;
use crate::domain::validation::{EntityValidationError, FieldRules, Rule, ensure_valid};

/// Maximum number of characters in a name or description.
pub const CATEGORY_TEXT_MAX_LENGTH: u64 = 255;

/// Validation table for [`Category`], keyed by JSON field name.
pub const CATEGORY_RULES: &[FieldRules] = &[
    FieldRules {
        field: "name",
        rules: &[
            Rule::NotEmpty,
            Rule::IsString,
            Rule::MaxLength(CATEGORY_TEXT_MAX_LENGTH),
        ],
    },
    FieldRules {
        field: "description",
        rules: &[
            Rule::Optional,
            Rule::IsString,
            Rule::MaxLength(CATEGORY_TEXT_MAX_LENGTH),
        ],
    },
    FieldRules {
        field: "isActive",
        rules: &[Rule::IsBoolean],
    },
];

/// Catalog category aggregate.
///
/// Fields are private so that every change to a validated field goes through
/// [`Category::change_name`] or [`Category::change_description`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    category_id: Uuid,
    name: String,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

/// Raw state used to rehydrate a [`Category`] from trusted storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryProps {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Data required to create a new [`Category`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCreateCommand {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl Category {
    /// Rehydrates a category without validating it.
    ///
    /// Missing identity and timestamp are generated, `is_active` defaults to
    /// `true`.
    pub fn new(props: CategoryProps) -> Self {
        Self {
            category_id: props.category_id.unwrap_or_default(),
            name: props.name,
            description: props.description,
            is_active: props.is_active.unwrap_or(true),
            created_at: props.created_at.unwrap_or_else(now),
        }
    }

    /// Creates a validated category with a fresh identity and timestamp.
    pub fn create(command: CategoryCreateCommand) -> Result<Self, EntityValidationError> {
        let category = Self::new(CategoryProps {
            category_id: None,
            name: command.name,
            description: command.description,
            is_active: command.is_active,
            created_at: None,
        });
        category.validate()?;
        Ok(category)
    }

    /// Creates a category from an untyped command such as a request body.
    ///
    /// The rule table runs on the raw input first, so wrong JSON types are
    /// reported as field errors rather than deserialization failures.
    pub fn create_from_input(input: Value) -> Result<Self, EntityValidationError> {
        let mut projection = Map::new();
        for field in ["name", "description"] {
            if let Some(value) = input.get(field) {
                projection.insert(field.to_string(), value.clone());
            }
        }
        projection.insert(
            "isActive".to_string(),
            input.get("isActive").cloned().unwrap_or(Value::Bool(true)),
        );
        let projection = Value::Object(projection);
        ensure_valid(CATEGORY_RULES, &projection)?;

        Self::create(CategoryCreateCommand {
            name: projection["name"].as_str().unwrap_or_default().to_string(),
            description: projection
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            is_active: projection["isActive"].as_bool(),
        })
    }

    pub fn category_id(&self) -> &Uuid {
        &self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Renames the category. The current name is kept when validation fails.
    pub fn change_name<S: Into<String>>(&mut self, name: S) -> Result<(), EntityValidationError> {
        let mut candidate = self.clone();
        candidate.name = name.into();
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Replaces the description. The current value is kept when validation
    /// fails.
    pub fn change_description(
        &mut self,
        description: Option<String>,
    ) -> Result<(), EntityValidationError> {
        let mut candidate = self.clone();
        candidate.description = description;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

impl Entity for Category {
    type Id = Uuid;

    const NAME: &'static str = "Category";

    fn entity_id(&self) -> &Uuid {
        &self.category_id
    }

    fn to_json(&self) -> Value {
        json!({
            "categoryId": self.category_id.as_str(),
            "name": self.name,
            "description": self.description,
            "isActive": self.is_active,
            "createdAt": self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    fn validation_rules() -> &'static [FieldRules] {
        CATEGORY_RULES
    }
}

/// Current time at the millisecond precision used by storage.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_command() -> CategoryCreateCommand {
        CategoryCreateCommand {
            name: "Category Name".to_string(),
            description: Some("Category Description".to_string()),
            is_active: Some(true),
        }
    }

    fn name_messages(all: bool) -> Vec<&'static str> {
        let mut messages = vec![];
        if all {
            messages.push("name should not be empty");
        }
        messages.push("name must be a string");
        messages.push("name must be shorter than or equal to 255 characters");
        messages
    }

    #[test]
    fn create_sets_attributes() {
        let before = Utc::now();
        let category = Category::create(valid_command()).unwrap();

        assert_eq!(category.name(), "Category Name");
        assert_eq!(category.description(), Some("Category Description"));
        assert!(category.is_active());
        assert!(Uuid::new(category.category_id().as_str()).is_ok());
        assert_eq!(category.entity_id(), category.category_id());
        let drift = category.created_at() - before;
        assert!(drift.num_seconds().abs() < 5);
        assert_eq!(category.created_at().timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn create_applies_defaults() {
        let category = Category::create(CategoryCreateCommand {
            name: "Movie".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(category.is_active());
        assert_eq!(category.description(), None);
    }

    #[test]
    fn to_json_is_stable() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let id = Uuid::new("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap();
        let category = Category::new(CategoryProps {
            category_id: Some(id.clone()),
            name: "Category Name".to_string(),
            description: Some("Category Description".to_string()),
            is_active: Some(true),
            created_at: Some(created_at),
        });

        assert_eq!(
            category.to_json(),
            json!({
                "categoryId": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
                "name": "Category Name",
                "description": "Category Description",
                "isActive": true,
                "createdAt": "2024-03-01T12:30:00.000Z",
            })
        );
        assert_eq!(category.to_json()["categoryId"], id.as_str());
    }

    #[test]
    fn rehydration_skips_validation() {
        let category = Category::new(CategoryProps {
            name: String::new(),
            ..Default::default()
        });
        assert_eq!(category.name(), "");
        assert!(category.is_active());
        assert!(category.validate().is_err());
    }

    #[test]
    fn create_rejects_empty_name() {
        let err = Category::create(CategoryCreateCommand {
            name: String::new(),
            ..valid_command()
        })
        .unwrap_err();
        assert_eq!(err.messages("name"), ["name should not be empty"]);
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn create_rejects_long_name() {
        let err = Category::create(CategoryCreateCommand {
            name: "a".repeat(256),
            ..valid_command()
        })
        .unwrap_err();
        assert_eq!(
            err.messages("name"),
            ["name must be shorter than or equal to 255 characters"]
        );
    }

    #[test]
    fn create_rejects_long_description() {
        let err = Category::create(CategoryCreateCommand {
            description: Some("a".repeat(256)),
            ..valid_command()
        })
        .unwrap_err();
        assert_eq!(
            err.messages("description"),
            ["description must be shorter than or equal to 255 characters"]
        );
    }

    #[test]
    fn untyped_input_reports_missing_and_null_names() {
        for input in [
            json!({"description": "d"}),
            json!({"name": null, "description": "d"}),
        ] {
            let err = Category::create_from_input(input).unwrap_err();
            assert_eq!(err.messages("name"), name_messages(true).as_slice());
        }
    }

    #[test]
    fn untyped_input_reports_numeric_name() {
        let err = Category::create_from_input(json!({"name": 123})).unwrap_err();
        assert_eq!(err.messages("name"), name_messages(false).as_slice());
    }

    #[test]
    fn untyped_input_reports_wrong_types() {
        let err = Category::create_from_input(json!({
            "name": "ok",
            "description": 5,
            "isActive": null,
        }))
        .unwrap_err();
        assert_eq!(
            err.messages("description"),
            [
                "description must be a string",
                "description must be shorter than or equal to 255 characters",
            ]
        );
        assert_eq!(err.messages("isActive"), ["isActive must be a boolean value"]);
        assert!(err.messages("name").is_empty());
    }

    #[test]
    fn untyped_input_creates_category() {
        let category = Category::create_from_input(json!({"name": "Books"})).unwrap();
        assert_eq!(category.name(), "Books");
        assert_eq!(category.description(), None);
        assert!(category.is_active());

        let category =
            Category::create_from_input(json!({"name": "Books", "isActive": false})).unwrap();
        assert!(!category.is_active());
    }

    #[test]
    fn change_name_validates_before_commit() {
        let mut category = Category::create(valid_command()).unwrap();
        category.change_name("New Category Name").unwrap();
        assert_eq!(category.name(), "New Category Name");

        let err = category.change_name("").unwrap_err();
        assert_eq!(err.messages("name"), ["name should not be empty"]);
        assert_eq!(category.name(), "New Category Name");

        assert!(category.change_name("a".repeat(256)).is_err());
        assert_eq!(category.name(), "New Category Name");
    }

    #[test]
    fn change_description_validates_before_commit() {
        let mut category = Category::create(valid_command()).unwrap();
        category
            .change_description(Some("New Category Description".to_string()))
            .unwrap();
        assert_eq!(category.description(), Some("New Category Description"));

        assert!(category.change_description(Some("a".repeat(256))).is_err());
        assert_eq!(category.description(), Some("New Category Description"));

        category.change_description(None).unwrap();
        assert_eq!(category.description(), None);
    }

    #[test]
    fn activate_and_deactivate_flip_flag() {
        let mut category = Category::new(CategoryProps {
            name: String::new(),
            is_active: Some(true),
            ..Default::default()
        });
        category.deactivate();
        assert!(!category.is_active());
        category.activate();
        assert!(category.is_active());
        // Flag flips never validate, so the invalid name is untouched.
        assert_eq!(category.name(), "");
    }

    #[test]
    fn serde_round_trip_keeps_identity() {
        let category = Category::create(valid_command()).unwrap();
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["categoryId"], category.category_id().as_str());
        let restored: Category = serde_json::from_value(value).unwrap();
        assert_eq!(restored, category);
    }
}
