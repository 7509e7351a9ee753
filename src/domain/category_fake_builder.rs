//! Test-data factory for [`Category`].
//!
//! ```ignore
//! let categories = CategoryFakeBuilder::the_categories(2)
//!     .with_name_factory(|i| format!("name test {i}"))
//!     .build()?;
//! ```

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::category::{Category, CategoryProps};
use crate::domain::entity::Entity;
use crate::domain::random::{RandRandom, Random};
use crate::domain::types::Uuid;
use crate::domain::validation::EntityValidationError;

type Factory<T> = Box<dyn Fn(usize, &mut dyn Random) -> T>;

/// How a builder field obtains its value for the instance at a given index.
pub enum Prop<T> {
    /// Not configured; only allowed for optional-by-design fields.
    Unset,
    /// The same value for every instance.
    Fixed(T),
    /// Computed per instance from its zero-based index.
    Factory(Factory<T>),
}

impl<T: Clone> Prop<T> {
    fn resolve(&self, index: usize, random: &mut dyn Random) -> Option<T> {
        match self {
            Prop::Unset => None,
            Prop::Fixed(value) => Some(value.clone()),
            Prop::Factory(factory) => Some(factory(index, random)),
        }
    }

    fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(usize) -> T + 'static,
    {
        Prop::Factory(Box::new(move |index: usize, _: &mut dyn Random| factory(index)))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FakeBuilderError {
    #[error("property {0} has no factory, use the `with_*` methods")]
    NotConfigured(&'static str),
}

/// Fluent builder for one category (`T = Category`) or many
/// (`T = Vec<Category>`).
pub struct CategoryFakeBuilder<T = Category> {
    count: usize,
    random: Box<dyn Random>,
    category_id: Prop<Uuid>,
    name: Prop<String>,
    description: Prop<Option<String>>,
    is_active: Prop<bool>,
    created_at: Prop<DateTime<Utc>>,
    output: PhantomData<T>,
}

impl CategoryFakeBuilder<Category> {
    pub fn a_category() -> Self {
        Self::with_count(1)
    }

    /// Builds and validates the category.
    pub fn build(&mut self) -> Result<Category, EntityValidationError> {
        self.build_at(0)
    }
}

impl CategoryFakeBuilder<Vec<Category>> {
    pub fn the_categories(count: usize) -> Self {
        Self::with_count(count)
    }

    /// Builds and validates every category, index by index.
    pub fn build(&mut self) -> Result<Vec<Category>, EntityValidationError> {
        (0..self.count).map(|index| self.build_at(index)).collect()
    }
}

impl<T> CategoryFakeBuilder<T> {
    fn with_count(count: usize) -> Self {
        Self {
            count,
            random: Box::new(RandRandom::new()),
            category_id: Prop::Unset,
            name: Prop::Factory(Box::new(|_, random: &mut dyn Random| random.chars(None))),
            description: Prop::Factory(Box::new(|_, random: &mut dyn Random| {
                Some(random.paragraphs(Some(1)))
            })),
            is_active: Prop::Fixed(true),
            created_at: Prop::Unset,
            output: PhantomData,
        }
    }

    /// Replaces the random text source.
    pub fn with_random<R: Random + 'static>(mut self, random: R) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn with_category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Prop::Fixed(category_id);
        self
    }

    pub fn with_category_id_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> Uuid + 'static,
    {
        self.category_id = Prop::from_fn(factory);
        self
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Prop::Fixed(name.into());
        self
    }

    pub fn with_name_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> String + 'static,
    {
        self.name = Prop::from_fn(factory);
        self
    }

    /// Uses `value`, or 256 random characters when `None`.
    pub fn with_invalid_name_too_long(mut self, value: Option<String>) -> Self {
        let name = value.unwrap_or_else(|| self.random.chars(Some(256)));
        self.name = Prop::Fixed(name);
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Prop::Fixed(description);
        self
    }

    pub fn with_description_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> Option<String> + 'static,
    {
        self.description = Prop::from_fn(factory);
        self
    }

    pub fn activate(mut self) -> Self {
        self.is_active = Prop::Fixed(true);
        self
    }

    pub fn deactivate(mut self) -> Self {
        self.is_active = Prop::Fixed(false);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Prop::Fixed(created_at);
        self
    }

    pub fn with_created_at_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> DateTime<Utc> + 'static,
    {
        self.created_at = Prop::from_fn(factory);
        self
    }

    /// Current identity value; fails when no identity was configured.
    pub fn category_id(&mut self) -> Result<Uuid, FakeBuilderError> {
        self.category_id
            .resolve(0, self.random.as_mut())
            .ok_or(FakeBuilderError::NotConfigured("categoryId"))
    }

    pub fn name(&mut self) -> Result<String, FakeBuilderError> {
        self.name
            .resolve(0, self.random.as_mut())
            .ok_or(FakeBuilderError::NotConfigured("name"))
    }

    /// `Ok(None)` means configured without a description.
    pub fn description(&mut self) -> Result<Option<String>, FakeBuilderError> {
        self.description
            .resolve(0, self.random.as_mut())
            .ok_or(FakeBuilderError::NotConfigured("description"))
    }

    pub fn is_active(&mut self) -> Result<bool, FakeBuilderError> {
        self.is_active
            .resolve(0, self.random.as_mut())
            .ok_or(FakeBuilderError::NotConfigured("isActive"))
    }

    /// Current timestamp value; fails when no timestamp was configured.
    pub fn created_at(&mut self) -> Result<DateTime<Utc>, FakeBuilderError> {
        self.created_at
            .resolve(0, self.random.as_mut())
            .ok_or(FakeBuilderError::NotConfigured("createdAt"))
    }

    fn build_at(&mut self, index: usize) -> Result<Category, EntityValidationError> {
        let random = self.random.as_mut();
        let category = Category::new(CategoryProps {
            category_id: self.category_id.resolve(index, random),
            name: self.name.resolve(index, random).unwrap_or_default(),
            description: self.description.resolve(index, random).flatten(),
            is_active: self.is_active.resolve(index, random),
            created_at: self.created_at.resolve(index, random),
        });
        category.validate()?;
        Ok(category)
    }
}
