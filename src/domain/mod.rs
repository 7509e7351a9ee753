pub mod category;
pub mod category_fake_builder;
pub mod entity;
pub mod random;
pub mod types;
pub mod validation;
