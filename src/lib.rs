//! Core library exports for the catalog domain.
//!
//! This crate exposes the category aggregate, its validation and test data
//! builders, and the repositories that store it: in memory, or in SQLite
//! through Diesel when the `db` feature is enabled.

#[cfg(feature = "db")]
pub mod config;
#[cfg(feature = "db")]
pub mod db;
pub mod domain;
#[cfg(feature = "db")]
pub mod models;
pub mod repository;
#[cfg(feature = "db")]
pub mod schema;
