//! Persistence ports for state management.

pub mod database;

pub use database::*;
