//! Persistence adapters.

pub mod memory_db;

pub use memory_db::*;
