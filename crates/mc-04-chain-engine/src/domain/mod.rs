//! # Domain Layer for the Chain Engine
//!
//! ## Modules
//!
//! - `engine`: block application and the shared per-transaction dispatch
//! - `filter`: the order-preserving candidate filter

pub mod engine;
pub mod filter;

pub use engine::*;
