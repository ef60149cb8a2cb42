//! Shared types and models for the Auto Parts Distribution Platform
//!
//! This crate contains domain types shared between the backend and any
//! other components of the system (fixtures, tooling, tests).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
