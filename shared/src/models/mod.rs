//! Domain models for the Auto Parts Distribution Platform

mod order;
mod pricing;
mod product;
mod quote;
mod transfer;

pub use order::*;
pub use pricing::*;
pub use product::*;
pub use quote::*;
pub use transfer::*;
