//! HTTP handlers for the Auto Parts Distribution Platform

pub mod catalog;
pub mod health;
pub mod orders;
pub mod pricing;
pub mod quotes;
pub mod stock_limit;
pub mod transfers;

pub use catalog::*;
pub use health::*;
pub use orders::*;
pub use pricing::*;
pub use quotes::*;
pub use stock_limit::*;
pub use transfers::*;
