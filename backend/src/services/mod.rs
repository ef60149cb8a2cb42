//! Business logic services for the Auto Parts Distribution Platform

pub mod catalog;
pub mod orders;
pub mod pricing;
pub mod quotes;
pub mod stock_limit;
pub mod transfers;
