//! Report statistics: category totals and the site x category matrix.
//!
//! Counts are grouped by id in the reports store and labelled afterwards
//! with names from the catalog and sites stores.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::DashboardService;
