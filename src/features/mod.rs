pub mod catalog;
pub mod dashboard;
pub mod notifications;
pub mod reports;
