mod catalog_service;
mod label_resolver;

pub use catalog_service::CatalogService;
pub use label_resolver::{LabelMaps, Resolution};
