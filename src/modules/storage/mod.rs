//! Storage module for uploaded report photos
//!
//! Photos live on local disk under the static directory and are served
//! as static files under `/static`.

mod photo_store;

pub use photo_store::{PhotoStore, PhotoUpload};
