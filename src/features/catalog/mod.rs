//! Catalog lookups: categories, faults and sites.
//!
//! Categories and faults live in the catalog datastore, sites in their own
//! datastore. Reports reference all three by id only, so every read path
//! resolves names through [`services::LabelMaps`].
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/` | Category tiles with optional blurb |
//! | GET | `/formulario` | Report form scoped to a category |
//! | GET | `/obtener_fallas/{categoria_id}` | Fault options (JSON) |
//! | GET | `/api/categorias` | Category names, sorted (JSON) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CatalogService;
