use std::sync::Arc;

use axum::{routing::get, Router};

use crate::core::templates::TemplateEngine;
use crate::features::catalog::handlers::{self, CatalogState};
use crate::features::catalog::services::CatalogService;

/// Create routes for the catalog feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(catalog: Arc<CatalogService>, templates: Arc<TemplateEngine>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/formulario", get(handlers::formulario))
        .route(
            "/obtener_fallas/{categoria_id}",
            get(handlers::obtener_fallas),
        )
        .route("/api/categorias", get(handlers::api_categorias))
        .with_state(CatalogState { catalog, templates })
}
