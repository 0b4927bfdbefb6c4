use std::sync::Arc;

use axum::{routing::get, Router};

use crate::core::templates::TemplateEngine;
use crate::features::dashboard::handlers::{self, DashboardState};
use crate::features::dashboard::services::DashboardService;

/// JSON aggregations used by the dashboard charts
pub fn public_routes(dashboard: Arc<DashboardService>, templates: Arc<TemplateEngine>) -> Router {
    Router::new()
        .route(
            "/api/fallas_por_sede_categoria",
            get(handlers::fallas_por_sede_categoria),
        )
        .route(
            "/api/categoria/{categoria_id}/total",
            get(handlers::categoria_total),
        )
        .route("/api/categorias/totales", get(handlers::categorias_totales))
        .route("/api/fallas_por_categoria", get(handlers::fallas_por_categoria))
        .with_state(DashboardState {
            dashboard,
            templates,
        })
}

/// Category totals page
pub fn admin_routes(dashboard: Arc<DashboardService>, templates: Arc<TemplateEngine>) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .with_state(DashboardState {
            dashboard,
            templates,
        })
}
