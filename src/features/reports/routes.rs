use axum::{routing::get, routing::post, Router};

use crate::features::reports::handlers::{self, ReportState};

/// Citizen-facing report pages
pub fn public_routes(state: ReportState) -> Router {
    Router::new()
        .route("/reportes", get(handlers::reportes))
        .route("/enviar_reporte", post(handlers::enviar_reporte))
        .route(
            "/editar_reporte/{id}",
            get(handlers::editar_reporte_form).post(handlers::editar_reporte),
        )
        .route("/borrar_reporte/{id}", post(handlers::borrar_reporte))
        .with_state(state)
}

/// Admin listing of every report
pub fn admin_routes(state: ReportState) -> Router {
    Router::new()
        .route(
            "/dashboard_admin/reportes",
            get(handlers::dashboard_admin_reportes),
        )
        .with_state(state)
}
