use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::templates::TemplateEngine;
use crate::features::notifications::handlers::{self, NotificationState};
use crate::features::notifications::services::NotificationService;

/// Confirmation callback, reachable from the email without credentials
pub fn public_routes(
    notifications: Arc<NotificationService>,
    templates: Arc<TemplateEngine>,
) -> Router {
    Router::new()
        .route("/confirmar_recepcion", get(handlers::confirmar_recepcion))
        .with_state(NotificationState {
            notifications,
            templates,
        })
}

/// Admin views over the email records plus the manual send endpoint
pub fn admin_routes(
    notifications: Arc<NotificationService>,
    templates: Arc<TemplateEngine>,
) -> Router {
    Router::new()
        .route("/api/enviar_correo", post(handlers::enviar_correo))
        .route("/dashboard_admin", get(handlers::dashboard_admin))
        .route(
            "/dashboard_admin/confirmados",
            get(handlers::dashboard_admin_confirmados),
        )
        .route(
            "/dashboard_admin/no_confirmados",
            get(handlers::dashboard_admin_no_confirmados),
        )
        .route(
            "/marcar_solucionado/{correo_id}",
            post(handlers::marcar_solucionado),
        )
        .with_state(NotificationState {
            notifications,
            templates,
        })
}
