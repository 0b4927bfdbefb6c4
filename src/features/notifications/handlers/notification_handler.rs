use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::core::templates::TemplateEngine;
use crate::features::notifications::dtos::{
    ConfirmQuery, EmailRecordView, SendEmailRequestDto, SentEmailDto,
};
use crate::features::notifications::models::EmailFilter;
use crate::features::notifications::services::NotificationService;
use crate::shared::types::ApiResponse;

const MISSING_CONFIRMATION_ID: &str = "Faltan datos para confirmar.";

#[derive(Clone)]
pub struct NotificationState {
    pub notifications: Arc<NotificationService>,
    pub templates: Arc<TemplateEngine>,
}

/// Send the notification email for a stored report
#[utoipa::path(
    post,
    path = "/api/enviar_correo",
    request_body = SendEmailRequestDto,
    responses(
        (status = 200, description = "Email sent", body = ApiResponse<SentEmailDto>),
        (status = 400, description = "Invalid JSON body"),
        (status = 500, description = "Delivery failed")
    ),
    tag = "notifications"
)]
pub async fn enviar_correo(
    State(state): State<NotificationState>,
    AppJson(dto): AppJson<SendEmailRequestDto>,
) -> Result<Json<ApiResponse<SentEmailDto>>> {
    let correo_id = state.notifications.notify_report(dto).await?;

    Ok(Json(ApiResponse::success(
        Some(SentEmailDto { correo_id }),
        Some("Correo enviado correctamente".to_string()),
    )))
}

/// Confirmation link embedded in the notification email.
///
/// Unauthenticated and idempotent. An unknown id still gets the success page.
#[utoipa::path(
    get,
    path = "/confirmar_recepcion",
    params(ConfirmQuery),
    responses(
        (status = 200, description = "Confirmation page (HTML)"),
        (status = 400, description = "Missing or malformed correo_id")
    ),
    tag = "notifications"
)]
pub async fn confirmar_recepcion(
    State(state): State<NotificationState>,
    Query(query): Query<ConfirmQuery>,
) -> Response {
    let Some(correo_id) = query.id() else {
        return (StatusCode::BAD_REQUEST, MISSING_CONFIRMATION_ID).into_response();
    };

    if let Err(e) = state.notifications.confirm_receipt(correo_id).await {
        return e.into_response();
    }

    match state
        .templates
        .render("paginas/confirmacion.html", json!({ "correo_id": correo_id }))
    {
        Ok(body) => Html(body).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Set the resolution flag of an email record
#[utoipa::path(
    post,
    path = "/marcar_solucionado/{correo_id}",
    params(
        ("correo_id" = i32, Path, description = "Email record id")
    ),
    responses(
        (status = 200, description = "Marked as resolved"),
        (status = 404, description = "Email record not found")
    ),
    tag = "notifications"
)]
pub async fn marcar_solucionado(
    State(state): State<NotificationState>,
    Path(correo_id): Path<i32>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.notifications.mark_resolved(correo_id).await? {
        return Err(AppError::NotFound(format!(
            "Correo {} no encontrado",
            correo_id
        )));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Reporte marcado como solucionado".to_string()),
    )))
}

/// Every email record
pub async fn dashboard_admin(state: State<NotificationState>, jar: CookieJar) -> Response {
    render_emails(state, jar, EmailFilter::All).await
}

/// Email records whose receipt was confirmed
pub async fn dashboard_admin_confirmados(
    state: State<NotificationState>,
    jar: CookieJar,
) -> Response {
    render_emails(state, jar, EmailFilter::Confirmed).await
}

/// Email records still waiting for confirmation
pub async fn dashboard_admin_no_confirmados(
    state: State<NotificationState>,
    jar: CookieJar,
) -> Response {
    render_emails(state, jar, EmailFilter::Unconfirmed).await
}

async fn render_emails(
    State(state): State<NotificationState>,
    jar: CookieJar,
    filter: EmailFilter,
) -> Response {
    let (correos, error) = match state.notifications.list(filter).await {
        Ok(emails) => (
            emails
                .into_iter()
                .map(EmailRecordView::from)
                .collect::<Vec<_>>(),
            None,
        ),
        Err(e) => (Vec::new(), Some(e.user_message())),
    };

    state.templates.render_page(
        jar,
        "paginas/dashboard_admin.html",
        json!({
            "vista": "correos",
            "filtro": filter,
            "correos": correos,
            "error": error,
        }),
    )
}
