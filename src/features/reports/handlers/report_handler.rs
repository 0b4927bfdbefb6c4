use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::core::error::or_degraded;
use crate::core::flash::{redirect_with_flash, Flash, FlashLevel};
use crate::core::templates::TemplateEngine;
use crate::features::catalog::services::CatalogService;
use crate::features::notifications::dtos::SendEmailRequestDto;
use crate::features::notifications::NotificationService;
use crate::features::reports::dtos::{
    CedulaQuery, EditReportFormDto, MultipartForm, ReportFormDto, ResolvedReportView,
};
use crate::features::reports::models::{CreateReport, Report};
use crate::features::reports::services::ReportService;
use crate::modules::storage::PhotoStore;

const REPORT_NOT_FOUND: &str = "Reporte no encontrado.";

#[derive(Clone)]
pub struct ReportState {
    pub reports: Arc<ReportService>,
    pub catalog: Arc<CatalogService>,
    pub notifications: Arc<NotificationService>,
    pub templates: Arc<TemplateEngine>,
}

/// Landing page, scoped to the category when known
fn index_url(categoria_id: Option<i32>) -> String {
    match categoria_id {
        Some(id) => format!("/?categoria_id={}", id),
        None => "/".to_string(),
    }
}

/// Report listing of a citizen
fn reports_url(cedula: &str) -> String {
    format!("/reportes?cedula={}", urlencoding::encode(cedula))
}

fn not_found(jar: CookieJar) -> Response {
    redirect_with_flash(
        jar,
        "/reportes",
        Flash::new(FlashLevel::Warning, REPORT_NOT_FOUND),
    )
}

/// Reports of one citizen with resolved labels
pub async fn reportes(
    State(state): State<ReportState>,
    jar: CookieJar,
    Query(query): Query<CedulaQuery>,
) -> Response {
    let cedula = query.cedula();

    let (reportes, error) = match cedula {
        Some(cedula) => {
            let (reports, labels) = tokio::join!(
                state.reports.list_by_cedula(cedula),
                state.catalog.label_maps()
            );
            match reports {
                Ok(reports) => (ResolvedReportView::resolve_all(reports, &labels), None),
                Err(e) => (
                    Vec::new(),
                    Some(format!("Error al obtener reportes: {}", e.user_message())),
                ),
            }
        }
        None => (Vec::new(), None),
    };

    state.templates.render_page(
        jar,
        "paginas/reportes.html",
        json!({
            "cedula": cedula,
            "reportes": reportes,
            "error": error,
        }),
    )
}

/// Store a submitted report, then notify the maintenance inbox
pub async fn enviar_reporte(
    State(state): State<ReportState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Response {
    let form = match MultipartForm::collect(multipart).await {
        Ok(form) => form,
        Err(e) => {
            return redirect_with_flash(
                jar,
                "/",
                Flash::new(FlashLevel::Danger, e.user_message()),
            )
        }
    };

    let dto = match ReportFormDto::from_form(&form) {
        Ok(dto) => dto,
        Err(e) => {
            let categoria = form.fields.get("categoria").and_then(|c| c.trim().parse().ok());
            return redirect_with_flash(
                jar,
                &index_url(categoria),
                Flash::new(
                    FlashLevel::Danger,
                    format!("Error al guardar el reporte: {}", e.user_message()),
                ),
            );
        }
    };
    let back = index_url(dto.categoria);

    let data = CreateReport {
        cedula: dto.cedula,
        category_id: dto.categoria,
        fault_id: dto.falla_id,
        other_fault: dto.otra_falla,
        site_id: dto.sede,
        photo_path: None,
        description: dto.descripcion,
    };

    let report = match state.reports.submit(data, form.photo).await {
        Ok(report) => report,
        Err(e) => {
            return redirect_with_flash(
                jar,
                &back,
                Flash::new(
                    FlashLevel::Danger,
                    format!("Error al guardar el reporte: {}", e.user_message()),
                ),
            )
        }
    };

    // The report is already committed; a failed notification only gets logged
    if let Err(e) = state.notifications.notify_report(notification_for(&report)).await {
        tracing::warn!("Notification for report {} failed: {}", report.id, e);
    }

    let message = if report.photo_path.is_some() {
        "Reporte guardado correctamente con imagen."
    } else {
        "Reporte guardado correctamente."
    };
    redirect_with_flash(jar, &back, Flash::new(FlashLevel::Success, message))
}

fn notification_for(report: &Report) -> SendEmailRequestDto {
    SendEmailRequestDto {
        reporte_id: Some(report.id),
        cedula: Some(report.cedula.clone()),
        categoria_id: report.category_id,
        falla_id: report.fault_id,
        sede_id: report.site_id,
        descripcion: report.description.clone(),
        foto_path: report.photo_path.clone(),
    }
}

/// Edit form of a report
pub async fn editar_reporte_form(
    State(state): State<ReportState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Response {
    let report = match state.reports.find(id).await {
        Ok(Some(report)) => report,
        Ok(None) => return not_found(jar),
        Err(e) => {
            return redirect_with_flash(
                jar,
                "/reportes",
                Flash::new(FlashLevel::Danger, e.user_message()),
            )
        }
    };

    let (category, faults, sites) = match report.category_id {
        Some(category_id) => {
            let (category, faults, sites) = tokio::join!(
                state.catalog.find_category(category_id),
                state.catalog.faults_for_category(category_id),
                state.catalog.list_sites()
            );
            (
                or_degraded(category, "edit form category"),
                or_degraded(faults, "edit form faults"),
                or_degraded(sites, "edit form sites"),
            )
        }
        None => (
            None,
            Vec::new(),
            or_degraded(state.catalog.list_sites().await, "edit form sites"),
        ),
    };

    let categoria_nombre = category
        .map(|c| c.name)
        .unwrap_or_else(|| "Sin categoría".to_string());
    let foto_url = report.photo_path.as_deref().map(PhotoStore::public_url);

    state.templates.render_page(
        jar,
        "paginas/editar_reporte.html",
        json!({
            "reporte": report,
            "fallas": faults,
            "sedes": sites,
            "categoria_nombre": categoria_nombre,
            "foto_url": foto_url,
        }),
    )
}

/// Apply an edit. Category and citizen id are fixed.
pub async fn editar_reporte(
    State(state): State<ReportState>,
    jar: CookieJar,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Response {
    let edit_url = format!("/editar_reporte/{}", id);

    let report = match state.reports.find(id).await {
        Ok(Some(report)) => report,
        Ok(None) => return not_found(jar),
        Err(e) => {
            return redirect_with_flash(
                jar,
                "/reportes",
                Flash::new(FlashLevel::Danger, e.user_message()),
            )
        }
    };

    let result = match MultipartForm::collect(multipart).await {
        Ok(form) => match EditReportFormDto::from_form(&form) {
            Ok(dto) => {
                state
                    .reports
                    .edit(&report, dto.falla, dto.sede, dto.descripcion, form.photo)
                    .await
            }
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(updated) => redirect_with_flash(
            jar,
            &reports_url(&updated.cedula),
            Flash::new(FlashLevel::Success, "Reporte actualizado correctamente."),
        ),
        Err(e) => redirect_with_flash(
            jar,
            &edit_url,
            Flash::new(
                FlashLevel::Danger,
                format!("Error al actualizar el reporte: {}", e.user_message()),
            ),
        ),
    }
}

/// Delete a report and its photo
pub async fn borrar_reporte(
    State(state): State<ReportState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Response {
    match state.reports.delete(id).await {
        Ok(Some(report)) => redirect_with_flash(
            jar,
            &reports_url(&report.cedula),
            Flash::new(FlashLevel::Success, "Reporte eliminado correctamente."),
        ),
        Ok(None) => not_found(jar),
        Err(e) => redirect_with_flash(
            jar,
            "/reportes",
            Flash::new(
                FlashLevel::Danger,
                format!("Error al eliminar el reporte: {}", e.user_message()),
            ),
        ),
    }
}

/// Every report with resolved labels and site coordinates for the map
pub async fn dashboard_admin_reportes(
    State(state): State<ReportState>,
    jar: CookieJar,
) -> Response {
    let (reports, labels) = tokio::join!(state.reports.list_all(), state.catalog.label_maps());

    let (reportes, error) = match reports {
        Ok(reports) => (ResolvedReportView::resolve_all(reports, &labels), None),
        Err(e) => (
            Vec::new(),
            Some(format!("Error al obtener reportes: {}", e.user_message())),
        ),
    };

    state.templates.render_page(
        jar,
        "paginas/dashboard_admin.html",
        json!({
            "vista": "reportes",
            "reportes": reportes,
            "error": error,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_url() {
        assert_eq!(index_url(Some(3)), "/?categoria_id=3");
        assert_eq!(index_url(None), "/");
    }

    #[test]
    fn test_reports_url_encodes_cedula() {
        assert_eq!(reports_url("V-123"), "/reportes?cedula=V-123");
        assert_eq!(reports_url("a b&c"), "/reportes?cedula=a%20b%26c");
    }
}
