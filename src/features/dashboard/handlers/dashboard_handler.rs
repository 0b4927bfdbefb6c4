use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::core::error::Result;
use crate::core::templates::TemplateEngine;
use crate::features::dashboard::dtos::{
    CategoryCountDto, CategorySummaryDto, CategoryTotalDto, CountMatrixDto,
};
use crate::features::dashboard::services::DashboardService;

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard: Arc<DashboardService>,
    pub templates: Arc<TemplateEngine>,
}

/// Count of a single category
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryTotalResponse {
    pub categoria_id: i32,
    pub total: i64,
}

/// Category totals page
pub async fn dashboard(State(state): State<DashboardState>, jar: CookieJar) -> Response {
    let summary = match state.dashboard.category_summary().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Serving empty dashboard: {}", e);
            CategorySummaryDto::default()
        }
    };

    state.templates.render_page(
        jar,
        "paginas/dashboard.html",
        json!({
            "categorias": summary.categorias,
            "total_reportes": summary.total_reportes,
        }),
    )
}

/// Report counts per site and category as a dense matrix
#[utoipa::path(
    get,
    path = "/api/fallas_por_sede_categoria",
    responses(
        (status = 200, description = "Site x category counts", body = CountMatrixDto),
        (status = 500, description = "Reports store unavailable")
    ),
    tag = "dashboard"
)]
pub async fn fallas_por_sede_categoria(
    State(state): State<DashboardState>,
) -> Result<Json<CountMatrixDto>> {
    Ok(Json(state.dashboard.site_category_matrix().await?))
}

/// Report count of one category
#[utoipa::path(
    get,
    path = "/api/categoria/{categoria_id}/total",
    params(
        ("categoria_id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category total", body = CategoryTotalResponse),
        (status = 500, description = "Reports store unavailable")
    ),
    tag = "dashboard"
)]
pub async fn categoria_total(
    State(state): State<DashboardState>,
    Path(categoria_id): Path<i32>,
) -> Result<Json<CategoryTotalResponse>> {
    let total = state.dashboard.category_total(categoria_id).await?;
    Ok(Json(CategoryTotalResponse {
        categoria_id,
        total,
    }))
}

/// Report counts grouped by category id
#[utoipa::path(
    get,
    path = "/api/categorias/totales",
    responses(
        (status = 200, description = "Totals per category id", body = Vec<CategoryTotalDto>),
        (status = 500, description = "Reports store unavailable")
    ),
    tag = "dashboard"
)]
pub async fn categorias_totales(
    State(state): State<DashboardState>,
) -> Result<Json<Vec<CategoryTotalDto>>> {
    Ok(Json(state.dashboard.category_totals().await?))
}

/// Every catalog category with its report count
#[utoipa::path(
    get,
    path = "/api/fallas_por_categoria",
    responses(
        (status = 200, description = "Counts per catalog category", body = Vec<CategoryCountDto>),
        (status = 500, description = "A datastore is unavailable")
    ),
    tag = "dashboard"
)]
pub async fn fallas_por_categoria(
    State(state): State<DashboardState>,
) -> Result<Json<Vec<CategoryCountDto>>> {
    Ok(Json(state.dashboard.faults_by_category().await?))
}
