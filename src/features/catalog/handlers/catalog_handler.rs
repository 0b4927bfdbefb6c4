use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::core::error::{or_degraded, Result};
use crate::core::templates::TemplateEngine;
use crate::features::catalog::dtos::{
    CategoryNamesDto, CategoryQuery, CategoryTileView, FaultOptionDto,
};
use crate::features::catalog::services::CatalogService;
use crate::shared::constants::CATEGORY_TILES;

#[derive(Clone)]
pub struct CatalogState {
    pub catalog: Arc<CatalogService>,
    pub templates: Arc<TemplateEngine>,
}

/// Landing page with the category tiles
pub async fn index(
    State(state): State<CatalogState>,
    jar: CookieJar,
    Query(query): Query<CategoryQuery>,
) -> Response {
    let categories = or_degraded(state.catalog.list_categories().await, "category tiles");
    let tiles = CategoryTileView::merge(CATEGORY_TILES, &categories);

    let selected = query
        .categoria_id
        .and_then(|id| categories.into_iter().find(|c| c.id == id));

    state.templates.render_page(
        jar,
        "paginas/index.html",
        json!({
            "categorias": tiles,
            "categoria": selected,
        }),
    )
}

/// Report form scoped to one category
pub async fn formulario(
    State(state): State<CatalogState>,
    jar: CookieJar,
    Query(query): Query<CategoryQuery>,
) -> Response {
    let sites = or_degraded(state.catalog.list_sites().await, "site options");

    let (category, faults) = match query.categoria_id {
        Some(id) => {
            let (category, faults) = tokio::join!(
                state.catalog.find_category(id),
                state.catalog.faults_for_category(id)
            );
            (
                or_degraded(category, "form category"),
                or_degraded(faults, "fault options"),
            )
        }
        None => (None, Vec::new()),
    };

    state.templates.render_page(
        jar,
        "paginas/formulario.html",
        json!({
            "sedes": sites,
            "categoria": category,
            "fallas": faults,
        }),
    )
}

/// Fault options for a category
#[utoipa::path(
    get,
    path = "/obtener_fallas/{categoria_id}",
    params(
        ("categoria_id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Faults of the category", body = Vec<FaultOptionDto>),
        (status = 500, description = "Catalog unavailable")
    ),
    tag = "catalog"
)]
pub async fn obtener_fallas(
    State(state): State<CatalogState>,
    Path(categoria_id): Path<i32>,
) -> Result<Json<Vec<FaultOptionDto>>> {
    let faults = state.catalog.faults_for_category(categoria_id).await?;
    Ok(Json(faults.into_iter().map(FaultOptionDto::from).collect()))
}

/// Category names in lexical order
#[utoipa::path(
    get,
    path = "/api/categorias",
    responses(
        (status = 200, description = "Category names", body = CategoryNamesDto),
        (status = 500, description = "Catalog unavailable")
    ),
    tag = "catalog"
)]
pub async fn api_categorias(State(state): State<CatalogState>) -> Result<Json<CategoryNamesDto>> {
    let categorias = state.catalog.category_names().await?;
    Ok(Json(CategoryNamesDto { categorias }))
}
