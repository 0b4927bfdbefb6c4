use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::catalog::services::CatalogService;
use crate::features::dashboard::dtos::{
    CategoryCountDto, CategorySummaryDto, CategoryTotalDto, CountMatrixDto, GroupedCount,
};
use crate::features::dashboard::services::{
    build_count_matrix, category_counts, category_summary, label_site_category_counts,
};

/// Aggregations over the reports store, labelled from the catalog
pub struct DashboardService {
    reports: PgPool,
    catalog: Arc<CatalogService>,
}

impl DashboardService {
    pub fn new(reports: PgPool, catalog: Arc<CatalogService>) -> Self {
        Self { reports, catalog }
    }

    /// Report counts per (site id, category id) pair
    pub async fn site_category_counts(&self) -> Result<Vec<GroupedCount>> {
        sqlx::query_as::<_, GroupedCount>(
            r#"
            SELECT sede AS site_id, categoria AS category_id, COUNT(*) AS count
            FROM reportes
            GROUP BY sede, categoria
            "#,
        )
        .fetch_all(&self.reports)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count reports by site and category: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Report counts per category id, nulls included
    pub async fn category_totals(&self) -> Result<Vec<CategoryTotalDto>> {
        sqlx::query_as::<_, CategoryTotalDto>(
            r#"
            SELECT categoria AS categoria_id, COUNT(*) AS total
            FROM reportes
            GROUP BY categoria
            ORDER BY categoria
            "#,
        )
        .fetch_all(&self.reports)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count reports by category: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn category_total(&self, category_id: i32) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reportes WHERE categoria = $1")
            .bind(category_id)
            .fetch_one(&self.reports)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reports of category {}: {:?}", category_id, e);
                AppError::Database(e)
            })
    }

    /// Site x category matrix over resolvable labels
    pub async fn site_category_matrix(&self) -> Result<CountMatrixDto> {
        let (counts, labels) = tokio::join!(self.site_category_counts(), self.catalog.label_maps());
        let labelled = label_site_category_counts(&counts?, &labels);
        Ok(build_count_matrix(&labelled))
    }

    /// Totals page data: every category with its count and share
    pub async fn category_summary(&self) -> Result<CategorySummaryDto> {
        let (totals, labels) = tokio::join!(self.category_totals(), self.catalog.label_maps());
        Ok(category_summary(&totals?, &labels.categories))
    }

    /// Every catalog category with its report count
    pub async fn faults_by_category(&self) -> Result<Vec<CategoryCountDto>> {
        let (categories, totals) =
            tokio::join!(self.catalog.list_categories(), self.category_totals());
        Ok(category_counts(&categories?, &totals?))
    }
}
