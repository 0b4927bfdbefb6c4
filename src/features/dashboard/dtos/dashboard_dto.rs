use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Grouped count straight from the reports store, still keyed by ids
#[derive(Debug, Clone, FromRow)]
pub struct GroupedCount {
    pub site_id: Option<i32>,
    pub category_id: Option<i32>,
    pub count: i64,
}

/// Report count of one category id
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, ToSchema)]
pub struct CategoryTotalDto {
    pub categoria_id: Option<i32>,
    pub total: i64,
}

/// Dense site x category matrix. Missing combinations are 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CountMatrixDto {
    /// Row labels (sites), sorted
    pub sedes: Vec<String>,
    /// Column labels (categories), sorted
    pub categorias: Vec<String>,
    /// `valores[i][j]` counts reports of `sedes[i]` in `categorias[j]`
    pub valores: Vec<Vec<i64>>,
}

/// Category row of the totals page
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryShareDto {
    pub id: Option<i32>,
    pub nombre: String,
    pub total: i64,
    /// Share of all reports, rounded to one decimal
    pub porcentaje: f64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CategorySummaryDto {
    pub categorias: Vec<CategoryShareDto>,
    pub total_reportes: i64,
}

/// Every catalog category with its report count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryCountDto {
    pub categoria_id: i32,
    pub categoria: String,
    pub cantidad: i64,
}
