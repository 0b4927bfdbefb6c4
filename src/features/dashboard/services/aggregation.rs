//! Reshaping of grouped counts into what the dashboard renders.
//!
//! Counts come from the reports store keyed by ids; labels come from the
//! catalog and sites stores. Everything here is pure.

use std::collections::{BTreeSet, HashMap};

use crate::features::catalog::models::Category;
use crate::features::catalog::services::{LabelMaps, Resolution};
use crate::features::dashboard::dtos::{
    CategoryCountDto, CategoryShareDto, CategorySummaryDto, CategoryTotalDto, CountMatrixDto,
    GroupedCount,
};
use crate::shared::constants::LABEL_NOT_AVAILABLE;

/// Replace site and category ids with their names.
///
/// Rows whose site or category does not resolve are dropped, and rows that
/// end up with the same pair of names are summed.
pub fn label_site_category_counts(
    rows: &[GroupedCount],
    labels: &LabelMaps,
) -> Vec<(String, String, i64)> {
    let mut summed: HashMap<(String, String), i64> = HashMap::new();

    for row in rows {
        let (Resolution::Resolved(site), Resolution::Resolved(category)) =
            (labels.site(row.site_id), labels.category(row.category_id))
        else {
            continue;
        };
        *summed
            .entry((site.to_string(), category.to_string()))
            .or_default() += row.count;
    }

    summed
        .into_iter()
        .map(|((site, category), count)| (site, category, count))
        .collect()
}

/// Build the dense matrix over the distinct labels, each dimension sorted
/// lexically by label. Pairs absent from `counts` are 0.
pub fn build_count_matrix(counts: &[(String, String, i64)]) -> CountMatrixDto {
    let sedes: Vec<String> = counts
        .iter()
        .map(|(site, _, _)| site.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let categorias: Vec<String> = counts
        .iter()
        .map(|(_, category, _)| category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let lookup: HashMap<(&str, &str), i64> = counts
        .iter()
        .map(|(site, category, count)| ((site.as_str(), category.as_str()), *count))
        .collect();

    let valores = sedes
        .iter()
        .map(|site| {
            categorias
                .iter()
                .map(|category| {
                    lookup
                        .get(&(site.as_str(), category.as_str()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    CountMatrixDto {
        sedes,
        categorias,
        valores,
    }
}

/// Share of `total` in `grand_total` as a percentage with one decimal
fn percentage(total: i64, grand_total: i64) -> f64 {
    if grand_total <= 0 {
        return 0.0;
    }
    let share = total as f64 / grand_total as f64 * 100.0;
    (share * 10.0).round() / 10.0
}

/// Per-category totals with their share, including catalog categories that
/// have no reports. Sorted by total descending, then by name.
pub fn category_summary(
    totals: &[CategoryTotalDto],
    category_names: &HashMap<i32, String>,
) -> CategorySummaryDto {
    let total_reportes: i64 = totals.iter().map(|t| t.total).sum();

    let mut categorias: Vec<CategoryShareDto> = totals
        .iter()
        .map(|t| CategoryShareDto {
            id: t.categoria_id,
            nombre: match t.categoria_id {
                Some(id) => category_names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| format!("ID {}", id)),
                None => LABEL_NOT_AVAILABLE.to_string(),
            },
            total: t.total,
            porcentaje: percentage(t.total, total_reportes),
        })
        .collect();

    for (id, name) in category_names {
        if !totals.iter().any(|t| t.categoria_id == Some(*id)) {
            categorias.push(CategoryShareDto {
                id: Some(*id),
                nombre: name.clone(),
                total: 0,
                porcentaje: 0.0,
            });
        }
    }

    categorias.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.nombre.cmp(&b.nombre)));

    CategorySummaryDto {
        categorias,
        total_reportes,
    }
}

/// Report count of every catalog category, in catalog order. Reports with
/// an id outside the catalog are not listed.
pub fn category_counts(
    categories: &[Category],
    totals: &[CategoryTotalDto],
) -> Vec<CategoryCountDto> {
    categories
        .iter()
        .map(|c| CategoryCountDto {
            categoria_id: c.id,
            categoria: c.name.clone(),
            cantidad: totals
                .iter()
                .filter(|t| t.categoria_id == Some(c.id))
                .map(|t| t.total)
                .sum(),
        })
        .collect()
}
