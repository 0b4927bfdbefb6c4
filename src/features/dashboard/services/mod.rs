mod aggregation;
mod dashboard_service;

pub use aggregation::{
    build_count_matrix, category_counts, category_summary, label_site_category_counts,
};
pub use dashboard_service::DashboardService;
