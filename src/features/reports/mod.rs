//! Citizen defect reports.
//!
//! Reports live in their own datastore and reference categories, faults
//! and sites by id only. Submitting a report stores the photo under the
//! static directory and sends a notification in-process.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/reportes?cedula=` | Reports of a citizen |
//! | POST | `/enviar_reporte` | Submit a report (multipart) |
//! | GET/POST | `/editar_reporte/{id}` | Edit form / apply edit |
//! | POST | `/borrar_reporte/{id}` | Delete report and photo |
//! | GET | `/dashboard_admin/reportes` | Admin listing with site coordinates |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use handlers::ReportState;
pub use services::ReportService;
