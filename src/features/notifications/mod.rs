//! Report notification emails and their audit trail.
//!
//! Each notification is recorded in `correos_enviados` with two independent
//! flags: `estatus_confirmacion`, set when the recipient follows the link in
//! the email, and `estatus_solucion`, set by an administrator.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/enviar_correo` | admin | Send a report notification |
//! | GET | `/confirmar_recepcion` | none | Confirmation link target |
//! | GET | `/dashboard_admin` | admin | All email records |
//! | GET | `/dashboard_admin/confirmados` | admin | Confirmed records |
//! | GET | `/dashboard_admin/no_confirmados` | admin | Pending records |
//! | POST | `/marcar_solucionado/{correo_id}` | admin | Set the resolution flag |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::NotificationService;
