use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::notifications::models::{DeliveryState, OutboundEmail};
use crate::modules::storage::PhotoStore;

/// Request body for sending a report notification
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SendEmailRequestDto {
    pub reporte_id: Option<i32>,
    pub cedula: Option<String>,
    pub categoria_id: Option<i32>,
    pub falla_id: Option<i32>,
    pub sede_id: Option<i32>,
    pub descripcion: Option<String>,
    /// Stored photo path relative to the static directory
    pub foto_path: Option<String>,
}

/// Result of a notification send
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SentEmailDto {
    /// Audit record id, absent when the record could not be stored
    pub correo_id: Option<i32>,
}

/// Query of the confirmation callback. Kept as text so a missing or
/// malformed id can be answered with a friendly 400.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ConfirmQuery {
    pub correo_id: Option<String>,
}

impl ConfirmQuery {
    pub fn id(&self) -> Option<i32> {
        self.correo_id.as_deref()?.trim().parse().ok()
    }
}

/// Email record as shown on the admin dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmailRecordView {
    pub id: i32,
    pub reporte_id: Option<i32>,
    pub cedula: Option<String>,
    pub destinatario: String,
    pub asunto: String,
    pub mensaje: Option<String>,
    pub foto_path: Option<String>,
    pub foto_url: Option<String>,
    pub estatus_confirmacion: bool,
    pub estatus_solucion: bool,
    pub estado: DeliveryState,
    pub estado_texto: String,
    pub fecha_envio: String,
}

impl From<OutboundEmail> for EmailRecordView {
    fn from(email: OutboundEmail) -> Self {
        let estado = email.state();
        Self {
            id: email.id,
            reporte_id: email.report_id,
            cedula: email.cedula,
            destinatario: email.recipient,
            asunto: email.subject,
            mensaje: email.body,
            foto_url: email.photo_path.as_deref().map(PhotoStore::public_url),
            foto_path: email.photo_path,
            estatus_confirmacion: email.confirmed,
            estatus_solucion: email.resolved,
            estado,
            estado_texto: estado.label().to_string(),
            fecha_envio: email.sent_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}
