use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Row of `correos_enviados`: one notification email and its two flags
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct OutboundEmail {
    pub id: i32,
    pub report_id: Option<i32>,
    pub cedula: Option<String>,
    pub recipient: String,
    pub subject: String,
    pub body: Option<String>,
    pub photo_path: Option<String>,
    /// Set by the recipient through the confirmation link
    pub confirmed: bool,
    /// Set by an administrator
    pub resolved: bool,
    pub sent_at: DateTime<Utc>,
}

impl OutboundEmail {
    pub fn state(&self) -> DeliveryState {
        DeliveryState::from_flags(self.confirmed, self.resolved)
    }
}

/// Data for recording a new notification email
#[derive(Debug, Clone)]
pub struct NewOutboundEmail {
    pub report_id: Option<i32>,
    pub cedula: Option<String>,
    pub recipient: String,
    pub subject: String,
    pub body: Option<String>,
    pub photo_path: Option<String>,
}

/// Display state derived from the two independent flags.
///
/// Only the flags are persisted; this is a read-side view of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Pending,
    Confirmed,
    Resolved,
    ConfirmedAndResolved,
}

impl DeliveryState {
    pub fn from_flags(confirmed: bool, resolved: bool) -> Self {
        match (confirmed, resolved) {
            (false, false) => DeliveryState::Pending,
            (true, false) => DeliveryState::Confirmed,
            (false, true) => DeliveryState::Resolved,
            (true, true) => DeliveryState::ConfirmedAndResolved,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryState::Pending => "Pendiente",
            DeliveryState::Confirmed => "Confirmado",
            DeliveryState::Resolved => "Solucionado sin confirmar",
            DeliveryState::ConfirmedAndResolved => "Confirmado y solucionado",
        }
    }
}

/// Which records an admin listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailFilter {
    All,
    Confirmed,
    Unconfirmed,
}

impl EmailFilter {
    /// Value compared against `estatus_confirmacion`, or `None` for no filter
    pub fn confirmed(&self) -> Option<bool> {
        match self {
            EmailFilter::All => None,
            EmailFilter::Confirmed => Some(true),
            EmailFilter::Unconfirmed => Some(false),
        }
    }
}
