//! Outbound mail delivery
//!
//! `Mailer` is the seam between the notification tracker and the transport:
//! SMTP through `lettre` in production, a logging mailer when no server is
//! configured.

mod mailer;

pub use mailer::{build_mailer, InlineImage, Mailer, OutboundMessage};

#[cfg(test)]
pub use mailer::LogMailer;
