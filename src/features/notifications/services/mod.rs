mod email_composer;
mod notification_service;

pub use email_composer::{confirmation_url, NotificationContent};
pub use notification_service::NotificationService;
