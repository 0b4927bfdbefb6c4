use serde::Serialize;

use crate::core::templates::{TemplateEngine, TemplateError};
use crate::shared::constants::INLINE_PHOTO_CID;

pub const NOTIFICATION_TEMPLATE: &str = "emails/nuevo_reporte.html";

/// Link the recipient follows to confirm they received the email
pub fn confirmation_url(public_base_url: &str, correo_id: i32) -> String {
    format!(
        "{}/confirmar_recepcion?correo_id={}",
        public_base_url.trim_end_matches('/'),
        correo_id
    )
}

/// Values rendered into the notification body. Labels are already resolved.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationContent {
    pub cedula: String,
    pub categoria: String,
    pub falla: String,
    pub sede: String,
    pub descripcion: String,
    /// `cid:` reference of the inline photo, when one is attached
    pub foto_cid: Option<String>,
    /// Absent when the audit record could not be stored
    pub confirmacion_url: Option<String>,
}

impl NotificationContent {
    pub fn with_inline_photo(mut self, attached: bool) -> Self {
        self.foto_cid = attached.then(|| format!("cid:{}", INLINE_PHOTO_CID));
        self
    }

    pub fn render(&self, templates: &TemplateEngine) -> Result<String, TemplateError> {
        templates.render(NOTIFICATION_TEMPLATE, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn content() -> NotificationContent {
        NotificationContent {
            cedula: "V-123".to_string(),
            categoria: "Plomeria".to_string(),
            falla: "Fuga de agua".to_string(),
            sede: "Sede <Norte>".to_string(),
            descripcion: "Gotea el lavamanos".to_string(),
            foto_cid: None,
            confirmacion_url: Some(confirmation_url("http://localhost:5000/", 12)),
        }
    }

    #[test]
    fn test_confirmation_url() {
        assert_eq!(
            confirmation_url("https://portal.example.com", 7),
            "https://portal.example.com/confirmar_recepcion?correo_id=7"
        );
        assert_eq!(
            confirmation_url("http://localhost:5000/", 12),
            "http://localhost:5000/confirmar_recepcion?correo_id=12"
        );
    }

    #[test]
    fn test_render_includes_labels_and_link() {
        let templates = TemplateEngine::from_dir(Path::new("templates"));
        let html = content().render(&templates).unwrap();

        assert!(html.contains("V-123"));
        assert!(html.contains("Fuga de agua"));
        assert!(html.contains("Sede &lt;Norte&gt;"));
        assert!(html.contains("confirmar_recepcion?correo_id=12"));
        assert!(html.contains("Sin imagen adjunta"));
    }

    #[test]
    fn test_render_references_inline_photo() {
        let templates = TemplateEngine::from_dir(Path::new("templates"));
        let html = content().with_inline_photo(true).render(&templates).unwrap();

        assert!(html.contains("cid:foto_reporte"));
        assert!(!html.contains("Sin imagen adjunta"));
    }

    #[test]
    fn test_render_without_record_omits_link() {
        let templates = TemplateEngine::from_dir(Path::new("templates"));
        let mut content = content();
        content.confirmacion_url = None;

        let html = content.render(&templates).unwrap();
        assert!(!html.contains("confirmar_recepcion"));
    }
}
