//! Multipart report forms.
//!
//! Fields are first collected as raw text, then parsed into typed forms by
//! pure functions so the parsing can be tested without an HTTP request.

use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::modules::storage::PhotoUpload;
use crate::shared::validation::{first_error_message, CEDULA_REGEX};

/// Multipart field carrying the photo
pub const PHOTO_FIELD: &str = "foto_path";

/// Raw multipart payload: text fields plus the optional photo
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub photo: Option<PhotoUpload>,
}

impl MultipartForm {
    pub async fn collect(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("No se pudo leer el formulario: {}", e))
        })? {
            let name = field.name().unwrap_or("").to_string();

            if name == PHOTO_FIELD {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("No se pudo leer la foto: {}", e))
                })?;

                // Browsers send an empty part when no file was chosen
                if !filename.is_empty() && !data.is_empty() {
                    form.photo = Some(PhotoUpload {
                        filename,
                        data: data.to_vec(),
                    });
                }
                continue;
            }

            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("No se pudo leer el campo '{}': {}", name, e))
            })?;
            form.fields.insert(name, text);
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn id(&self, name: &str) -> Result<Option<i32>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i32>()
                .map(Some)
                .map_err(|_| AppError::Validation(format!("Valor inválido para '{}'", name))),
        }
    }
}

/// New report submitted from the form
#[derive(Debug, Clone, Validate)]
pub struct ReportFormDto {
    #[validate(regex(
        path = *CEDULA_REGEX,
        message = "La cédula debe tener entre 1 y 20 letras, números o guiones"
    ))]
    pub cedula: String,

    pub categoria: Option<i32>,

    pub falla_id: Option<i32>,

    #[validate(length(max = 255, message = "La falla descrita no debe superar 255 caracteres"))]
    pub otra_falla: Option<String>,

    pub sede: Option<i32>,

    #[validate(length(max = 2000, message = "La descripción no debe superar 2000 caracteres"))]
    pub descripcion: Option<String>,
}

impl ReportFormDto {
    /// Parse and validate the submitted fields
    pub fn from_form(form: &MultipartForm) -> Result<Self> {
        let dto = Self {
            cedula: form.text("cedula").unwrap_or_default(),
            categoria: form.id("categoria")?,
            falla_id: form.id("falla_id")?,
            otra_falla: form.text("otra_falla"),
            sede: form.id("sede")?,
            descripcion: form.text("descripcion"),
        };

        dto.validate()
            .map_err(|e| AppError::Validation(first_error_message(&e)))?;
        Ok(dto)
    }
}

/// Changes submitted from the edit form
#[derive(Debug, Clone, Validate)]
pub struct EditReportFormDto {
    pub falla: Option<i32>,

    pub sede: Option<i32>,

    #[validate(length(max = 2000, message = "La descripción no debe superar 2000 caracteres"))]
    pub descripcion: Option<String>,
}

impl EditReportFormDto {
    pub fn from_form(form: &MultipartForm) -> Result<Self> {
        let dto = Self {
            falla: form.id("falla")?,
            sede: form.id("sede")?,
            descripcion: form.text("descripcion"),
        };

        dto.validate()
            .map_err(|e| AppError::Validation(first_error_message(&e)))?;
        Ok(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn form(pairs: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            photo: None,
        }
    }

    #[test]
    fn test_parses_complete_submission() {
        let descripcion: String = Sentence(3..8).fake();
        let dto = ReportFormDto::from_form(&form(&[
            ("cedula", " V-12345678 "),
            ("categoria", "2"),
            ("falla_id", "14"),
            ("otra_falla", ""),
            ("sede", "3"),
            ("descripcion", &descripcion),
        ]))
        .unwrap();

        assert_eq!(dto.cedula, "V-12345678");
        assert_eq!(dto.categoria, Some(2));
        assert_eq!(dto.falla_id, Some(14));
        assert_eq!(dto.otra_falla, None);
        assert_eq!(dto.sede, Some(3));
        assert_eq!(dto.descripcion.as_deref(), Some(descripcion.trim()));
    }

    #[test]
    fn test_missing_ids_are_none() {
        let dto = ReportFormDto::from_form(&form(&[("cedula", "123")])).unwrap();
        assert_eq!(dto.categoria, None);
        assert_eq!(dto.falla_id, None);
        assert_eq!(dto.sede, None);
    }

    #[test]
    fn test_rejects_bad_cedula() {
        for cedula in ["", "12 34", "../../x", "123456789012345678901"] {
            let result = ReportFormDto::from_form(&form(&[("cedula", cedula)]));
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "accepted {:?}",
                cedula
            );
        }
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        let result = ReportFormDto::from_form(&form(&[("cedula", "123"), ("sede", "norte")]));
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("sede")),
            other => panic!("unexpected {:?}", other.map(|d| d.cedula)),
        }
    }

    #[test]
    fn test_rejects_long_description() {
        let long = "x".repeat(2001);
        let result =
            ReportFormDto::from_form(&form(&[("cedula", "123"), ("descripcion", &long)]));
        assert!(matches!(result, Err(AppError::Validation(_))));

        let edit = EditReportFormDto::from_form(&form(&[("descripcion", &long)]));
        assert!(matches!(edit, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_description_limit_counts_characters() {
        let accented = "ñ".repeat(2000);
        let dto =
            EditReportFormDto::from_form(&form(&[("descripcion", &accented), ("falla", "4")]))
                .unwrap();
        assert_eq!(dto.falla, Some(4));
    }
}
