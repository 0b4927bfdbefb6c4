//! Page and email templates using Jinja2 syntax.
//!
//! Templates are loaded once at startup from the configured templates
//! directory. Every `*.html` file is registered under its path relative to
//! that directory (e.g. `paginas/index.html`), with HTML auto-escaping.

use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;
use minijinja::Environment;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::core::error::AppError;
use crate::core::flash::take_flash;

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        AppError::Template(e.to_string())
    }
}

pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Build an engine with every template found under `dir`.
    ///
    /// A missing directory yields an empty engine; rendering then reports
    /// `TemplateError::NotFound`.
    pub fn from_dir(dir: &Path) -> Self {
        let mut env = Environment::new();

        if dir.exists() {
            load_templates_recursive(&mut env, dir, dir);
        } else {
            tracing::warn!("Templates directory {} does not exist", dir.display());
        }

        Self { env }
    }

    /// Render a template with any serialisable context
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|_| TemplateError::NotFound(name.to_string()))?;

        template
            .render(ctx)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    pub fn template_exists(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Render a full page, exposing the pending flash message as `flash`.
    ///
    /// `ctx` must serialise to a map.
    pub fn render_page<S: Serialize>(&self, jar: CookieJar, name: &str, ctx: S) -> Response {
        let (jar, flash) = take_flash(jar);

        let mut value = match serde_json::to_value(ctx) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => serde_json::Map::new(),
            Err(e) => return AppError::Internal(e.to_string()).into_response(),
        };
        value.insert(
            "flash".to_string(),
            serde_json::to_value(flash).unwrap_or(serde_json::Value::Null),
        );

        match self.render(name, value) {
            Ok(body) => (jar, Html(body)).into_response(),
            Err(e) => AppError::from(e).into_response(),
        }
    }
}

/// Recursively load all .html templates from a directory
fn load_templates_recursive(env: &mut Environment<'static>, base_path: &Path, current_path: &Path) {
    let Ok(entries) = std::fs::read_dir(current_path) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path);
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let Ok(relative) = path.strip_prefix(base_path) else {
                continue;
            };
            // Template names always use forward slashes
            let template_name = relative.to_string_lossy().replace('\\', "/");

            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    if let Err(e) = env.add_template_owned(template_name.clone(), content) {
                        tracing::warn!("Failed to load template {}: {}", template_name, e);
                    } else {
                        tracing::debug!("Loaded template: {}", template_name);
                    }
                }
                Err(e) => tracing::warn!("Failed to read template {}: {}", template_name, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn engine() -> TemplateEngine {
        TemplateEngine::from_dir(&PathBuf::from("templates"))
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let result = engine().render("definitely_not_a_real_template.html", ());
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_shipped_templates_are_loaded() {
        let engine = engine();
        for name in [
            "base.html",
            "paginas/index.html",
            "paginas/formulario.html",
            "paginas/reportes.html",
            "paginas/editar_reporte.html",
            "paginas/dashboard.html",
            "paginas/dashboard_admin.html",
            "paginas/confirmacion.html",
            "emails/nuevo_reporte.html",
        ] {
            assert!(engine.template_exists(name), "missing template {}", name);
        }
    }

    #[test]
    fn test_render_page_exposes_flash() {
        use crate::core::flash::{redirect_with_flash, Flash, FlashLevel};
        use axum_extra::extract::cookie::Cookie;

        let dir = std::env::temp_dir().join(format!("templates-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("page.html"),
            "{% if flash %}[{{ flash.level }}] {{ flash.message }}{% endif %}|{{ title }}",
        )
        .unwrap();
        let engine = TemplateEngine::from_dir(&dir);

        // Carry the cookie value produced by a redirect into the next request
        let redirect = redirect_with_flash(
            CookieJar::new(),
            "/",
            Flash::new(FlashLevel::Success, "Guardado <ok>"),
        );
        let set_cookie = redirect.headers()["set-cookie"].to_str().unwrap().to_string();
        let cookie = Cookie::parse_encoded(set_cookie).unwrap();
        let jar = CookieJar::new().add(Cookie::new("flash", cookie.value().to_string()));

        let response = engine.render_page(jar, "page.html", serde_json::json!({"title": "Inicio"}));
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_directory_gives_empty_engine() {
        let engine = TemplateEngine::from_dir(Path::new("no/such/templates/dir"));
        assert!(!engine.template_exists("base.html"));
    }
}
