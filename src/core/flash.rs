//! One-shot flash messages carried in a cookie across a redirect.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
    Warning,
    Info,
}

impl FlashLevel {
    fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
            FlashLevel::Warning => "warning",
            FlashLevel::Info => "info",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(FlashLevel::Success),
            "danger" => Some(FlashLevel::Danger),
            "warning" => Some(FlashLevel::Warning),
            "info" => Some(FlashLevel::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Cookie value in the form `<level>:<message>`.
    ///
    /// The jar percent-encodes the value on the way out and decodes it on
    /// the way in.
    fn encode(&self) -> String {
        format!("{}:{}", self.level.as_str(), self.message)
    }

    fn decode(value: &str) -> Option<Self> {
        let (level, message) = value.split_once(':')?;
        let level = FlashLevel::parse(level)?;
        Some(Self {
            level,
            message: message.to_string(),
        })
    }
}

/// Store a flash message and redirect to `to`
pub fn redirect_with_flash(jar: CookieJar, to: &str, flash: Flash) -> Response {
    let cookie = Cookie::build((FLASH_COOKIE, flash.encode()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (jar.add(cookie), Redirect::to(to)).into_response()
}

/// Read and clear the pending flash message, if any
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = Flash::decode(cookie.value());

    let removal = Cookie::build(FLASH_COOKIE).path("/").build();
    (jar.remove(removal), flash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_flash_cookie_value_survives_special_characters() {
        let flash = Flash::new(FlashLevel::Danger, "Error al guardar: ñ; a=b, c");
        let decoded = Flash::decode(&flash.encode()).unwrap();
        assert_eq!(decoded, flash);
    }

    #[test]
    fn test_decode_rejects_unknown_level() {
        assert_eq!(Flash::decode("shout:hola"), None);
        assert_eq!(Flash::decode("no-separator"), None);
    }

    #[test]
    fn test_redirect_sets_cookie_and_location() {
        let response = redirect_with_flash(
            CookieJar::new(),
            "/reportes?cedula=123",
            Flash::new(FlashLevel::Success, "Reporte eliminado correctamente."),
        );

        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/reportes?cedula=123"
        );
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("flash="));
    }

    #[test]
    fn test_flash_round_trips_through_cookie_header() {
        let flash = Flash::new(FlashLevel::Success, "Reporte eliminado: 100% listo; sede=1");
        let response = redirect_with_flash(CookieJar::new(), "/", flash.clone());

        // Replay the name=value pair the browser would send back
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap().to_string();
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::COOKIE, pair.parse().unwrap());

        let (jar, taken) = take_flash(CookieJar::from_headers(&headers));
        assert_eq!(taken, Some(flash));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_take_flash_consumes_message() {
        let jar = CookieJar::new().add(Cookie::new(
            FLASH_COOKIE,
            "warning:Reporte no encontrado.",
        ));
        let (jar, flash) = take_flash(jar);

        assert_eq!(
            flash,
            Some(Flash::new(FlashLevel::Warning, "Reporte no encontrado."))
        );
        assert!(jar.get(FLASH_COOKIE).is_none());
    }
}
