use serde::{de, Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            message,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            errors,
        }
    }
}

/// Deserialize query/form values where an empty string means "not given"
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        id: Option<i32>,
    }

    fn parse(json: &str) -> Result<Query, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_empty_string_as_none() {
        assert_eq!(parse(r#"{"id": ""}"#).unwrap().id, None);
        assert_eq!(parse(r#"{"id": " 12 "}"#).unwrap().id, Some(12));
        assert_eq!(parse(r#"{}"#).unwrap().id, None);
        assert!(parse(r#"{"id": "abc"}"#).is_err());
    }

    #[test]
    fn test_error_envelope() {
        let body = ApiResponse::<()>::error(Some("boom".to_string()), None);
        assert!(!body.success);
        assert_eq!(body.message.as_deref(), Some("boom"));
    }
}
