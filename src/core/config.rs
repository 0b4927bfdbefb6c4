use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Base URL used to build links that leave the server (confirmation callback)
    pub public_base_url: String,
}

/// Connection settings for the four independently hosted datastores
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub sites_url: String,
    pub catalog_url: String,
    pub reports_url: String,
    pub notifications_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub run_migrations: bool,
}

/// SMTP delivery settings. Without a server, mail is only logged.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: Option<String>,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: String,
    pub recipient: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory served under `/static`; uploads live in `<static_dir>/uploads`
    pub static_dir: PathBuf,
    pub templates_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            mail: MailConfig::from_env()?,
            storage: StorageConfig::from_env(),
            admin: AdminConfig::from_env(),
            swagger: SwaggerConfig::from_env(),
        })
    }
}

/// Read an optional variable, treating empty strings as unset
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 500 * 1024 * 1024; // 500MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let public_base_url = optional_var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{}:{}", host, port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            public_base_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 0;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    /// Each store has its own URL; `DATABASE_URL` covers single-server deployments
    fn store_url(key: &str) -> Result<String, String> {
        optional_var(key)
            .or_else(|| optional_var("DATABASE_URL"))
            .ok_or_else(|| format!("{} (or DATABASE_URL) must be set", key))
    }

    pub fn from_env() -> Result<Self, String> {
        let sites_url = Self::store_url("SITES_DATABASE_URL")?;
        let catalog_url = Self::store_url("CATALOG_DATABASE_URL")?;
        let reports_url = Self::store_url("REPORTS_DATABASE_URL")?;
        let notifications_url = Self::store_url("NOTIFICATIONS_DATABASE_URL")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        let run_migrations = optional_var("RUN_MIGRATIONS")
            .map(|v| parse_bool(&v))
            .unwrap_or(true);

        Ok(Self {
            sites_url,
            catalog_url,
            reports_url,
            notifications_url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            run_migrations,
        })
    }
}

impl MailConfig {
    const DEFAULT_PORT: u16 = 587;
    const DEFAULT_TIMEOUT_SECS: u64 = 15;

    pub fn from_env() -> Result<Self, String> {
        let server = optional_var("MAIL_SERVER");

        let port = env::var("MAIL_PORT")
            .unwrap_or_else(|_| Self::DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| "MAIL_PORT must be a valid port number".to_string())?;

        let use_tls = optional_var("MAIL_USE_TLS")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let username = optional_var("MAIL_USERNAME");
        let password = optional_var("MAIL_PASSWORD");

        let sender = optional_var("MAIL_DEFAULT_SENDER")
            .or_else(|| username.clone())
            .unwrap_or_else(|| "no-reply@localhost".to_string());

        let recipient = optional_var("NOTIFICATION_RECIPIENT").unwrap_or_else(|| sender.clone());

        let timeout_secs = env::var("MAIL_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "MAIL_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            server,
            port,
            use_tls,
            username,
            password,
            sender,
            recipient,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Returns (username, password) when both are configured
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            static_dir: PathBuf::from(
                optional_var("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
            ),
            templates_dir: PathBuf::from(
                optional_var("TEMPLATES_DIR").unwrap_or_else(|| "templates".to_string()),
            ),
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        Self {
            username: optional_var("ADMIN_USERNAME"),
            password: optional_var("ADMIN_PASSWORD"),
        }
    }

    /// Returns credentials in "username:password" format if admin auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Self {
        let username = optional_var("SWAGGER_USERNAME");
        let password = optional_var("SWAGGER_PASSWORD");
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Facility Reports API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "JSON endpoints of the maintenance reporting portal".to_string());

        Self {
            username,
            password,
            title,
            version,
            description,
        }
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("True"));
        assert!(parse_bool("1"));
        assert!(parse_bool(" yes "));
        assert!(!parse_bool("False"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_admin_credentials_require_both_parts() {
        let partial = AdminConfig {
            username: Some("admin".to_string()),
            password: None,
        };
        assert_eq!(partial.credentials(), None);

        let full = AdminConfig {
            username: Some("admin".to_string()),
            password: Some("secret".to_string()),
        };
        assert_eq!(full.credentials().as_deref(), Some("admin:secret"));
    }

    #[test]
    fn test_server_address() {
        let app = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_allowed_origins: vec!["*".to_string()],
            max_request_body_size: 1024,
            public_base_url: "http://localhost:5000".to_string(),
        };
        assert_eq!(app.server_address(), "0.0.0.0:5000");
    }
}
