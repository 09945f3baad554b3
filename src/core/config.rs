use std::env;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "https://courseloop.app",
    "https://www.courseloop.app",
];

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    server: ServerSettings,
    runtime: RuntimeSettings,
    api: ApiSettings,
    security: SecuritySettings,
    cors: CorsSettings,
    database: DatabaseSettings,
    payments: PaymentSettings,
    storage: StorageSettings,
    s3: S3Settings,
    engagement: EngagementSettings,
    admin: AdminSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
struct ServerSettings {
    host: String,
    port: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    pub(crate) api_v1_str: String,
}

#[derive(Debug, Clone)]
pub(crate) struct SecuritySettings {
    pub(crate) secret_key: String,
    pub(crate) access_token_expire_minutes: u64,
    pub(crate) algorithm: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(crate) postgres_server: String,
    pub(crate) postgres_port: u16,
    pub(crate) postgres_user: String,
    pub(crate) postgres_password: String,
    pub(crate) postgres_db: String,
    pub(crate) database_url: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct PaymentSettings {
    pub(crate) provider_url: String,
    pub(crate) webhook_secret: String,
    pub(crate) success_url: String,
    pub(crate) cancel_url: String,
    pub(crate) currency: String,
    pub(crate) request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct StorageSettings {
    pub(crate) max_upload_size_mb: u64,
    pub(crate) allowed_image_extensions: Vec<String>,
    pub(crate) avatar_placeholder_url: String,
}

#[derive(Debug, Clone)]
pub(crate) struct S3Settings {
    pub(crate) endpoint: String,
    pub(crate) access_key: String,
    pub(crate) secret_key: String,
    pub(crate) bucket: String,
    pub(crate) region: String,
}

#[derive(Debug, Clone)]
pub(crate) struct EngagementSettings {
    pub(crate) fanout_concurrency: u64,
    pub(crate) default_page_size: u64,
    pub(crate) max_page_size: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct AdminSettings {
    pub(crate) first_admin_email: String,
    pub(crate) first_admin_password: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }

    fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid cors origins: {0}")]
    InvalidCors(String),
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("COURSELOOP_HOST", "0.0.0.0");
        let port = parse_u16("COURSELOOP_PORT", env_or_default("COURSELOOP_PORT", "8000"))?;

        let environment = parse_environment(
            env_optional("COURSELOOP_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("COURSELOOP_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Courseloop API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key_from_env = env_optional("SECRET_KEY");
        if strict_config && secret_key_from_env.is_none() {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }
        let secret_key = secret_key_from_env.unwrap_or_else(generate_secret_key);

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "courseloop");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "courseloop_db");
        let database_url = env_optional("DATABASE_URL");

        let provider_url = env_or_default("PAYMENT_PROVIDER_URL", "");
        let webhook_secret = env_or_default("PAYMENT_WEBHOOK_SECRET", "");
        if strict_config && webhook_secret.is_empty() {
            return Err(ConfigError::MissingSecret("PAYMENT_WEBHOOK_SECRET"));
        }
        let success_url =
            env_or_default("PAYMENT_SUCCESS_URL", "https://courseloop.app/payment/success");
        let cancel_url =
            env_or_default("PAYMENT_CANCEL_URL", "https://courseloop.app/payment/cancel");
        let currency = env_or_default("PAYMENT_CURRENCY", "usd");
        let request_timeout_seconds = parse_u64(
            "PAYMENT_REQUEST_TIMEOUT",
            env_or_default("PAYMENT_REQUEST_TIMEOUT", "15"),
        )?;

        let max_upload_size_mb =
            parse_u64("MAX_UPLOAD_SIZE_MB", env_or_default("MAX_UPLOAD_SIZE_MB", "5"))?;
        let allowed_image_extensions =
            parse_string_list(env_optional("ALLOWED_IMAGE_EXTENSIONS"), &["jpg", "jpeg", "png"]);
        let avatar_placeholder_url = env_or_default(
            "AVATAR_PLACEHOLDER_URL",
            "https://static.courseloop.app/avatar-placeholder.png",
        );

        let s3_endpoint = env_or_default("S3_ENDPOINT", "https://storage.yandexcloud.net");
        let s3_access_key = env_or_default("S3_ACCESS_KEY", "");
        let s3_secret_key = env_or_default("S3_SECRET_KEY", "");
        let s3_bucket = env_or_default("S3_BUCKET", "courseloop-assets");
        let s3_region = env_or_default("S3_REGION", "ru-central1");

        let fanout_concurrency =
            parse_u64("FANOUT_CONCURRENCY", env_or_default("FANOUT_CONCURRENCY", "16"))?;
        let default_page_size =
            parse_u64("DEFAULT_PAGE_SIZE", env_or_default("DEFAULT_PAGE_SIZE", "20"))?;
        let max_page_size = parse_u64("MAX_PAGE_SIZE", env_or_default("MAX_PAGE_SIZE", "100"))?;

        let first_admin_email = env_or_default("FIRST_ADMIN_EMAIL", "admin@courseloop.app");
        let first_admin_password = env_or_default("FIRST_ADMIN_PASSWORD", "");

        let log_level = env_or_default("COURSELOOP_LOG_LEVEL", "info");
        let json = env_optional("COURSELOOP_LOG_JSON").map(|v| parse_bool(&v)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|v| parse_bool(&v)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings { host, port },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            payments: PaymentSettings {
                provider_url,
                webhook_secret,
                success_url,
                cancel_url,
                currency,
                request_timeout_seconds,
            },
            storage: StorageSettings {
                max_upload_size_mb,
                allowed_image_extensions,
                avatar_placeholder_url,
            },
            s3: S3Settings {
                endpoint: s3_endpoint,
                access_key: s3_access_key,
                secret_key: s3_secret_key,
                bucket: s3_bucket,
                region: s3_region,
            },
            engagement: EngagementSettings {
                fanout_concurrency,
                default_page_size,
                max_page_size,
            },
            admin: AdminSettings { first_admin_email, first_admin_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn payments(&self) -> &PaymentSettings {
        &self.payments
    }

    pub(crate) fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub(crate) fn s3(&self) -> &S3Settings {
        &self.s3
    }

    pub(crate) fn engagement(&self) -> &EngagementSettings {
        &self.engagement
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.allowed_image_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_IMAGE_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }
        if self.engagement.fanout_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "FANOUT_CONCURRENCY",
                value: String::from("0"),
            });
        }
        if self.engagement.default_page_size == 0
            || self.engagement.default_page_size > self.engagement.max_page_size
        {
            return Err(ConfigError::InvalidValue {
                field: "DEFAULT_PAGE_SIZE",
                value: self.engagement.default_page_size.to_string(),
            });
        }
        Ok(())
    }
}

impl DatabaseSettings {
    pub(crate) fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_server,
            self.postgres_port,
            self.postgres_db
        )
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u16(field: &'static str, value: String) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("production") | Some("prod") => Environment::Production,
        Some("staging") => Environment::Staging,
        Some("test") => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = value else {
        return Ok(default_cors_origins());
    };

    if raw.trim_start().starts_with('[') {
        let parsed: Vec<String> =
            serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidCors(raw.clone()))?;
        if parsed.is_empty() {
            return Ok(default_cors_origins());
        }
        return Ok(parsed);
    }

    let items: Vec<String> = raw
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if items.is_empty() {
        return Ok(default_cors_origins());
    }

    Ok(items)
}

fn parse_string_list(value: Option<String>, defaults: &[&str]) -> Vec<String> {
    match value {
        Some(raw) => raw
            .split(',')
            .map(|item| item.trim().to_ascii_lowercase())
            .filter(|item| !item.is_empty())
            .collect(),
        None => defaults.iter().map(|item| item.to_string()).collect(),
    }
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|origin| origin.to_string()).collect()
}

fn generate_secret_key() -> String {
    let mut bytes = [0u8; 48];
    OsRng.fill_bytes(&mut bytes);
    tracing::warn!("SECRET_KEY not set; generated an ephemeral key for this process");
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_accepts_json_array_and_comma_list() {
        let from_json =
            parse_cors_origins(Some(r#"["http://a.example","http://b.example"]"#.to_string()))
                .unwrap();
        assert_eq!(from_json, vec!["http://a.example", "http://b.example"]);

        let from_list =
            parse_cors_origins(Some("http://a.example, http://b.example".to_string())).unwrap();
        assert_eq!(from_list, vec!["http://a.example", "http://b.example"]);
    }

    #[test]
    fn cors_empty_falls_back_to_defaults() {
        let origins = parse_cors_origins(Some("[]".to_string())).unwrap();
        assert_eq!(origins, default_cors_origins());
    }

    #[test]
    fn environment_parsing_is_lenient() {
        assert_eq!(parse_environment(Some("PROD".to_string())), Environment::Production);
        assert_eq!(parse_environment(Some("test".to_string())), Environment::Test);
        assert_eq!(parse_environment(None), Environment::Development);
    }

    #[test]
    fn string_list_lowercases_and_trims() {
        let list = parse_string_list(Some(" JPG, png ,".to_string()), &["gif"]);
        assert_eq!(list, vec!["jpg", "png"]);
        assert_eq!(parse_string_list(None, &["gif"]), vec!["gif"]);
    }

    #[test]
    fn database_url_prefers_explicit_url() {
        let settings = DatabaseSettings {
            postgres_server: "db".into(),
            postgres_port: 5432,
            postgres_user: "u".into(),
            postgres_password: "p".into(),
            postgres_db: "d".into(),
            database_url: Some("postgresql://explicit".into()),
        };
        assert_eq!(settings.database_url(), "postgresql://explicit");

        let built = DatabaseSettings { database_url: None, ..settings };
        assert_eq!(built.database_url(), "postgresql://u:p@db:5432/d");
    }
}
