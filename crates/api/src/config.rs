use gonasi_core::storage::DEFAULT_SIGNED_URL_TTL_SECS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Largest accepted request body in bytes (default: 512 KiB). Block
    /// content is the biggest payload the API takes.
    pub max_body_bytes: usize,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `MAX_BODY_BYTES`       | `524288`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| "524288".into())
            .parse()
            .expect("MAX_BODY_BYTES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            max_body_bytes,
            jwt: JwtConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }
}

/// Where course images live and how their URLs are signed.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Public base URL of the storage gateway.
    pub base_url: String,
    pub bucket: String,
    /// Shared HMAC key; the gateway verifies tokens with the same value.
    pub signing_secret: String,
    pub signed_url_ttl_secs: i64,
}

impl StorageConfig {
    /// | Env Var                  | Required | Default                  |
    /// |--------------------------|----------|--------------------------|
    /// | `STORAGE_BASE_URL`       | no       | `http://localhost:54321` |
    /// | `STORAGE_BUCKET`         | no       | `course-images`          |
    /// | `STORAGE_SIGNING_SECRET` | **yes**  | --                       |
    /// | `SIGNED_URL_TTL_SECS`    | no       | `3600`                   |
    ///
    /// # Panics
    ///
    /// Panics if `STORAGE_SIGNING_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("STORAGE_BASE_URL").unwrap_or_else(|_| "http://localhost:54321".into());
        let bucket = std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "course-images".into());

        let signing_secret = std::env::var("STORAGE_SIGNING_SECRET")
            .expect("STORAGE_SIGNING_SECRET must be set in the environment");
        assert!(
            !signing_secret.is_empty(),
            "STORAGE_SIGNING_SECRET must not be empty"
        );

        let signed_url_ttl_secs: i64 = std::env::var("SIGNED_URL_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_SIGNED_URL_TTL_SECS.to_string())
            .parse()
            .expect("SIGNED_URL_TTL_SECS must be a valid i64");

        Self {
            base_url,
            bucket,
            signing_secret,
            signed_url_ttl_secs,
        }
    }
}
