use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[arg(long = "database-url", env = "TRAVEL_DATABASE_URL")]
    pub url: String,

    /// Maximum number of pooled connections
    #[arg(long, env = "TRAVEL_DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    #[arg(long, env = "TRAVEL_DB_MIN_CONNECTIONS", default_value_t = 2)]
    pub min_connections: u32,

    /// Seconds to wait for a free connection before failing
    #[arg(long, env = "TRAVEL_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Seconds an idle connection may live
    #[arg(long, env = "TRAVEL_DB_IDLE_TIMEOUT_SECS", default_value_t = 600)]
    pub idle_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "TRAVEL_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the public API
    #[arg(long, env = "TRAVEL_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for liveness/readiness probes
    #[arg(long, env = "TRAVEL_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Seconds to wait for background tasks during shutdown
    #[arg(long, env = "TRAVEL_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,

    /// Comma-separated list of allowed CORS origins. Empty allows any origin.
    #[arg(long, env = "TRAVEL_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Secret key for JWT signing
    #[arg(long, env = "TRAVEL_JWT_SECRET")]
    pub jwt_secret: String,

    /// Access token time-to-live in seconds
    #[arg(long, env = "TRAVEL_ACCESS_TOKEN_TTL_SECS", default_value_t = 900)]
    pub access_token_ttl_secs: u64,

    /// Refresh token time-to-live in days
    #[arg(long, env = "TRAVEL_REFRESH_TOKEN_TTL_DAYS", default_value_t = 7)]
    pub refresh_token_ttl_days: i64,

    /// How often expired refresh tokens are purged (0 disables the worker)
    #[arg(long, env = "TRAVEL_REFRESH_CLEANUP_INTERVAL_SECS", default_value_t = 3600)]
    pub refresh_cleanup_interval_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the readiness database probe in milliseconds
    #[arg(long, env = "TRAVEL_HEALTH_DB_TIMEOUT_MS", default_value_t = 2000)]
    pub db_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "TRAVEL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for traces and metrics (disabled when unset)
    #[arg(long, env = "TRAVEL_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { db_timeout_ms: 2000 }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { log_format: LogFormat::Text, otlp_endpoint: None }
    }
}
