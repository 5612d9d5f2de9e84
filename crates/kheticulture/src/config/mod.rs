use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub marketplace: MarketplaceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = MarketplaceConfig::default();
        let marketplace = MarketplaceConfig {
            reapply_cooldown_hours: numeric_var(
                "MARKET_REAPPLY_COOLDOWN_HOURS",
                defaults.reapply_cooldown_hours,
            )?,
            max_wage: numeric_var("MARKET_MAX_WAGE", defaults.max_wage)?,
            job_list_limit: numeric_var("MARKET_JOB_LIST_LIMIT", defaults.job_list_limit)?,
            application_list_limit: numeric_var(
                "MARKET_APPLICATION_LIST_LIMIT",
                defaults.application_list_limit,
            )?,
            reconcile_interval_secs: numeric_var(
                "MARKET_RECONCILE_INTERVAL_SECS",
                defaults.reconcile_interval_secs,
            )?,
        };

        if marketplace.max_wage <= 0 {
            return Err(ConfigError::InvalidNumber {
                key: "MARKET_MAX_WAGE",
                value: marketplace.max_wage.to_string(),
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            marketplace,
        })
    }
}

fn numeric_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Business knobs for the job marketplace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceConfig {
    /// Hours a rejected worker waits before applying to the same job again.
    pub reapply_cooldown_hours: u32,
    /// Highest wage a farmer may post for a single job.
    pub max_wage: i64,
    pub job_list_limit: usize,
    pub application_list_limit: usize,
    /// Seconds between background status passes in the server. Zero disables the loop.
    pub reconcile_interval_secs: u64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            reapply_cooldown_hours: 24,
            max_wage: 100_000,
            job_list_limit: 100,
            application_list_limit: 200,
            reconcile_interval_secs: 300,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive number (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "MARKET_REAPPLY_COOLDOWN_HOURS",
            "MARKET_MAX_WAGE",
            "MARKET_JOB_LIST_LIMIT",
            "MARKET_APPLICATION_LIST_LIMIT",
            "MARKET_RECONCILE_INTERVAL_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.marketplace, MarketplaceConfig::default());
        assert_eq!(config.marketplace.reapply_cooldown_hours, 24);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn marketplace_overrides_are_parsed() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MARKET_REAPPLY_COOLDOWN_HOURS", "48");
        env::set_var("MARKET_MAX_WAGE", "5000");
        env::set_var("MARKET_RECONCILE_INTERVAL_SECS", "0");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.marketplace.reapply_cooldown_hours, 48);
        assert_eq!(config.marketplace.max_wage, 5000);
        assert_eq!(config.marketplace.job_list_limit, 100);
        assert_eq!(config.marketplace.reconcile_interval_secs, 0);
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_marketplace_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MARKET_JOB_LIST_LIMIT", "lots");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { key, .. }) => {
                assert_eq!(key, "MARKET_JOB_LIST_LIMIT")
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }
}
