//! Process configuration, read once at startup from `.env` and the environment.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Deployment stage reported in startup logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "ci" | "test" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub checkout: CheckoutConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match non_empty_var("APP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort)?,
            None => ServerConfig::DEFAULT_PORT,
        };

        Ok(Self {
            environment: AppEnvironment::parse(
                non_empty_var("APP_ENV").as_deref().unwrap_or("development"),
            ),
            server: ServerConfig {
                host: non_empty_var("APP_HOST")
                    .unwrap_or_else(|| ServerConfig::DEFAULT_HOST.to_string()),
                port,
            },
            telemetry: TelemetryConfig {
                log_level: non_empty_var("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
            store: StoreConfig {
                directory: non_empty_var("APP_STORE_DIR").map(PathBuf::from),
            },
            checkout: CheckoutConfig {
                detection_interval: millis_var(
                    "CHECKOUT_DETECTION_INTERVAL_MS",
                    CheckoutConfig::DEFAULT_DETECTION_INTERVAL,
                )?,
                processing_delay: millis_var(
                    "CHECKOUT_PROCESSING_DELAY_MS",
                    CheckoutConfig::DEFAULT_PROCESSING_DELAY,
                )?,
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn millis_var(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let Some(raw) = non_empty_var(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(Duration::from_millis(millis)),
        _ => Err(ConfigError::InvalidDuration { variable: name }),
    }
}

/// Where the event API listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 3000;

    /// `localhost` is accepted as a shorthand for the IPv4 loopback.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host.parse().map_err(|source| ConfigError::InvalidHost {
                host: self.host.clone(),
                source,
            })?
        };

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where emotion and review documents land. `None` keeps them in memory.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub directory: Option<PathBuf>,
}

/// Kiosk timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub detection_interval: Duration,
    pub processing_delay: Duration,
}

impl CheckoutConfig {
    pub const DEFAULT_DETECTION_INTERVAL: Duration = Duration::from_millis(1000);
    pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(1500);
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            detection_interval: Self::DEFAULT_DETECTION_INTERVAL,
            processing_delay: Self::DEFAULT_PROCESSING_DELAY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a port number between 0 and 65535")]
    InvalidPort,
    #[error("APP_HOST '{host}' is not an IP address")]
    InvalidHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{variable} must be a positive number of milliseconds")]
    InvalidDuration { variable: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    const VARIABLES: [&str; 7] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "APP_STORE_DIR",
        "CHECKOUT_DETECTION_INTERVAL_MS",
        "CHECKOUT_PROCESSING_DELAY_MS",
    ];

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn clear_env() {
        for name in VARIABLES {
            env::remove_var(name);
        }
    }

    #[test]
    fn defaults_cover_every_setting() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        clear_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.store.directory.is_none());
        assert_eq!(config.checkout, CheckoutConfig::default());
    }

    #[test]
    fn localhost_maps_to_loopback() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        clear_env();
        env::set_var("APP_HOST", "localhost");
        env::set_var("APP_PORT", "8080");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));
        clear_env();
    }

    #[test]
    fn reads_store_and_checkout_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        clear_env();
        env::set_var("APP_STORE_DIR", "/var/lib/emotion-pay");
        env::set_var("CHECKOUT_DETECTION_INTERVAL_MS", "250");
        env::set_var("CHECKOUT_PROCESSING_DELAY_MS", "10");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.store.directory,
            Some(PathBuf::from("/var/lib/emotion-pay"))
        );
        assert_eq!(config.checkout.detection_interval, Duration::from_millis(250));
        assert_eq!(config.checkout.processing_delay, Duration::from_millis(10));
        clear_env();
    }

    #[test]
    fn rejects_zero_detection_interval() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        clear_env();
        env::set_var("CHECKOUT_DETECTION_INTERVAL_MS", "0");
        match AppConfig::load() {
            Err(ConfigError::InvalidDuration { variable }) => {
                assert_eq!(variable, "CHECKOUT_DETECTION_INTERVAL_MS")
            }
            other => panic!("expected invalid duration, got {other:?}"),
        }
        clear_env();
    }

    #[test]
    fn rejects_unparseable_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        clear_env();
        env::set_var("APP_PORT", "kiosk");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        clear_env();
    }
}
