//! Environment-driven settings. A `.env` file is honored when present.

use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::workflows::eligibility::{EvaluationConfig, EvaluationSettings};

const MAX_CREDENTIAL_PROBE_LIMIT: u32 = 64;

/// Deployment stage the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub eligibility: EligibilityConfig,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::parse(&var_or("APP_ENV", "development")),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", "info"),
            },
            eligibility: EligibilityConfig::from_env()?,
            ledger: LedgerConfig {
                fixture: env::var("LEDGER_FIXTURE")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .map(PathBuf::from),
            },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses `key` (or `default` when unset) and keeps it only if `accept` holds.
fn parse_var<T, F>(key: &str, default: &str, accept: F, err: ConfigError) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    var_or(key, default)
        .trim()
        .parse::<T>()
        .ok()
        .filter(|value| accept(value))
        .ok_or(err)
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: var_or("APP_HOST", "127.0.0.1"),
            port: parse_var("APP_PORT", "3000", |_| true, ConfigError::InvalidPort)?,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Level or `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Eligibility scoring and loan sizing knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityConfig {
    pub advisory_timeout: Duration,
    pub credential_probe_limit: u32,
    pub points_per_loan_unit: u16,
    pub currency: String,
}

impl EligibilityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = parse_var(
            "ELIGIBILITY_TIMEOUT_SECS",
            "10",
            |secs| *secs > 0,
            ConfigError::InvalidTimeout,
        )?;

        Ok(Self {
            advisory_timeout: Duration::from_secs(timeout_secs),
            credential_probe_limit: parse_var(
                "LEDGER_CREDENTIAL_PROBE_LIMIT",
                "10",
                |limit| (1..=MAX_CREDENTIAL_PROBE_LIMIT).contains(limit),
                ConfigError::InvalidProbeLimit,
            )?,
            points_per_loan_unit: parse_var(
                "LOAN_POINTS_PER_UNIT",
                "100",
                |points| *points > 0,
                ConfigError::InvalidPointsPerUnit,
            )?,
            currency: var_or("LOAN_CURRENCY", "ETH").trim().to_string(),
        })
    }

    pub fn evaluation(&self) -> EvaluationConfig {
        EvaluationConfig {
            points_per_loan_unit: self.points_per_loan_unit,
            currency: self.currency.clone(),
        }
    }

    pub fn settings(&self) -> EvaluationSettings {
        EvaluationSettings {
            advisory_timeout: self.advisory_timeout,
            credential_probe_limit: self.credential_probe_limit,
        }
    }
}

/// Source of ledger data when no chain client is wired in.
#[derive(Debug, Clone, Default)]
pub struct LedgerConfig {
    pub fixture: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidProbeLimit,
    InvalidPointsPerUnit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => f.write_str("APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                f.write_str("APP_HOST must be 'localhost' or an IPv4/IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                f.write_str("ELIGIBILITY_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidProbeLimit => write!(
                f,
                "LEDGER_CREDENTIAL_PROBE_LIMIT must be between 1 and {MAX_CREDENTIAL_PROBE_LIMIT}"
            ),
            ConfigError::InvalidPointsPerUnit => {
                f.write_str("LOAN_POINTS_PER_UNIT must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    const KEYS: [&str; 9] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "ELIGIBILITY_TIMEOUT_SECS",
        "LEDGER_CREDENTIAL_PROBE_LIMIT",
        "LOAN_POINTS_PER_UNIT",
        "LOAN_CURRENCY",
        "LEDGER_FIXTURE",
    ];

    /// Serializes env mutation across tests and starts from a clean slate.
    fn clean_env() -> MutexGuard<'static, ()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        let guard = GUARD
            .get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env mutex poisoned");
        for key in KEYS {
            env::remove_var(key);
        }
        guard
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let _env = clean_env();
        let config = AppConfig::load().expect("config loads with defaults");

        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(
            config.server.socket_addr().expect("default address"),
            SocketAddr::from(([127, 0, 0, 1], 3000))
        );
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.eligibility.settings(), EvaluationSettings::default());
        assert_eq!(config.eligibility.evaluation(), EvaluationConfig::default());
        assert!(config.ledger.fixture.is_none());
    }

    #[test]
    fn eligibility_overrides_are_read() {
        let _env = clean_env();
        env::set_var("APP_ENV", "production");
        env::set_var("ELIGIBILITY_TIMEOUT_SECS", "3");
        env::set_var("LOAN_POINTS_PER_UNIT", "50");
        env::set_var("LOAN_CURRENCY", "USDC");
        env::set_var("LEDGER_FIXTURE", "fixtures/ledger.json");

        let config = AppConfig::load().expect("config loads");

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.eligibility.advisory_timeout, Duration::from_secs(3));
        assert_eq!(config.eligibility.evaluation().points_per_loan_unit, 50);
        assert_eq!(config.eligibility.currency, "USDC");
        assert_eq!(
            config.ledger.fixture,
            Some(PathBuf::from("fixtures/ledger.json"))
        );
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn localhost_binds_loopback() {
        let server = ServerConfig {
            host: "LOCALHOST".to_string(),
            port: 8080,
        };
        assert_eq!(
            server.socket_addr().expect("resolves"),
            SocketAddr::from(([127, 0, 0, 1], 8080))
        );

        let server = ServerConfig {
            host: "example.org".to_string(),
            port: 8080,
        };
        assert!(matches!(
            server.socket_addr(),
            Err(ConfigError::InvalidHost { .. })
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let _env = clean_env();
        env::set_var("ELIGIBILITY_TIMEOUT_SECS", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTimeout)));

        env::remove_var("ELIGIBILITY_TIMEOUT_SECS");
        env::set_var("LEDGER_CREDENTIAL_PROBE_LIMIT", "500");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidProbeLimit)
        ));

        env::remove_var("LEDGER_CREDENTIAL_PROBE_LIMIT");
        env::set_var("APP_PORT", "seventy");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        env::remove_var("APP_PORT");
    }
}
