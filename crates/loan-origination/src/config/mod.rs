use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::origination::{TransitionMode, UnderwritingAssumptions};

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

/// Top-level configuration for the loan service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub workflow: WorkflowConfig,
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

        let auth = AuthConfig::parse(&env::var("APP_API_TOKENS").unwrap_or_default())?;

        let transition_mode = match env::var("LOS_TRANSITION_MODE") {
            Ok(raw) => raw
                .parse::<TransitionMode>()
                .map_err(ConfigError::InvalidTransitionMode)?,
            Err(_) => TransitionMode::default(),
        };

        let defaults = UnderwritingAssumptions::default();
        let assumptions = UnderwritingAssumptions {
            cash_flow_ratio: ratio_var("LOS_CASH_FLOW_RATIO", defaults.cash_flow_ratio)?,
            fixed_foir_percentage: decimal_var("LOS_FIXED_FOIR", defaults.fixed_foir_percentage)?,
            geo_limit_stub_pass: bool_var("LOS_GEO_STUB_PASS", defaults.geo_limit_stub_pass)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth,
            workflow: WorkflowConfig {
                transition_mode,
                assumptions,
            },
        })
    }
}

fn decimal_var(variable: &'static str, default: Decimal) -> Result<Decimal, ConfigError> {
    match env::var(variable) {
        Ok(raw) => Decimal::from_str(raw.trim()).map_err(|_| ConfigError::InvalidDecimal {
            variable,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Ratios are shares of income and must lie within `0..=1`.
fn ratio_var(variable: &'static str, default: Decimal) -> Result<Decimal, ConfigError> {
    let ratio = decimal_var(variable, default)?;
    if ratio.is_sign_negative() || ratio > Decimal::ONE {
        return Err(ConfigError::RatioOutOfRange {
            variable,
            value: ratio,
        });
    }
    Ok(ratio)
}

fn bool_var(variable: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(variable) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                variable,
                value: raw,
            }),
        },
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Bearer token granted to one user of one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    pub user: String,
    pub tenant: String,
}

/// Static API credentials, `token=user@tenant` entries separated by commas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub grants: Vec<TokenGrant>,
}

impl AuthConfig {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut grants = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let grant = entry
                .split_once('=')
                .and_then(|(token, principal)| {
                    let (user, tenant) = principal.rsplit_once('@')?;
                    Some(TokenGrant {
                        token: token.trim().to_string(),
                        user: user.trim().to_string(),
                        tenant: tenant.trim().to_string(),
                    })
                })
                .filter(|grant| {
                    !grant.token.is_empty() && !grant.user.is_empty() && !grant.tenant.is_empty()
                })
                .ok_or_else(|| ConfigError::InvalidTokenGrant(entry.to_string()))?;
            grants.push(grant);
        }
        Ok(Self { grants })
    }
}

/// Knobs for the status machine and the placeholder underwriting policies.
#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    pub transition_mode: TransitionMode,
    pub assumptions: UnderwritingAssumptions,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTokenGrant(String),
    InvalidTransitionMode(String),
    InvalidDecimal { variable: &'static str, value: String },
    RatioOutOfRange { variable: &'static str, value: Decimal },
    InvalidBool { variable: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTokenGrant(entry) => write!(
                f,
                "APP_API_TOKENS entry '{entry}' must look like token=user@tenant"
            ),
            ConfigError::InvalidTransitionMode(value) => write!(
                f,
                "LOS_TRANSITION_MODE must be 'strict' or 'permissive' (found '{value}')"
            ),
            ConfigError::InvalidDecimal { variable, value } => {
                write!(f, "{variable} must be a decimal number (found '{value}')")
            }
            ConfigError::RatioOutOfRange { variable, value } => {
                write!(f, "{variable} must be between 0 and 1 (found '{value}')")
            }
            ConfigError::InvalidBool { variable, value } => {
                write!(f, "{variable} must be true or false (found '{value}')")
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
