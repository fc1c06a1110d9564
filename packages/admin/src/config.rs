use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use lexpanel_client::{ClientConfig, ClientError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_SESSION_IDLE_HOURS: i64 = 8;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub session_secure: bool,
    pub session_idle_hours: i64,
    /// Only admin and AI reporter accounts may use the console.
    pub enforce_admin_role: bool,
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl AppConfig {
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            static_dir: PathBuf::from("static"),
            session_secure: false,
            session_idle_hours: DEFAULT_SESSION_IDLE_HOURS,
            enforce_admin_role: false,
        }
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let client = ClientConfig::from_env()?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ClientError::Config(format!("invalid BIND_ADDR: {e}")))?;

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());

        let session_idle_hours = env::var("SESSION_IDLE_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|hours: &i64| *hours > 0)
            .unwrap_or(DEFAULT_SESSION_IDLE_HOURS);

        let config = Self {
            client,
            bind_addr,
            static_dir: PathBuf::from(static_dir),
            session_secure: env_flag("SESSION_SECURE"),
            session_idle_hours,
            enforce_admin_role: env_flag("ENFORCE_ADMIN_ROLE"),
        };

        if config.enforce_admin_role {
            tracing::info!("console access restricted to admin and AI reporter roles");
        } else {
            tracing::info!("console role check is disabled");
        }

        Ok(config)
    }
}
