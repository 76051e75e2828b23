use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) server: ServerSettings,
    pub(super) runtime: RuntimeSettings,
    pub(super) api: ApiSettings,
    pub(super) security: SecuritySettings,
    pub(super) cors: CorsSettings,
    pub(super) database: DatabaseSettings,
    pub(super) telemetry: TelemetrySettings,
}

/// Listener address. The port is never zero.
#[derive(Debug, Clone)]
pub(crate) struct ServerSettings {
    pub(crate) host: String,
    pub(crate) port: u16,
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
    pub(crate) algorithm: String,
    pub(crate) secret_key_generated: bool,
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
    pub(crate) pool: PoolSettings,
}

/// Pool sizing and the wait limits applied to progress-root row locks.
#[derive(Debug, Clone)]
pub(crate) struct PoolSettings {
    pub(crate) max_connections: u32,
    pub(crate) min_connections: u32,
    pub(crate) acquire_timeout_secs: u64,
    /// Sent as the session `lock_timeout`; 0 disables it.
    pub(crate) lock_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
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

    pub(super) fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid listen address {host}:{port}")]
    InvalidListenAddr { host: String, port: String },
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid cors origins: {0}")]
    InvalidCors(String),
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}

impl ServerSettings {
    pub(super) fn parse(host: String, port: String) -> Result<Self, ConfigError> {
        let parsed = port.parse::<u16>().ok().filter(|value| *value != 0);
        match parsed {
            Some(port) if !host.trim().is_empty() => Ok(Self { host, port }),
            _ => Err(ConfigError::InvalidListenAddr { host, port }),
        }
    }

    pub(crate) fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
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

impl PoolSettings {
    pub(crate) fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub(crate) fn lock_timeout(&self) -> Option<Duration> {
        (self.lock_timeout_ms > 0).then(|| Duration::from_millis(self.lock_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_rejects_zero_port_and_blank_host() {
        assert!(ServerSettings::parse("0.0.0.0".into(), "0".into()).is_err());
        assert!(ServerSettings::parse(" ".into(), "8000".into()).is_err());

        let server = ServerSettings::parse("127.0.0.1".into(), "8000".into()).expect("server");
        assert_eq!(server.addr(), "127.0.0.1:8000");
    }

    #[test]
    fn zero_lock_timeout_is_disabled() {
        let mut pool = PoolSettings {
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 30,
            lock_timeout_ms: 0,
        };
        assert_eq!(pool.lock_timeout(), None);

        pool.lock_timeout_ms = 2500;
        assert_eq!(pool.lock_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(pool.acquire_timeout(), Duration::from_secs(30));
    }
}
