use super::parsing::{
    env_number, env_optional, env_or_default, is_supported_jwt_algorithm, parse_bool,
    parse_cors_origins, parse_environment,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, PoolSettings, RuntimeSettings,
    SecuritySettings, ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("ELEVATE_HOST", "0.0.0.0");
        let port = env_or_default("ELEVATE_PORT", "8000");

        let environment =
            parse_environment(env_optional("ELEVATE_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("ELEVATE_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Elevate Progress API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let (secret_key, secret_key_generated) = match env_optional("SECRET_KEY") {
            Some(value) => (value, false),
            None if strict_config => (String::new(), false),
            None => (load_or_create_secret_key(), true),
        };
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = env_number("POSTGRES_PORT", 5432u16)?;
        let postgres_user = env_or_default("POSTGRES_USER", "elevate");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "elevate_db");
        let database_url = env_optional("DATABASE_URL");
        let pool = PoolSettings {
            max_connections: env_number("DB_MAX_CONNECTIONS", 30)?,
            min_connections: env_number("DB_MIN_CONNECTIONS", 1)?,
            acquire_timeout_secs: env_number("DB_ACQUIRE_TIMEOUT_SECS", 30)?,
            lock_timeout_ms: env_number("DB_LOCK_TIMEOUT_MS", 10_000)?,
        };

        let log_level = env_or_default("ELEVATE_LOG_LEVEL", "info");
        let json =
            env_optional("ELEVATE_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings::parse(host, port)?,
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, algorithm, secret_key_generated },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                pool,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server(&self) -> &ServerSettings {
        &self.server
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

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_supported_jwt_algorithm(&self.security.algorithm) {
            return Err(ConfigError::InvalidValue {
                field: "ALGORITHM",
                value: self.security.algorithm.clone(),
            });
        }

        let pool = &self.database.pool;
        if pool.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DB_MAX_CONNECTIONS",
                value: String::from("0"),
            });
        }
        if pool.min_connections > pool.max_connections {
            return Err(ConfigError::InvalidValue {
                field: "DB_MIN_CONNECTIONS",
                value: pool.min_connections.to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.security.secret_key.is_empty() {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        Ok(())
    }
}
