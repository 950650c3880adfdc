use std::env;

use thiserror::Error;

/// Engine configuration, loaded from `EXAMHALL_*` environment variables with
/// documented defaults. Embedders that configure programmatically can start
/// from [`Settings::default`] and adjust fields through the accessors' owning
/// structs before handing the settings to the controller.
#[derive(Debug, Clone)]
pub struct Settings {
    runtime: RuntimeSettings,
    engine: EngineSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Passing-score percentage applied when the exam record carries none.
    pub default_passing_score: u8,
    /// Delay the shell should wait before redirecting away from a blocked
    /// session start.
    pub blocked_redirect_delay_seconds: u64,
    /// Countdown granularity. One timer tick elapses per interval; at the
    /// default of 1000ms a tick is one second of exam time.
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runtime: RuntimeSettings { environment: Environment::Development },
            engine: EngineSettings {
                default_passing_score: 50,
                blocked_redirect_delay_seconds: 5,
                tick_interval_ms: 1000,
            },
            telemetry: TelemetrySettings { log_level: "info".to_string(), json: false },
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = parse_environment(env_optional("EXAMHALL_ENV"));

        let default_passing_score =
            parse_u8("EXAMHALL_DEFAULT_PASSING_SCORE", env_or_default("EXAMHALL_DEFAULT_PASSING_SCORE", "50"))?;
        if default_passing_score > 100 {
            return Err(ConfigError::InvalidValue {
                field: "EXAMHALL_DEFAULT_PASSING_SCORE",
                value: default_passing_score.to_string(),
            });
        }

        let blocked_redirect_delay_seconds = parse_u64(
            "EXAMHALL_BLOCKED_REDIRECT_DELAY_SECONDS",
            env_or_default("EXAMHALL_BLOCKED_REDIRECT_DELAY_SECONDS", "5"),
        )?;

        let tick_interval_ms = parse_u64(
            "EXAMHALL_TICK_INTERVAL_MS",
            env_or_default("EXAMHALL_TICK_INTERVAL_MS", "1000"),
        )?;
        if tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "EXAMHALL_TICK_INTERVAL_MS",
                value: "0".to_string(),
            });
        }

        let log_level = env_or_default("EXAMHALL_LOG_LEVEL", "info");
        let json = env_optional("EXAMHALL_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        Ok(Self {
            runtime: RuntimeSettings { environment },
            engine: EngineSettings {
                default_passing_score,
                blocked_redirect_delay_seconds,
                tick_interval_ms,
            },
            telemetry: TelemetrySettings { log_level, json },
        })
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn engine(&self) -> &EngineSettings {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineSettings {
        &mut self.engine
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u8(field: &'static str, value: String) -> Result<u8, ConfigError> {
    value.parse::<u8>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref() {
        Some("production") => Environment::Production,
        Some("test") => Environment::Test,
        _ => Environment::Development,
    }
}
