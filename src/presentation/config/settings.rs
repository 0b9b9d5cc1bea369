use std::time::Duration;

/// Runtime configuration, read from the environment at startup. Missing
/// credentials are a fatal configuration error, never retried.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub transcription: TranscriptionSettings,
    pub completion: CompletionSettings,
    pub quota: QuotaSettings,
    pub recent_feeds_cap: usize,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub base_url: String,
    pub api_key: String,
    pub poll_interval: Duration,
    pub poll_deadline: Duration,
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub transcript_max_chars: usize,
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct QuotaSettings {
    pub daily_ceiling: u32,
    pub owner_subject: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerSettings {
                host: var_or("SERVER_HOST", "0.0.0.0"),
                port: parsed_var_or("SERVER_PORT", 5000)?,
            },
            database: DatabaseSettings {
                url: var_or("DATABASE_URL", "sqlite:podscan.db"),
                max_connections: parsed_var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            transcription: TranscriptionSettings {
                base_url: var_or("SPEECH_API_BASE_URL", "https://api.assemblyai.com"),
                api_key: required_var("SPEECH_API_KEY")?,
                poll_interval: Duration::from_secs(parsed_var_or("SPEECH_POLL_INTERVAL_SECS", 5)?),
                poll_deadline: Duration::from_secs(parsed_var_or(
                    "SPEECH_POLL_DEADLINE_SECS",
                    600,
                )?),
                cache_ttl: Duration::from_secs(parsed_var_or(
                    "TRANSCRIPT_CACHE_TTL_SECS",
                    1800,
                )?),
            },
            completion: CompletionSettings {
                base_url: var_or("COMPLETION_API_BASE_URL", "https://api.openai.com"),
                api_key: required_var("COMPLETION_API_KEY")?,
                model: var_or("COMPLETION_MODEL", "gpt-4o-mini"),
                max_tokens: parsed_var_or("COMPLETION_MAX_TOKENS", 1024)?,
                transcript_max_chars: parsed_var_or("TRANSCRIPT_MAX_CHARS", 16_000)?,
                cache_ttl: Duration::from_secs(parsed_var_or(
                    "EXTRACTION_CACHE_TTL_SECS",
                    1800,
                )?),
            },
            quota: QuotaSettings {
                daily_ceiling: parsed_var_or("DAILY_QUOTA_CEILING", 5)?,
                owner_subject: std::env::var("OWNER_SUBJECT").ok().filter(|s| !s.is_empty()),
            },
            recent_feeds_cap: parsed_var_or("RECENT_FEEDS_CAP", 10)?,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn parsed_var_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
            name,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}
