mod settings;

pub use settings::{
    CompletionSettings, ConfigError, DatabaseSettings, QuotaSettings, ServerSettings, Settings,
    TranscriptionSettings,
};
