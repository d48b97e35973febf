mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AppSettings, DatabaseSettings, LoggingSettings, MediaSettings, PipelineSettings,
    ProviderSettings, ServerSettings, Settings, SttSettings,
};
