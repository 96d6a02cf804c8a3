mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    EngineProviderSetting, EngineSettings, JobStoreProviderSetting, JobStoreSettings,
    LoggingSettings, NotificationSettings, ServerSettings, ServingMode, Settings, SettingsError,
    StorageProviderSetting, StorageSettings, WorkerSettings,
};
