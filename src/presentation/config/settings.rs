use std::path::Path;

use serde::Deserialize;

use super::Environment;

/// Full service configuration, loaded from a TOML file once at startup and
/// validated before anything else is constructed. Secrets may also arrive
/// via `SKALD_DATABASE_URL`, `SKALD_ENGINE_API_KEY`, and
/// `SKALD_WEBHOOK_URL`, which override the file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub job_store: JobStoreSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub mode: ServingMode,
    pub environment: Environment,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            mode: ServingMode::Queued,
            environment: Environment::Local,
        }
    }
}

/// Which of the two near-duplicate HTTP surfaces this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingMode {
    /// `POST /transcribe` blocks for the duration of transcription.
    Direct,
    /// `POST /transcribe` enqueues a job; callers poll `/status` and
    /// `/result`.
    Queued,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub azure_account: Option<String>,
    pub azure_access_key: Option<String>,
    pub azure_container: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProviderSetting::Local,
            local_path: "data".to_string(),
            azure_account: None,
            azure_access_key: None,
            azure_container: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    Azure,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobStoreSettings {
    pub provider: JobStoreProviderSetting,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for JobStoreSettings {
    fn default() -> Self {
        Self {
            provider: JobStoreProviderSetting::Memory,
            database_url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStoreProviderSetting {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub provider: EngineProviderSetting,
    pub model: String,
    pub language: Option<String>,
    pub vad_filter: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            provider: EngineProviderSetting::Local,
            model: "openai/whisper-tiny".to_string(),
            language: Some("en".to_string()),
            vad_filter: true,
            api_key: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineProviderSetting {
    Local,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Upper bound on one engine call; past it the job is failed.
    pub deadline_secs: u64,
    /// Delete the staged upload once the outcome is durably recorded.
    pub delete_staging_after: bool,
    pub queue_capacity: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            deadline_secs: 600,
            delete_staging_after: true,
            queue_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            json: false,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        let path =
            std::env::var("SKALD_CONFIG").unwrap_or_else(|_| "config/skald.toml".to_string());
        Self::from_file(Path::new(&path))
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::Read(format!("{}: {}", path.display(), e)))?;
        let mut settings = Self::from_toml(&contents)?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Self, SettingsError> {
        toml::from_str(raw).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SKALD_DATABASE_URL") {
            self.job_store.database_url = Some(url);
        }
        if let Ok(key) = std::env::var("SKALD_ENGINE_API_KEY") {
            self.engine.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("SKALD_WEBHOOK_URL") {
            self.notifications.webhook_url = Some(url);
        }
    }

    /// Cross-field checks that must hold before anything is constructed.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must be non-zero".into()));
        }
        if self.worker.deadline_secs == 0 {
            return Err(SettingsError::Invalid(
                "worker.deadline_secs must be non-zero".into(),
            ));
        }
        if self.worker.queue_capacity == 0 {
            return Err(SettingsError::Invalid(
                "worker.queue_capacity must be non-zero".into(),
            ));
        }
        if self.job_store.provider == JobStoreProviderSetting::Postgres
            && self.job_store.database_url.is_none()
        {
            return Err(SettingsError::Invalid(
                "job_store.database_url is required for the postgres provider".into(),
            ));
        }
        if self.storage.provider == StorageProviderSetting::Azure {
            for (field, value) in [
                ("storage.azure_account", &self.storage.azure_account),
                ("storage.azure_access_key", &self.storage.azure_access_key),
                ("storage.azure_container", &self.storage.azure_container),
            ] {
                if value.is_none() {
                    return Err(SettingsError::Invalid(format!(
                        "{} is required for the azure provider",
                        field
                    )));
                }
            }
        }
        if self.engine.provider == EngineProviderSetting::Remote
            && self.engine.api_key.is_none()
            && self.engine.base_url.is_none()
        {
            return Err(SettingsError::Invalid(
                "engine.api_key is required when engine.base_url targets the default endpoint"
                    .into(),
            ));
        }
        if self.notifications.enabled && self.notifications.webhook_url.is_none() {
            return Err(SettingsError::Invalid(
                "notifications.webhook_url is required when notifications are enabled".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read config file: {0}")]
    Read(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
