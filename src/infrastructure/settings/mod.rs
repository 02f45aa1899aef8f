// src/infrastructure/settings/mod.rs
// Settings stores: in memory and a JSON file on disk

use std::path::{Path, PathBuf};
use async_trait::async_trait;

use crate::domain::errors::RepositoryError;
use crate::domain::model::PosSettings;
use crate::domain::repository::SettingsRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsRepository {
    settings: PosSettings,
}

impl InMemorySettingsRepository {
    pub fn new(settings: PosSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load(&self) -> Result<PosSettings, RepositoryError> {
        Ok(self.settings.clone())
    }

    async fn save(&mut self, settings: &PosSettings) -> Result<(), RepositoryError> {
        self.settings = settings.clone();
        Ok(())
    }

    async fn reset(&mut self) -> Result<PosSettings, RepositoryError> {
        self.settings = PosSettings::default();
        Ok(self.settings.clone())
    }
}

/// Settings kept as pretty-printed JSON. A missing file reads as defaults.
pub struct JsonFileSettingsRepository {
    path: PathBuf,
}

impl JsonFileSettingsRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, settings: &PosSettings) -> Result<(), RepositoryError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| RepositoryError::Storage(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| RepositoryError::Storage(format!("{}: {}", parent.display(), e)))?;
            }
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| RepositoryError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl SettingsRepository for JsonFileSettingsRepository {
    async fn load(&self) -> Result<PosSettings, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", self.path.display());
                return Ok(PosSettings::default());
            }
            Err(e) => {
                return Err(RepositoryError::Unavailable(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            RepositoryError::Storage(format!("Invalid settings in {}: {}", self.path.display(), e))
        })
    }

    async fn save(&mut self, settings: &PosSettings) -> Result<(), RepositoryError> {
        self.write(settings).await?;
        log::debug!("Settings written to {}", self.path.display());
        Ok(())
    }

    async fn reset(&mut self) -> Result<PosSettings, RepositoryError> {
        let defaults = PosSettings::default();
        self.write(&defaults).await?;
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pos_core_{}_{}", name, uuid::Uuid::new_v4()))
            .join("settings.json")
    }

    #[tokio::test]
    async fn test_missing_file_reads_defaults() {
        let repository = JsonFileSettingsRepository::new(temp_path("missing"));
        assert_eq!(repository.load().await.unwrap(), PosSettings::default());
    }

    #[tokio::test]
    async fn test_save_then_load_from_file() {
        let path = temp_path("save");
        let mut repository = JsonFileSettingsRepository::new(&path);

        let mut settings = PosSettings::default();
        settings.general.currency = "KES".to_string();
        settings.general.enable_tax = true;
        settings.general.tax_rate = dec!(16);
        settings.receipt.footer_message = "Karibu tena".to_string();
        repository.save(&settings).await.unwrap();

        let reopened = JsonFileSettingsRepository::new(&path);
        assert_eq!(reopened.load().await.unwrap(), settings);

        let mut reopened = reopened;
        assert_eq!(reopened.reset().await.unwrap(), PosSettings::default());
        assert_eq!(repository.load().await.unwrap(), PosSettings::default());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let path = temp_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"general": {"business_name": "Duka"}}"#).unwrap();

        let settings = JsonFileSettingsRepository::new(&path).load().await.unwrap();
        assert_eq!(settings.general.business_name, "Duka");
        assert_eq!(settings.general.currency, "TZS");
        assert_eq!(settings.loyalty.min_redemption_points, 100);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileSettingsRepository::new(&path).load().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Storage(_)));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
