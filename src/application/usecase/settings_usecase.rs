// src/application/usecase/settings_usecase.rs
// Loading, validating and storing register settings

use std::sync::Arc;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::application::dto::ApplicationError;
use crate::domain::model::{Permission, PosSettings, UserRole};
use crate::domain::repository::SettingsRepository;

#[async_trait]
pub trait SettingsUseCase {
    async fn load(&self) -> Result<PosSettings, ApplicationError>;

    /// Validate and store settings on behalf of `role`
    async fn save(&self, role: UserRole, settings: &PosSettings) -> Result<(), ApplicationError>;

    async fn reset(&self, role: UserRole) -> Result<PosSettings, ApplicationError>;
}

pub struct SettingsManager {
    settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>,
}

impl SettingsManager {
    pub fn new(settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>) -> Self {
        Self { settings_repository }
    }

    fn validate(settings: &PosSettings) -> Result<(), ApplicationError> {
        let invalid = |msg: &str| Err(ApplicationError::ParseError(msg.to_string()));

        if !settings.trade_in.multipliers.is_well_formed() {
            return invalid("condition multipliers must be within 0..1 and not increase as condition worsens");
        }
        if settings.general.tax_rate < Decimal::ZERO || settings.general.tax_rate > Decimal::ONE_HUNDRED {
            return invalid("tax rate must be between 0 and 100");
        }
        if settings.general.currency.trim().is_empty() {
            return invalid("currency is required");
        }
        if settings.receipt.receipt_width < 16 {
            return invalid("receipt width must be at least 16 characters");
        }
        if settings.loyalty.max_redemption_percent < Decimal::ZERO
            || settings.loyalty.max_redemption_percent > Decimal::ONE_HUNDRED
        {
            return invalid("maximum redemption must be between 0 and 100 percent");
        }
        if settings.pricing.default_markup_percentage < Decimal::ZERO {
            return invalid("default markup cannot be negative");
        }
        Ok(())
    }

    fn authorize(role: UserRole, settings: &PosSettings) -> Result<(), ApplicationError> {
        settings
            .permissions
            .permissions_for(role)
            .ensure(Permission::Settings)
            .map_err(|e| {
                log::warn!("Settings change refused for {:?}: {}", role, e);
                ApplicationError::from(e)
            })
    }
}

#[async_trait]
impl SettingsUseCase for SettingsManager {
    async fn load(&self) -> Result<PosSettings, ApplicationError> {
        Ok(self.settings_repository.lock().await.load().await?)
    }

    async fn save(&self, role: UserRole, settings: &PosSettings) -> Result<(), ApplicationError> {
        let mut repository = self.settings_repository.lock().await;
        let current = repository.load().await?;
        Self::authorize(role, &current)?;
        Self::validate(settings)?;

        repository.save(settings).await?;
        log::info!("Settings saved");
        Ok(())
    }

    async fn reset(&self, role: UserRole) -> Result<PosSettings, ApplicationError> {
        let mut repository = self.settings_repository.lock().await;
        let current = repository.load().await?;
        Self::authorize(role, &current)?;

        let defaults = repository.reset().await?;
        log::info!("Settings reset to defaults");
        Ok(defaults)
    }
}
