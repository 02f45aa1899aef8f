// src/application/usecase/trade_in_usecase.rs
// Trade-in quotes, transaction lifecycle and contracts

use std::sync::Arc;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::dto::{ApplicationError, ContractFormDto, TradeInPriceDto, TradeInRequestDto};
use crate::domain::errors::DomainError;
use crate::domain::model::{
    ConditionMultipliers, ConditionRating, DamageItem, TradeInCalculation, TradeInContract, TradeInFilters,
    TradeInPrice, TradeInPriceFilters, TradeInStatus, TradeInTransaction,
};
use crate::domain::repository::{SettingsRepository, TradeInPriceCatalog, TradeInRepository};
use crate::domain::service::valuation::{calculate_trade_in_value, with_new_device};
use crate::domain::service::Clock;

#[async_trait]
pub trait TradeInUseCase {
    /// Value a device with the configured multipliers. Nothing is stored.
    async fn quote(&self, request: &TradeInRequestDto) -> Result<TradeInCalculation, ApplicationError>;

    /// Value a catalog device using its own reference price and multipliers
    async fn quote_for_product(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        condition: ConditionRating,
        damage_items: &[DamageItem],
    ) -> Result<TradeInCalculation, ApplicationError>;

    async fn create_transaction(&self, request: &TradeInRequestDto) -> Result<TradeInTransaction, ApplicationError>;

    async fn approve(&self, id: &str) -> Result<TradeInTransaction, ApplicationError>;

    async fn complete(&self, id: &str) -> Result<TradeInTransaction, ApplicationError>;

    async fn cancel(&self, id: &str) -> Result<TradeInTransaction, ApplicationError>;

    async fn create_contract(&self, id: &str, form: &ContractFormDto) -> Result<TradeInContract, ApplicationError>;

    async fn contract(&self, id: &str) -> Result<Option<TradeInContract>, ApplicationError>;

    /// Transactions matching `filters`, newest first
    async fn transactions(&self, filters: &TradeInFilters) -> Result<Vec<TradeInTransaction>, ApplicationError>;

    async fn prices(&self, filters: &TradeInPriceFilters) -> Result<Vec<TradeInPrice>, ApplicationError>;

    async fn create_price(&self, form: &TradeInPriceDto) -> Result<TradeInPrice, ApplicationError>;

    async fn update_price(&self, id: &str, form: &TradeInPriceDto) -> Result<TradeInPrice, ApplicationError>;

    /// Take a price out of use; it stays listed as inactive
    async fn delete_price(&self, id: &str) -> Result<(), ApplicationError>;
}

pub struct TradeInManager {
    trade_in_repository: Arc<Mutex<dyn TradeInRepository + Send + Sync>>,
    price_catalog: Arc<Mutex<dyn TradeInPriceCatalog + Send + Sync>>,
    settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>,
    clock: Arc<dyn Clock>,
}

impl TradeInManager {
    pub fn new(
        trade_in_repository: Arc<Mutex<dyn TradeInRepository + Send + Sync>>,
        price_catalog: Arc<Mutex<dyn TradeInPriceCatalog + Send + Sync>>,
        settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trade_in_repository,
            price_catalog,
            settings_repository,
            clock,
        }
    }

    async fn multipliers(&self) -> Result<ConditionMultipliers, ApplicationError> {
        let settings = self.settings_repository.lock().await.load().await?;
        Ok(settings.trade_in.multipliers)
    }

    async fn calculate(&self, request: &TradeInRequestDto) -> Result<TradeInCalculation, ApplicationError> {
        let condition = request.condition()?;
        let multipliers = self.multipliers().await?;
        let calculation = calculate_trade_in_value(
            request.base_trade_in_price,
            condition,
            &multipliers,
            &request.damage_items,
        );
        Ok(with_new_device(calculation, request.new_device_price))
    }

    async fn price_from_form(&self, id: String, form: &TradeInPriceDto) -> Result<TradeInPrice, ApplicationError> {
        if form.product_id.trim().is_empty() || form.device_name.trim().is_empty() {
            return Err(DomainError::InvalidTradeInPrice("product and device name are required".to_string()).into());
        }
        if form.base_trade_in_price <= Decimal::ZERO {
            return Err(DomainError::InvalidTradeInPrice(format!(
                "base price must be positive, got {}",
                form.base_trade_in_price
            ))
            .into());
        }
        let multipliers = match form.multipliers {
            Some(multipliers) => multipliers,
            None => self.multipliers().await?,
        };
        if !multipliers.is_well_formed() {
            return Err(DomainError::InvalidTradeInPrice(
                "condition multipliers must be within 0..1 and not increase as condition worsens".to_string(),
            )
            .into());
        }

        Ok(TradeInPrice {
            id,
            product_id: form.product_id.trim().to_string(),
            variant_id: form.variant_id.clone(),
            device_name: form.device_name.trim().to_string(),
            device_model: form.device_model.clone(),
            base_trade_in_price: form.base_trade_in_price,
            multipliers,
            is_active: form.is_active,
        })
    }

    async fn move_to(&self, id: &str, next: TradeInStatus) -> Result<TradeInTransaction, ApplicationError> {
        let mut repository = self.trade_in_repository.lock().await;
        let mut transaction = repository.get_transaction(id).await?;

        if let Err(e) = transaction.transition(next, self.clock.now()) {
            log::warn!("Rejected trade-in {} transition: {}", id, e);
            return Err(e.into());
        }

        if let Err(e) = repository.update_transaction(&transaction).await {
            log::error!("Failed to store trade-in {} as {}: {}", id, next, e);
            return Err(e.into());
        }

        log::info!("Trade-in {} is now {}", id, next);
        Ok(transaction)
    }
}

#[async_trait]
impl TradeInUseCase for TradeInManager {
    async fn quote(&self, request: &TradeInRequestDto) -> Result<TradeInCalculation, ApplicationError> {
        self.calculate(request).await
    }

    async fn quote_for_product(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        condition: ConditionRating,
        damage_items: &[DamageItem],
    ) -> Result<TradeInCalculation, ApplicationError> {
        let price = self
            .price_catalog
            .lock()
            .await
            .price_for_product(product_id, variant_id)
            .await?;

        Ok(calculate_trade_in_value(
            price.base_trade_in_price,
            condition,
            &price.multipliers,
            damage_items,
        ))
    }

    async fn create_transaction(&self, request: &TradeInRequestDto) -> Result<TradeInTransaction, ApplicationError> {
        let calculation = self.calculate(request).await?;

        let transaction = TradeInTransaction {
            id: Uuid::new_v4().to_string(),
            customer_id: request.customer_id.clone(),
            device_name: request.device_name.clone(),
            device_model: request.device_model.clone(),
            device_imei: request.device_imei.clone(),
            device_serial_number: request.device_serial_number.clone(),
            calculation,
            new_product_id: request.new_product_id.clone(),
            new_device_price: request.new_device_price,
            needs_repair: request.needs_repair,
            resale_price: request.resale_price,
            staff_notes: request.staff_notes.clone(),
            status: TradeInStatus::Pending,
            created_at: self.clock.now(),
            approved_at: None,
            completed_at: None,
        };

        if let Err(e) = self
            .trade_in_repository
            .lock()
            .await
            .insert_transaction(&transaction)
            .await
        {
            log::error!("Failed to save trade-in for customer {}: {}", request.customer_id, e);
            return Err(e.into());
        }

        log::info!(
            "Created trade-in {} for {} valued at {}",
            transaction.id,
            transaction.device_name,
            transaction.calculation.final_trade_in_value
        );
        Ok(transaction)
    }

    async fn approve(&self, id: &str) -> Result<TradeInTransaction, ApplicationError> {
        self.move_to(id, TradeInStatus::Approved).await
    }

    async fn complete(&self, id: &str) -> Result<TradeInTransaction, ApplicationError> {
        self.move_to(id, TradeInStatus::Completed).await
    }

    async fn cancel(&self, id: &str) -> Result<TradeInTransaction, ApplicationError> {
        self.move_to(id, TradeInStatus::Cancelled).await
    }

    async fn create_contract(&self, id: &str, form: &ContractFormDto) -> Result<TradeInContract, ApplicationError> {
        let settings = self.settings_repository.lock().await.load().await?;
        let mut repository = self.trade_in_repository.lock().await;
        let transaction = repository.get_transaction(id).await?;

        if !matches!(
            transaction.status,
            TradeInStatus::Approved | TradeInStatus::Completed
        ) {
            log::warn!("Contract requested for trade-in {} in status {}", id, transaction.status);
            return Err(DomainError::NotApproved(id.to_string()).into());
        }

        let contract = TradeInContract {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction.id.clone(),
            customer_id: transaction.customer_id.clone(),
            customer_id_number: form.customer_id_number.trim().to_string(),
            customer_id_type: form.customer_id_type.trim().to_string(),
            device_name: transaction.device_name.clone(),
            device_imei: transaction.device_imei.clone(),
            agreed_value: transaction.calculation.final_trade_in_value,
            terms_and_conditions: settings.trade_in.terms_and_conditions.clone(),
            ownership_confirmed: form.ownership_confirmed,
            created_at: self.clock.now(),
        };

        if let Err(e) = repository.insert_contract(&contract).await {
            log::warn!("Contract for trade-in {} not stored: {}", id, e);
            return Err(e.into());
        }
        log::info!("Created contract {} for trade-in {}", contract.id, id);
        Ok(contract)
    }

    async fn contract(&self, id: &str) -> Result<Option<TradeInContract>, ApplicationError> {
        Ok(self
            .trade_in_repository
            .lock()
            .await
            .contract_for_transaction(id)
            .await?)
    }

    async fn transactions(&self, filters: &TradeInFilters) -> Result<Vec<TradeInTransaction>, ApplicationError> {
        Ok(self.trade_in_repository.lock().await.list_transactions(filters).await?)
    }

    async fn prices(&self, filters: &TradeInPriceFilters) -> Result<Vec<TradeInPrice>, ApplicationError> {
        Ok(self.price_catalog.lock().await.list_prices(filters).await?)
    }

    async fn create_price(&self, form: &TradeInPriceDto) -> Result<TradeInPrice, ApplicationError> {
        let price = self.price_from_form(Uuid::new_v4().to_string(), form).await?;
        self.price_catalog.lock().await.insert_price(&price).await?;
        log::info!(
            "Added trade-in price {} for {} at {}",
            price.id,
            price.device_name,
            price.base_trade_in_price
        );
        Ok(price)
    }

    async fn update_price(&self, id: &str, form: &TradeInPriceDto) -> Result<TradeInPrice, ApplicationError> {
        let price = self.price_from_form(id.to_string(), form).await?;
        if let Err(e) = self.price_catalog.lock().await.update_price(&price).await {
            log::error!("Failed to update trade-in price {}: {}", id, e);
            return Err(e.into());
        }
        log::info!("Updated trade-in price {}", id);
        Ok(price)
    }

    async fn delete_price(&self, id: &str) -> Result<(), ApplicationError> {
        self.price_catalog.lock().await.deactivate_price(id).await?;
        log::info!("Deactivated trade-in price {}", id);
        Ok(())
    }
}
