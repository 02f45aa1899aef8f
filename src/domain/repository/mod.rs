// src/domain/repository/mod.rs
// Repository interfaces for the backend collaborators

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::errors::RepositoryError;
use crate::domain::model::{
    Customer, PaymentConfirmation, PaymentRequest, PosSettings, Sale, TradeInContract, TradeInFilters,
    TradeInPrice, TradeInPriceFilters, TradeInTransaction,
};

/// Persistent store for register settings
#[async_trait]
pub trait SettingsRepository {
    async fn load(&self) -> Result<PosSettings, RepositoryError>;
    async fn save(&mut self, settings: &PosSettings) -> Result<(), RepositoryError>;
    /// Restore defaults and return them
    async fn reset(&mut self) -> Result<PosSettings, RepositoryError>;
}

/// Trade-in transactions and contracts
#[async_trait]
pub trait TradeInRepository {
    async fn insert_transaction(&mut self, transaction: &TradeInTransaction) -> Result<(), RepositoryError>;
    async fn update_transaction(&mut self, transaction: &TradeInTransaction) -> Result<(), RepositoryError>;
    async fn get_transaction(&self, id: &str) -> Result<TradeInTransaction, RepositoryError>;
    /// Matching transactions, newest first
    async fn list_transactions(&self, filters: &TradeInFilters) -> Result<Vec<TradeInTransaction>, RepositoryError>;
    /// Fails when the transaction already has a contract
    async fn insert_contract(&mut self, contract: &TradeInContract) -> Result<(), RepositoryError>;
    async fn contract_for_transaction(&self, transaction_id: &str) -> Result<Option<TradeInContract>, RepositoryError>;
}

/// Reference prices for trade-in devices
#[async_trait]
pub trait TradeInPriceCatalog {
    /// Active price for a product, falling back to the product-wide entry
    async fn price_for_product(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> Result<TradeInPrice, RepositoryError>;
    async fn list_prices(&self, filters: &TradeInPriceFilters) -> Result<Vec<TradeInPrice>, RepositoryError>;
    async fn insert_price(&mut self, price: &TradeInPrice) -> Result<(), RepositoryError>;
    async fn update_price(&mut self, price: &TradeInPrice) -> Result<(), RepositoryError>;
    /// Soft delete: the entry stays listed as inactive
    async fn deactivate_price(&mut self, id: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CustomerRepository {
    async fn get_customer(&self, id: &str) -> Result<Customer, RepositoryError>;
    /// Apply a signed change to a customer's loyalty balance
    async fn adjust_points(&mut self, id: &str, delta: i64) -> Result<Customer, RepositoryError>;
}

/// Backend that settles payments and records sales
#[async_trait]
pub trait PaymentProcessor {
    /// Settle `amount` of the bill with the given request
    async fn process_payment(
        &mut self,
        request: &PaymentRequest,
        amount: Decimal,
    ) -> Result<PaymentConfirmation, RepositoryError>;

    async fn record_sale(&mut self, sale: &Sale) -> Result<(), RepositoryError>;
}
