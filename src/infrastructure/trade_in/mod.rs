// src/infrastructure/trade_in/mod.rs
// In-memory trade-in store and reference price catalog

use std::collections::HashMap;
use async_trait::async_trait;
use rust_decimal_macros::dec;

use crate::domain::errors::RepositoryError;
use crate::domain::model::{
    ConditionMultipliers, TradeInContract, TradeInFilters, TradeInPrice, TradeInPriceFilters, TradeInTransaction,
};
use crate::domain::repository::{TradeInPriceCatalog, TradeInRepository};

#[derive(Debug, Default)]
pub struct InMemoryTradeInRepository {
    transactions: HashMap<String, TradeInTransaction>,
    // insertion order for listing
    order: Vec<String>,
    contracts: HashMap<String, TradeInContract>,
}

impl InMemoryTradeInRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TradeInRepository for InMemoryTradeInRepository {
    async fn insert_transaction(&mut self, transaction: &TradeInTransaction) -> Result<(), RepositoryError> {
        if self.transactions.contains_key(&transaction.id) {
            return Err(RepositoryError::Storage(format!(
                "Trade-in {} already exists",
                transaction.id
            )));
        }
        self.order.push(transaction.id.clone());
        self.transactions.insert(transaction.id.clone(), transaction.clone());
        Ok(())
    }

    async fn update_transaction(&mut self, transaction: &TradeInTransaction) -> Result<(), RepositoryError> {
        match self.transactions.get_mut(&transaction.id) {
            Some(stored) => {
                *stored = transaction.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("trade-in {}", transaction.id))),
        }
    }

    async fn get_transaction(&self, id: &str) -> Result<TradeInTransaction, RepositoryError> {
        self.transactions
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("trade-in {}", id)))
    }

    async fn list_transactions(&self, filters: &TradeInFilters) -> Result<Vec<TradeInTransaction>, RepositoryError> {
        // later insertions win ties on the timestamp
        let mut matching: Vec<TradeInTransaction> = self
            .order
            .iter()
            .rev()
            .filter_map(|id| self.transactions.get(id))
            .filter(|t| filters.matches(t))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn insert_contract(&mut self, contract: &TradeInContract) -> Result<(), RepositoryError> {
        if !self.transactions.contains_key(&contract.transaction_id) {
            return Err(RepositoryError::NotFound(format!(
                "trade-in {}",
                contract.transaction_id
            )));
        }
        if self.contracts.contains_key(&contract.transaction_id) {
            return Err(RepositoryError::Storage(format!(
                "Trade-in {} already has a contract",
                contract.transaction_id
            )));
        }
        self.contracts
            .insert(contract.transaction_id.clone(), contract.clone());
        Ok(())
    }

    async fn contract_for_transaction(&self, transaction_id: &str) -> Result<Option<TradeInContract>, RepositoryError> {
        Ok(self.contracts.get(transaction_id).cloned())
    }
}

/// Reference prices kept in memory, looked up by product and variant
#[derive(Debug, Clone)]
pub struct InMemoryPriceCatalog {
    prices: Vec<TradeInPrice>,
}

impl InMemoryPriceCatalog {
    /// Catalog seeded with a few common devices
    pub fn new() -> Self {
        let price = |id: &str, product: &str, variant: Option<&str>, name: &str, base| TradeInPrice {
            id: id.to_string(),
            product_id: product.to_string(),
            variant_id: variant.map(str::to_string),
            device_name: name.to_string(),
            device_model: None,
            base_trade_in_price: base,
            multipliers: ConditionMultipliers::default(),
            is_active: true,
        };

        Self {
            prices: vec![
                price("tp-1", "iphone-12", Some("128gb"), "iPhone 12 128GB", dec!(900000)),
                price("tp-2", "iphone-12", Some("64gb"), "iPhone 12 64GB", dec!(780000)),
                price("tp-3", "galaxy-s21", None, "Samsung Galaxy S21", dec!(700000)),
            ],
        }
    }

    pub fn with_prices(prices: Vec<TradeInPrice>) -> Self {
        Self { prices }
    }

    fn position(&self, id: &str) -> Result<usize, RepositoryError> {
        self.prices
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("trade-in price {}", id)))
    }
}

impl Default for InMemoryPriceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeInPriceCatalog for InMemoryPriceCatalog {
    async fn price_for_product(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> Result<TradeInPrice, RepositoryError> {
        self.prices
            .iter()
            .filter(|p| p.is_active && p.product_id == product_id)
            .find(|p| p.variant_id.as_deref() == variant_id)
            .or_else(|| {
                self.prices
                    .iter()
                    .find(|p| p.is_active && p.product_id == product_id && p.variant_id.is_none())
            })
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("trade-in price for {}", product_id)))
    }

    async fn list_prices(&self, filters: &TradeInPriceFilters) -> Result<Vec<TradeInPrice>, RepositoryError> {
        Ok(self
            .prices
            .iter()
            .rev()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect())
    }

    async fn insert_price(&mut self, price: &TradeInPrice) -> Result<(), RepositoryError> {
        if self.prices.iter().any(|p| p.id == price.id) {
            return Err(RepositoryError::Storage(format!("Trade-in price {} already exists", price.id)));
        }
        self.prices.push(price.clone());
        Ok(())
    }

    async fn update_price(&mut self, price: &TradeInPrice) -> Result<(), RepositoryError> {
        let index = self.position(&price.id)?;
        self.prices[index] = price.clone();
        Ok(())
    }

    async fn deactivate_price(&mut self, id: &str) -> Result<(), RepositoryError> {
        let index = self.position(id)?;
        self.prices[index].is_active = false;
        Ok(())
    }
}
