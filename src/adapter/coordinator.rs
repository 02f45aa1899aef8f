// src/adapter/coordinator.rs
// Register coordinator: wires stores and use cases for one register

use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::dto::{ApplicationError, CheckoutRequestDto, RegisterRequestDto, TradeInRequestDto};
use crate::application::service::{format_money, SaleDocumentServiceImpl};
use crate::application::usecase::{
    CheckoutManager, CheckoutOutcome, CheckoutUseCase, SettingsManager, SettingsUseCase, TradeInManager,
    TradeInUseCase,
};
use crate::config::Config;
use crate::domain::model::{Customer, TradeInCalculation};
use crate::domain::repository::{
    CustomerRepository, PaymentProcessor, SettingsRepository, TradeInPriceCatalog, TradeInRepository,
};
use crate::domain::service::{Clock, SystemClock};
use crate::infrastructure::{
    InMemoryCustomerRepository, InMemoryPriceCatalog, InMemorySettingsRepository,
    InMemoryTradeInRepository, JsonFileSettingsRepository, RecordingPaymentProcessor,
};

pub struct PosCoordinator {
    checkout: Arc<Mutex<dyn CheckoutUseCase + Send + Sync>>,
    trade_in: Arc<Mutex<dyn TradeInUseCase + Send + Sync>>,
    settings: Arc<Mutex<dyn SettingsUseCase + Send + Sync>>,
    customer_store: Arc<Mutex<InMemoryCustomerRepository>>,
}

impl PosCoordinator {
    /// Build a register from configuration. With a settings path the file is
    /// seeded from the configuration the first time.
    pub async fn from_config(config: &Config) -> Result<Self, ApplicationError> {
        let settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>> =
            match &config.pos.settings_path {
                Some(path) => {
                    let mut repository = JsonFileSettingsRepository::new(path);
                    if !Path::new(path).exists() {
                        log::info!("Creating settings file at {}", path);
                        repository.save(&config.initial_settings()).await?;
                    }
                    Arc::new(Mutex::new(repository))
                }
                None => Arc::new(Mutex::new(InMemorySettingsRepository::new(
                    config.initial_settings(),
                ))),
            };

        Ok(Self::new(
            settings_repository,
            Arc::new(Mutex::new(InMemoryTradeInRepository::new())),
            Arc::new(Mutex::new(InMemoryPriceCatalog::new())),
            Arc::new(Mutex::new(RecordingPaymentProcessor::new())),
            Arc::new(Mutex::new(InMemoryCustomerRepository::new())),
            Arc::new(SystemClock),
            config,
        ))
    }

    pub fn new(
        settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>,
        trade_in_repository: Arc<Mutex<dyn TradeInRepository + Send + Sync>>,
        price_catalog: Arc<Mutex<dyn TradeInPriceCatalog + Send + Sync>>,
        payment_processor: Arc<Mutex<dyn PaymentProcessor + Send + Sync>>,
        customer_store: Arc<Mutex<InMemoryCustomerRepository>>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let customer_repository: Arc<Mutex<dyn CustomerRepository + Send + Sync>> = customer_store.clone();

        let documents = Arc::new(Mutex::new(SaleDocumentServiceImpl::new(
            settings_repository.clone(),
        )));

        let checkout = Arc::new(Mutex::new(CheckoutManager::new(
            payment_processor,
            customer_repository,
            settings_repository.clone(),
            documents,
            clock.clone(),
            config.pos.split_tolerance,
        )));

        let trade_in = Arc::new(Mutex::new(TradeInManager::new(
            trade_in_repository,
            price_catalog,
            settings_repository.clone(),
            clock,
        )));

        let settings = Arc::new(Mutex::new(SettingsManager::new(settings_repository)));

        Self {
            checkout,
            trade_in,
            settings,
            customer_store,
        }
    }

    pub async fn register_customer(&self, customer: Customer) {
        log::debug!("Registering customer {}", customer.id);
        self.customer_store.lock().await.insert(customer);
    }

    pub async fn checkout(&self, request: &CheckoutRequestDto) -> Result<CheckoutOutcome, ApplicationError> {
        self.checkout.lock().await.checkout(request).await
    }

    pub async fn quote_trade_in(&self, request: &TradeInRequestDto) -> Result<TradeInCalculation, ApplicationError> {
        self.trade_in.lock().await.quote(request).await
    }

    pub fn trade_in(&self) -> Arc<Mutex<dyn TradeInUseCase + Send + Sync>> {
        self.trade_in.clone()
    }

    pub fn settings(&self) -> Arc<Mutex<dyn SettingsUseCase + Send + Sync>> {
        self.settings.clone()
    }

    /// Run a request and return the text to show the operator
    pub async fn handle(&self, request: &RegisterRequestDto) -> Result<String, ApplicationError> {
        match request {
            RegisterRequestDto::Checkout(checkout) => {
                if let Some(customer) = &checkout.customer {
                    self.register_customer(customer.clone()).await;
                }
                let outcome = self.checkout(checkout).await?;
                for message in &outcome.notifications {
                    log::info!("{:?} to {}: {}", message.channel, message.recipient, message.body);
                }
                Ok(outcome.receipt_text)
            }
            RegisterRequestDto::TradeIn(trade_in) => {
                let quote = self.quote_trade_in(trade_in).await?;
                let currency = self.settings.lock().await.load().await?.general.currency;
                Ok(render_quote(trade_in, &quote, &currency))
            }
        }
    }
}

fn render_quote(request: &TradeInRequestDto, quote: &TradeInCalculation, currency: &str) -> String {
    let money = |amount| format_money(amount, currency);
    let mut lines = vec![
        format!("Trade-in quote: {}", request.device_name),
        format!("Base price:        {}", money(quote.base_price)),
        format!(
            "Condition ({}):  x{}",
            quote.condition_rating,
            quote.condition_multiplier.normalize()
        ),
        format!("Adjusted price:    {}", money(quote.condition_adjusted_price)),
    ];
    for item in &quote.damage_deductions {
        lines.push(format!(
            "  - {}: {}",
            item.description.as_deref().unwrap_or("damage"),
            money(item.deduction())
        ));
    }
    lines.push(format!("Damage deductions: {}", money(quote.total_damage_deductions)));
    lines.push(format!("Trade-in value:    {}", money(quote.final_trade_in_value)));
    if let Some(payment) = quote.customer_payment_amount {
        lines.push(format!("Customer pays:     {}", money(payment)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::parser::parse_register_request;

    #[tokio::test]
    async fn test_handle_trade_in_quote() {
        let coordinator = PosCoordinator::from_config(&Config::default()).await.unwrap();
        let request = parse_register_request(
            r#"{"customer_id": "c1", "device_name": "iPhone 11",
                "base_trade_in_price": "600000", "condition_rating": "fair",
                "damage_items": [{"price": "20000", "description": "battery"}, {"description": "no price"}],
                "new_device_price": "1200000"}"#,
        )
        .unwrap();

        let text = coordinator.handle(&request).await.unwrap();
        assert!(text.contains("Adjusted price:    TZS 420,000"));
        assert!(text.contains("Trade-in value:    TZS 400,000"));
        assert!(text.contains("Customer pays:     TZS 800,000"));
    }
}
