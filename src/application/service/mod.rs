// src/application/service/mod.rs
// Application services

pub mod notification;
pub mod receipt;

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::dto::ApplicationError;
use crate::domain::model::Sale;
use crate::domain::repository::SettingsRepository;

pub use notification::{render_template, sale_values, Channel, OutgoingMessage};
pub use receipt::{currency_minor_units, format_money, Receipt, ReceiptLine};

/// Documents produced after a sale is committed
#[async_trait]
pub trait SaleDocumentService {
    /// Receipt laid out with the current receipt settings
    async fn receipt(&self, sale: &Sale) -> Result<Receipt, ApplicationError>;

    /// Receipt rendered at the configured width
    async fn receipt_text(&self, sale: &Sale) -> Result<String, ApplicationError>;

    /// Customer messages that should be sent automatically
    async fn notifications(&self, sale: &Sale) -> Result<Vec<OutgoingMessage>, ApplicationError>;
}

pub struct SaleDocumentServiceImpl {
    settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>,
}

impl SaleDocumentServiceImpl {
    pub fn new(settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>) -> Self {
        Self { settings_repository }
    }
}

#[async_trait]
impl SaleDocumentService for SaleDocumentServiceImpl {
    async fn receipt(&self, sale: &Sale) -> Result<Receipt, ApplicationError> {
        let settings = self.settings_repository.lock().await.load().await?;
        Ok(Receipt::build(sale, &settings.general, &settings.receipt))
    }

    async fn receipt_text(&self, sale: &Sale) -> Result<String, ApplicationError> {
        let settings = self.settings_repository.lock().await.load().await?;
        let receipt = Receipt::build(sale, &settings.general, &settings.receipt);
        Ok(receipt.render_text(settings.receipt.receipt_width))
    }

    async fn notifications(&self, sale: &Sale) -> Result<Vec<OutgoingMessage>, ApplicationError> {
        let settings = self.settings_repository.lock().await.load().await?;
        let messages = settings.notifications.payment_messages(sale, &settings.general);
        log::debug!(
            "{} notification(s) queued for receipt {}",
            messages.len(),
            sale.receipt_number
        );
        Ok(messages)
    }
}
