// src/infrastructure/payment/mod.rs
// Local payment processor that settles immediately and keeps a journal

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::errors::RepositoryError;
use crate::domain::model::{PaymentConfirmation, PaymentRequest, Sale};
use crate::domain::repository::PaymentProcessor;

#[derive(Debug, Default)]
pub struct RecordingPaymentProcessor {
    payments: Vec<(PaymentRequest, PaymentConfirmation)>,
    sales: Vec<Sale>,
    fail_next: Option<String>,
    fail_next_record: Option<String>,
}

impl RecordingPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next payment call fail with `reason`
    pub fn fail_next(&mut self, reason: &str) {
        self.fail_next = Some(reason.to_string());
    }

    /// Make the next sale recording fail with `reason`
    pub fn fail_next_record(&mut self, reason: &str) {
        self.fail_next_record = Some(reason.to_string());
    }

    pub fn payments(&self) -> &[(PaymentRequest, PaymentConfirmation)] {
        &self.payments
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }
}

#[async_trait]
impl PaymentProcessor for RecordingPaymentProcessor {
    async fn process_payment(
        &mut self,
        request: &PaymentRequest,
        amount: Decimal,
    ) -> Result<PaymentConfirmation, RepositoryError> {
        if let Some(reason) = self.fail_next.take() {
            log::error!("Payment of {} via {} failed: {}", amount, request.label(), reason);
            return Err(RepositoryError::Unavailable(reason));
        }

        let change_given = match request {
            PaymentRequest::Cash {
                tendered: Some(tendered),
                ..
            } => (*tendered - amount).max(Decimal::ZERO),
            _ => Decimal::ZERO,
        };

        let confirmation = PaymentConfirmation {
            transaction_id: Uuid::new_v4().to_string(),
            amount_paid: amount,
            change_given,
        };
        log::info!(
            "Settled {} via {} ({})",
            amount,
            request.label(),
            confirmation.transaction_id
        );

        self.payments.push((request.clone(), confirmation.clone()));
        Ok(confirmation)
    }

    async fn record_sale(&mut self, sale: &Sale) -> Result<(), RepositoryError> {
        if let Some(reason) = self.fail_next_record.take() {
            return Err(RepositoryError::Storage(reason));
        }
        if self.sales.iter().any(|s| s.id == sale.id) {
            return Err(RepositoryError::Storage(format!("Sale {} already recorded", sale.id)));
        }
        self.sales.push(sale.clone());
        Ok(())
    }
}
