// src/application/usecase/payment_flow.rs
// Payment modal state: method, amounts, references and split entries

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::dto::{ApplicationError, PaymentDto};
use crate::domain::errors::PaymentError;
use crate::domain::model::{
    Customer, LoyaltySettings, PaymentConfirmation, PaymentMethodKind, PaymentRequest, SplitPayment,
};
use crate::domain::repository::PaymentProcessor;
use crate::domain::service::payment::{check_split_entry, remaining_amount};
use crate::domain::service::{validate_payment, PaymentContext, PaymentSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentState {
    Idle,
    MethodSelected,
    AmountEntered,
    ReferenceEntered,
    Submitted,
    Success,
}

/// One pass through the payment modal for a single bill.
///
/// A rejected submission or a failed backend call puts the session back in
/// `MethodSelected` with everything entered so far kept, and the reason in
/// `last_error`.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    final_amount: Decimal,
    tolerance: Decimal,
    state: PaymentState,
    draft: PaymentDto,
    splits: Vec<SplitPayment>,
    last_error: Option<String>,
    confirmation: Option<PaymentConfirmation>,
}

impl PaymentSession {
    pub fn new(final_amount: Decimal, tolerance: Decimal) -> Self {
        Self {
            final_amount,
            tolerance,
            state: PaymentState::Idle,
            draft: PaymentDto::default(),
            splits: Vec::new(),
            last_error: None,
            confirmation: None,
        }
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn draft(&self) -> &PaymentDto {
        &self.draft
    }

    pub fn splits(&self) -> &[SplitPayment] {
        &self.splits
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn confirmation(&self) -> Option<&PaymentConfirmation> {
        self.confirmation.as_ref()
    }

    /// What split entries still have to cover
    pub fn remaining(&self) -> Decimal {
        remaining_amount(self.final_amount, &self.splits)
    }

    fn is_split(&self) -> bool {
        self.draft.method.eq_ignore_ascii_case("split")
    }

    fn ensure_editable(&self) -> Result<(), ApplicationError> {
        match self.state {
            PaymentState::Submitted => Err(PaymentError::NotReady("payment already submitted".to_string()).into()),
            PaymentState::Success => Err(PaymentError::NotReady("payment already completed".to_string()).into()),
            _ => Ok(()),
        }
    }

    fn ensure_method(&self) -> Result<(), ApplicationError> {
        self.ensure_editable()?;
        if self.state == PaymentState::Idle {
            return Err(PaymentError::NoMethodSelected.into());
        }
        Ok(())
    }

    /// Pick a method (`cash`, `card`, ..., or `split`). Switching keeps amounts already typed.
    pub fn select_method(&mut self, method: &str) -> Result<(), ApplicationError> {
        self.ensure_editable()?;
        let method = method.trim();
        if !method.eq_ignore_ascii_case("split") {
            method.parse::<PaymentMethodKind>()?;
        }
        self.draft.method = method.to_lowercase();
        self.state = PaymentState::MethodSelected;
        Ok(())
    }

    pub fn enter_amount(&mut self, amount: Decimal) -> Result<(), ApplicationError> {
        self.ensure_method()?;
        self.draft.amount = Some(amount);
        self.state = PaymentState::AmountEntered;
        Ok(())
    }

    pub fn enter_tendered(&mut self, tendered: Decimal) -> Result<(), ApplicationError> {
        self.ensure_method()?;
        self.draft.tendered = Some(tendered);
        self.state = PaymentState::AmountEntered;
        Ok(())
    }

    pub fn enter_reference(&mut self, reference: &str) -> Result<(), ApplicationError> {
        self.ensure_method()?;
        self.draft.reference = Some(reference.to_string());
        self.state = PaymentState::ReferenceEntered;
        Ok(())
    }

    pub fn enter_loyalty_points(&mut self, points: u64) -> Result<(), ApplicationError> {
        self.ensure_method()?;
        self.draft.loyalty_points = Some(points);
        self.state = PaymentState::AmountEntered;
        Ok(())
    }

    pub fn enter_gift_card_code(&mut self, code: &str) -> Result<(), ApplicationError> {
        self.ensure_method()?;
        self.draft.gift_card_code = Some(code.to_string());
        self.state = PaymentState::ReferenceEntered;
        Ok(())
    }

    /// Add a split entry; it must fit in what is left of the bill
    pub fn add_split(
        &mut self,
        method: PaymentMethodKind,
        amount: Decimal,
        reference: Option<&str>,
    ) -> Result<(), ApplicationError> {
        self.ensure_method()?;
        if !self.is_split() {
            return Err(PaymentError::NotReady("split payment is not selected".to_string()).into());
        }
        check_split_entry(self.final_amount, &self.splits, amount)?;
        self.splits.push(SplitPayment::new(method, amount, reference)?);
        self.state = PaymentState::AmountEntered;
        Ok(())
    }

    pub fn remove_split(&mut self, index: usize) -> Option<SplitPayment> {
        if self.ensure_editable().is_err() || index >= self.splits.len() {
            return None;
        }
        Some(self.splits.remove(index))
    }

    /// Build and validate the request. On rejection the session stays where it
    /// was and nothing is sent anywhere.
    pub fn submit(
        &mut self,
        customer: Option<&Customer>,
        loyalty: &LoyaltySettings,
    ) -> Result<PaymentRequest, ApplicationError> {
        self.submit_with_summary(customer, loyalty).map(|(request, _)| request)
    }

    fn submit_with_summary(
        &mut self,
        customer: Option<&Customer>,
        loyalty: &LoyaltySettings,
    ) -> Result<(PaymentRequest, PaymentSummary), ApplicationError> {
        self.ensure_method()?;

        let request = if self.is_split() {
            PaymentRequest::Split {
                payments: self.splits.clone(),
            }
        } else {
            match self.draft.to_request(self.final_amount) {
                Ok(request) => request,
                Err(e) => {
                    self.last_error = Some(e.to_string());
                    return Err(e);
                }
            }
        };

        let context = PaymentContext {
            final_amount: self.final_amount,
            tolerance: self.tolerance,
            customer,
            loyalty,
        };
        let summary = match validate_payment(&request, &context) {
            Ok(summary) => summary,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.last_error = None;
        self.state = PaymentState::Submitted;
        Ok((request, summary))
    }

    fn ensure_submitted(&self) -> Result<(), ApplicationError> {
        if self.state != PaymentState::Submitted {
            return Err(PaymentError::NotReady("nothing was submitted".to_string()).into());
        }
        Ok(())
    }

    /// Backend accepted the submitted payment
    pub fn succeed(&mut self, confirmation: PaymentConfirmation) -> Result<(), ApplicationError> {
        self.ensure_submitted()?;
        self.confirmation = Some(confirmation);
        self.state = PaymentState::Success;
        Ok(())
    }

    /// Backend rejected the submitted payment
    pub fn fail(&mut self, reason: &str) -> Result<(), ApplicationError> {
        self.ensure_submitted()?;
        log::warn!("Payment failed, returning to method selection: {}", reason);
        self.last_error = Some(reason.to_string());
        self.state = PaymentState::MethodSelected;
        Ok(())
    }

    /// Submit, settle through `processor` and record the outcome
    pub async fn process(
        &mut self,
        processor: &mut (dyn PaymentProcessor + Send + Sync),
        customer: Option<&Customer>,
        loyalty: &LoyaltySettings,
    ) -> Result<PaymentConfirmation, ApplicationError> {
        let (request, summary) = self.submit_with_summary(customer, loyalty)?;

        match processor.process_payment(&request, summary.amount_paid).await {
            Ok(confirmation) => {
                self.succeed(confirmation.clone())?;
                Ok(confirmation)
            }
            Err(e) => {
                self.fail(&e.to_string())?;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::domain::service::DEFAULT_SPLIT_TOLERANCE;
    use crate::infrastructure::payment::RecordingPaymentProcessor;

    fn session() -> PaymentSession {
        PaymentSession::new(dec!(100000), DEFAULT_SPLIT_TOLERANCE)
    }

    #[test]
    fn test_cannot_enter_amount_before_method() {
        let mut session = session();
        let err = session.enter_amount(dec!(10)).unwrap_err();
        assert!(matches!(err, ApplicationError::Payment(PaymentError::NoMethodSelected)));
        assert_eq!(session.state(), PaymentState::Idle);
    }

    #[test]
    fn test_card_blocked_until_reference() {
        let loyalty = LoyaltySettings::default();
        let mut session = session();
        session.select_method("card").unwrap();
        session.enter_amount(dec!(100000)).unwrap();

        let err = session.submit(None, &loyalty).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Payment(PaymentError::MissingReference(PaymentMethodKind::Card))
        ));
        assert_eq!(session.state(), PaymentState::AmountEntered);
        assert!(session.last_error().is_some());

        session.enter_reference("AUTH-5531").unwrap();
        assert_eq!(session.state(), PaymentState::ReferenceEntered);
        let request = session.submit(None, &loyalty).unwrap();
        assert_eq!(request.reference().map(|r| r.as_str()), Some("AUTH-5531"));
        assert_eq!(session.state(), PaymentState::Submitted);
        assert!(session.enter_amount(dec!(1)).is_err());
    }

    #[test]
    fn test_split_entries_limited_to_remaining() {
        let loyalty = LoyaltySettings::default();
        let mut session = session();
        session.select_method("split").unwrap();
        session.add_split(PaymentMethodKind::Cash, dec!(60000), None).unwrap();
        assert_eq!(session.remaining(), dec!(40000));

        let err = session
            .add_split(PaymentMethodKind::MobileMoney, dec!(40001), Some("MM-1"))
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Payment(PaymentError::AmountOutOfRange { remaining }) if remaining == dec!(40000)
        ));

        session
            .add_split(PaymentMethodKind::MobileMoney, dec!(39999), Some("MM-1"))
            .unwrap();
        assert!(session.submit(None, &loyalty).is_err());

        session.remove_split(1);
        session
            .add_split(PaymentMethodKind::MobileMoney, dec!(40000), Some("MM-1"))
            .unwrap();
        assert!(session.submit(None, &loyalty).is_ok());
    }

    #[test]
    fn test_split_entry_without_reference() {
        let mut session = session();
        session.select_method("split").unwrap();
        let err = session
            .add_split(PaymentMethodKind::BankTransfer, dec!(5000), Some(" "))
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Payment(PaymentError::MissingReference(PaymentMethodKind::BankTransfer))
        ));
        assert!(session.splits().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_returns_to_method_selected() {
        let loyalty = LoyaltySettings::default();
        let mut processor = RecordingPaymentProcessor::new();
        processor.fail_next("network down");

        let mut session = session();
        session.select_method("mobile_money").unwrap();
        session.enter_reference("MP240510.1130.A1").unwrap();

        let err = session.process(&mut processor, None, &loyalty).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Repository(_)));
        assert_eq!(session.state(), PaymentState::MethodSelected);
        assert_eq!(session.draft().reference.as_deref(), Some("MP240510.1130.A1"));
        assert!(session.last_error().unwrap().contains("network down"));

        let confirmation = session.process(&mut processor, None, &loyalty).await.unwrap();
        assert_eq!(confirmation.amount_paid, dec!(100000));
        assert_eq!(session.state(), PaymentState::Success);
        assert_eq!(processor.payments().len(), 1);
    }

    #[tokio::test]
    async fn test_cash_change_reported() {
        let loyalty = LoyaltySettings::default();
        let mut processor = RecordingPaymentProcessor::new();
        let mut session = session();
        session.select_method("cash").unwrap();
        session.enter_tendered(dec!(120000)).unwrap();

        let confirmation = session.process(&mut processor, None, &loyalty).await.unwrap();
        assert_eq!(confirmation.change_given, dec!(20000));
    }

    #[tokio::test]
    async fn test_zero_bill_goes_through() {
        let loyalty = LoyaltySettings::default();
        let mut processor = RecordingPaymentProcessor::new();
        let mut session = PaymentSession::new(Decimal::ZERO, DEFAULT_SPLIT_TOLERANCE);
        session.select_method("cash").unwrap();

        let confirmation = session.process(&mut processor, None, &loyalty).await.unwrap();
        assert_eq!(confirmation.amount_paid, Decimal::ZERO);
        assert_eq!(session.state(), PaymentState::Success);

        let mut split = PaymentSession::new(Decimal::ZERO, DEFAULT_SPLIT_TOLERANCE);
        split.select_method("split").unwrap();
        assert!(split.submit(None, &loyalty).is_ok());
    }

    #[test]
    fn test_split_gift_card_entry_needs_code() {
        let mut session = session();
        session.select_method("split").unwrap();
        let err = session
            .add_split(PaymentMethodKind::GiftCard, dec!(5000), None)
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Payment(PaymentError::MissingGiftCardCode)));

        session
            .add_split(PaymentMethodKind::GiftCard, dec!(5000), Some("GC-88"))
            .unwrap();
        assert_eq!(session.splits()[0].code.as_deref(), Some("GC-88"));
    }
}
