// src/application/usecase/checkout_usecase.rs
// Checkout: cart totals, payment validation, settlement and receipt

use std::sync::Arc;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::dto::{ApplicationError, CheckoutRequestDto};
use crate::application::service::{OutgoingMessage, Receipt, SaleDocumentService};
use crate::domain::errors::{DomainError, RepositoryError};
use crate::domain::model::{
    CartItem, CartTotals, Customer, Discount, PaymentMethodKind, PaymentRequest, Permission,
    PermissionSet, PosSettings, Sale, UserRole,
};
use crate::domain::repository::{CustomerRepository, PaymentProcessor, SettingsRepository};
use crate::domain::service::loyalty;
use crate::domain::service::pricing::best_dynamic_discount;
use crate::domain::service::{
    calculate_totals, validate_payment, Clock, PaymentContext, PaymentSummary, TotalsAdjustments,
};

/// Everything the register shows once a sale is through
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub sale: Sale,
    pub receipt: Receipt,
    pub receipt_text: String,
    pub notifications: Vec<OutgoingMessage>,
    /// False when the payment went through but the backend did not store the
    /// sale; it has to be reconciled, not charged again
    pub recorded: bool,
}

/// Totals with the discount that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    pub discount: Option<Discount>,
    pub totals: CartTotals,
}

#[async_trait]
pub trait CheckoutUseCase {
    /// Price the cart without taking payment
    async fn price(&self, request: &CheckoutRequestDto) -> Result<PricedCart, ApplicationError>;

    async fn checkout(&self, request: &CheckoutRequestDto) -> Result<CheckoutOutcome, ApplicationError>;
}

pub struct CheckoutManager {
    payment_processor: Arc<Mutex<dyn PaymentProcessor + Send + Sync>>,
    customer_repository: Arc<Mutex<dyn CustomerRepository + Send + Sync>>,
    settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>,
    documents: Arc<Mutex<dyn SaleDocumentService + Send + Sync>>,
    clock: Arc<dyn Clock>,
    split_tolerance: Decimal,
}

impl CheckoutManager {
    pub fn new(
        payment_processor: Arc<Mutex<dyn PaymentProcessor + Send + Sync>>,
        customer_repository: Arc<Mutex<dyn CustomerRepository + Send + Sync>>,
        settings_repository: Arc<Mutex<dyn SettingsRepository + Send + Sync>>,
        documents: Arc<Mutex<dyn SaleDocumentService + Send + Sync>>,
        clock: Arc<dyn Clock>,
        split_tolerance: Decimal,
    ) -> Self {
        Self {
            payment_processor,
            customer_repository,
            settings_repository,
            documents,
            clock,
            split_tolerance,
        }
    }

    fn permissions(settings: &PosSettings, request: &CheckoutRequestDto) -> Result<PermissionSet, ApplicationError> {
        let role = match &request.cashier_role {
            Some(raw) => raw.parse::<UserRole>()?,
            None => settings.permissions.default_role,
        };
        Ok(settings.permissions.permissions_for(role))
    }

    fn check_items(items: &[CartItem]) -> Result<(), ApplicationError> {
        if items.is_empty() {
            return Err(DomainError::EmptyCart.into());
        }
        if let Some(item) = items.iter().find(|i| i.quantity == 0 || i.unit_price < Decimal::ZERO) {
            return Err(DomainError::InvalidQuantity(item.name.clone()).into());
        }
        Ok(())
    }

    /// Fresh loyalty balance from the customer store; walk-in customers that
    /// are not on file are used as given.
    async fn resolve_customer(&self, customer: Option<&Customer>) -> Result<Option<Customer>, ApplicationError> {
        let Some(customer) = customer else {
            return Ok(None);
        };

        match self.customer_repository.lock().await.get_customer(&customer.id).await {
            Ok(stored) => Ok(Some(stored)),
            Err(RepositoryError::NotFound(_)) => Ok(Some(customer.clone())),
            Err(e) => Err(e.into()),
        }
    }

    fn price_cart(
        &self,
        settings: &PosSettings,
        permissions: &PermissionSet,
        request: &CheckoutRequestDto,
        customer: Option<&Customer>,
    ) -> Result<PricedCart, ApplicationError> {
        Self::check_items(&request.items)?;

        // A manual discount replaces any preset
        let discount = match &request.discount {
            Some(dto) => {
                let discount = dto.to_discount()?;
                let subtotal = crate::domain::service::totals::subtotal(&request.items);
                let percent = match discount {
                    Discount::Percentage(p) => p,
                    Discount::Fixed(_) if subtotal.is_zero() => Decimal::ZERO,
                    Discount::Fixed(v) => v / subtotal * Decimal::ONE_HUNDRED,
                };
                if let Err(e) = permissions.ensure_discount(percent) {
                    log::warn!("Discount {} rejected: {}", discount, e);
                    return Err(e.into());
                }
                Some(discount)
            }
            None => best_dynamic_discount(
                &settings.pricing,
                &request.items,
                customer,
                self.clock.local_time(),
            )
            .map(|preset| {
                log::info!("Applying {:?} pricing preset of {}%", preset.kind, preset.percent);
                preset.as_discount()
            }),
        };

        let adjustments = TotalsAdjustments {
            tip: request.tip.unwrap_or(Decimal::ZERO),
            credits: request.trade_in_credit.unwrap_or(Decimal::ZERO),
        };
        let totals = calculate_totals(&request.items, discount.as_ref(), &settings.general, adjustments)?;

        Ok(PricedCart { discount, totals })
    }

    /// Points earned on the part of the payment not settled with points,
    /// and points spent
    fn loyalty_movement(payment: &PaymentRequest, summary: &PaymentSummary, settings: &PosSettings) -> (u64, u64) {
        let cash_value = match payment {
            PaymentRequest::LoyaltyPoints { .. } => Decimal::ZERO,
            PaymentRequest::Split { payments } => payments
                .iter()
                .filter(|p| p.method != PaymentMethodKind::LoyaltyPoints)
                .map(|p| p.amount)
                .sum(),
            _ => summary.amount_paid,
        };
        (
            loyalty::points_earned(cash_value, &settings.loyalty),
            summary.points_redeemed,
        )
    }
}

#[async_trait]
impl CheckoutUseCase for CheckoutManager {
    async fn price(&self, request: &CheckoutRequestDto) -> Result<PricedCart, ApplicationError> {
        let settings = self.settings_repository.lock().await.load().await?;
        let permissions = Self::permissions(&settings, request)?;
        let customer = self.resolve_customer(request.customer.as_ref()).await?;
        self.price_cart(&settings, &permissions, request, customer.as_ref())
    }

    async fn checkout(&self, request: &CheckoutRequestDto) -> Result<CheckoutOutcome, ApplicationError> {
        let settings = self.settings_repository.lock().await.load().await?;

        let permissions = Self::permissions(&settings, request)?;
        permissions.ensure(Permission::PosAccess)?;

        let customer = self.resolve_customer(request.customer.as_ref()).await?;
        let priced = self.price_cart(&settings, &permissions, request, customer.as_ref())?;
        let final_amount = priced.totals.final_amount;

        let payment = request.payment.to_request(final_amount)?;
        let context = PaymentContext {
            final_amount,
            tolerance: self.split_tolerance,
            customer: customer.as_ref(),
            loyalty: &settings.loyalty,
        };
        let summary = match validate_payment(&payment, &context) {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!("Payment rejected before submission: {}", e);
                return Err(e.into());
            }
        };

        let mut processor = self.payment_processor.lock().await;
        let confirmation = match processor.process_payment(&payment, summary.amount_paid).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                log::error!("Payment backend failed for {}: {}", payment.label(), e);
                return Err(e.into());
            }
        };

        let (earned, spent) = Self::loyalty_movement(&payment, &summary, &settings);
        let sale_id = Uuid::new_v4();
        let created_at = self.clock.now();
        let mut sale = Sale {
            id: sale_id.to_string(),
            receipt_number: format!(
                "INV-{}-{}",
                created_at.format("%Y%m%d"),
                &sale_id.simple().to_string()[..8].to_uppercase()
            ),
            items: request.items.clone(),
            discount: priced.discount,
            totals: priced.totals,
            payment,
            confirmation,
            customer,
            cashier_name: request.cashier_name.clone(),
            trade_in_credit: request.trade_in_credit,
            loyalty_points_earned: earned,
            created_at,
        };

        // the customer has paid; a storage failure must not turn into a retry
        let recorded = match processor.record_sale(&sale).await {
            Ok(()) => true,
            Err(e) => {
                log::error!(
                    "Sale {} settled as {} but not recorded: {}",
                    sale.receipt_number,
                    sale.confirmation.transaction_id,
                    e
                );
                false
            }
        };
        drop(processor);

        if let Some(customer) = sale.customer.as_mut() {
            let delta = earned as i64 - spent as i64;
            if delta != 0 {
                match self.customer_repository.lock().await.adjust_points(&customer.id, delta).await {
                    Ok(updated) => *customer = updated,
                    // the sale stands; points can be reconciled later
                    Err(e) => log::warn!("Loyalty update failed for {}: {}", customer.id, e),
                }
            }
        }

        let documents = self.documents.lock().await;
        let receipt = documents.receipt(&sale).await?;
        let receipt_text = documents.receipt_text(&sale).await?;
        let notifications = documents.notifications(&sale).await?;

        log::info!(
            "Sale {} completed: total {} paid {} change {}",
            sale.receipt_number,
            sale.totals.final_amount,
            sale.confirmation.amount_paid,
            sale.confirmation.change_given
        );

        Ok(CheckoutOutcome {
            sale,
            receipt,
            receipt_text,
            notifications,
            recorded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use crate::application::dto::{DiscountDto, PaymentDto, SplitPaymentDto};
    use crate::application::service::SaleDocumentServiceImpl;
    use crate::domain::errors::{PaymentError, PermissionError};
    use crate::domain::service::FixedClock;
    use crate::domain::service::DEFAULT_SPLIT_TOLERANCE;
    use crate::infrastructure::customer::InMemoryCustomerRepository;
    use crate::infrastructure::payment::RecordingPaymentProcessor;
    use crate::infrastructure::settings::InMemorySettingsRepository;

    struct Fixture {
        manager: CheckoutManager,
        processor: Arc<Mutex<RecordingPaymentProcessor>>,
        customers: Arc<Mutex<InMemoryCustomerRepository>>,
    }

    fn fixture(settings: PosSettings) -> Fixture {
        let processor = Arc::new(Mutex::new(RecordingPaymentProcessor::new()));
        let customers = Arc::new(Mutex::new(InMemoryCustomerRepository::new()));
        let settings: Arc<Mutex<dyn SettingsRepository + Send + Sync>> =
            Arc::new(Mutex::new(InMemorySettingsRepository::new(settings)));
        let documents = Arc::new(Mutex::new(SaleDocumentServiceImpl::new(settings.clone())));
        let clock = FixedClock {
            at: Utc.with_ymd_and_hms(2024, 5, 10, 11, 30, 0).unwrap(),
        };

        let manager = CheckoutManager::new(
            processor.clone(),
            customers.clone(),
            settings,
            documents,
            Arc::new(clock),
            DEFAULT_SPLIT_TOLERANCE,
        );
        Fixture {
            manager,
            processor,
            customers,
        }
    }

    fn request(payment: PaymentDto) -> CheckoutRequestDto {
        CheckoutRequestDto {
            items: vec![
                CartItem::new("p1", "Phone case", 2, dec!(15000)),
                CartItem::new("p2", "Charger", 1, dec!(20000)),
            ],
            discount: None,
            tip: None,
            customer: None,
            cashier_name: Some("Amina".to_string()),
            cashier_role: None,
            trade_in_credit: None,
            payment,
        }
    }

    fn cash(tendered: Decimal) -> PaymentDto {
        PaymentDto {
            method: "cash".to_string(),
            tendered: Some(tendered),
            ..PaymentDto::default()
        }
    }

    #[tokio::test]
    async fn test_cash_checkout_with_change() {
        let fx = fixture(PosSettings::default());
        let outcome = fx.manager.checkout(&request(cash(dec!(60000)))).await.unwrap();

        assert_eq!(outcome.sale.totals.final_amount, dec!(50000));
        assert_eq!(outcome.sale.confirmation.change_given, dec!(10000));
        assert!(outcome.receipt_text.contains("TZS 50,000"));
        assert!(outcome.sale.receipt_number.starts_with("INV-20240510-"));
        assert_eq!(fx.processor.lock().await.sales().len(), 1);
    }

    #[tokio::test]
    async fn test_tax_applied_when_enabled() {
        let mut settings = PosSettings::default();
        settings.general.enable_tax = true;
        let fx = fixture(settings);

        let priced = fx.manager.price(&request(cash(dec!(0)))).await.unwrap();
        assert_eq!(priced.totals.tax_amount, dec!(9000));
        assert_eq!(priced.totals.final_amount, dec!(59000));
    }

    #[tokio::test]
    async fn test_cashier_cannot_discount() {
        let fx = fixture(PosSettings::default());
        let mut req = request(cash(dec!(50000)));
        req.discount = Some(DiscountDto {
            discount_type: "percentage".to_string(),
            value: dec!(10),
        });

        let err = fx.manager.checkout(&req).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Permission(PermissionError::Denied(Permission::Discounts))
        ));

        req.cashier_role = Some("manager".to_string());
        req.payment = cash(dec!(45000));
        let outcome = fx.manager.checkout(&req).await.unwrap();
        assert_eq!(outcome.sale.totals.final_amount, dec!(45000));
    }

    #[tokio::test]
    async fn test_split_mismatch_commits_nothing() {
        let fx = fixture(PosSettings::default());
        let payment = PaymentDto {
            method: "split".to_string(),
            split_payments: vec![
                SplitPaymentDto {
                    method: "cash".to_string(),
                    amount: dec!(30000),
                    reference: None,
                },
                SplitPaymentDto {
                    method: "card".to_string(),
                    amount: dec!(19999),
                    reference: Some("AUTH-1".to_string()),
                },
            ],
            ..PaymentDto::default()
        };

        let err = fx.manager.checkout(&request(payment)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Payment(PaymentError::SplitMismatch { .. })));
        assert!(fx.processor.lock().await.payments().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_nothing_recorded() {
        let fx = fixture(PosSettings::default());
        fx.processor.lock().await.fail_next("gateway timeout");

        let err = fx.manager.checkout(&request(cash(dec!(50000)))).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Repository(_)));
        assert!(fx.processor.lock().await.sales().is_empty());

        // retry with the same request goes through
        assert!(fx.manager.checkout(&request(cash(dec!(50000)))).await.is_ok());
    }

    #[tokio::test]
    async fn test_loyalty_points_earned_and_redeemed() {
        let fx = fixture(PosSettings::default());
        fx.customers
            .lock()
            .await
            .insert(Customer::new("c-9", "Neema").with_points(2000));

        let mut req = request(cash(dec!(50000)));
        req.customer = Some(Customer::new("c-9", "Neema"));
        let outcome = fx.manager.checkout(&req).await.unwrap();
        assert_eq!(outcome.sale.loyalty_points_earned, 50000);
        assert_eq!(outcome.sale.customer.unwrap().loyalty_points, 52000);

        req.payment = PaymentDto {
            method: "loyalty_points".to_string(),
            loyalty_points: Some(1000),
            ..PaymentDto::default()
        };
        let outcome = fx.manager.checkout(&req).await.unwrap();
        assert_eq!(outcome.sale.confirmation.amount_paid, dec!(10));
        assert_eq!(outcome.sale.loyalty_points_earned, 0);
        assert_eq!(outcome.sale.customer.unwrap().loyalty_points, 51000);
    }

    #[tokio::test]
    async fn test_trade_in_credit_reduces_amount_due() {
        let fx = fixture(PosSettings::default());
        let mut req = request(cash(dec!(20000)));
        req.trade_in_credit = Some(dec!(30000));

        let outcome = fx.manager.checkout(&req).await.unwrap();
        assert_eq!(outcome.sale.totals.final_amount, dec!(20000));
        assert!(outcome.receipt_text.contains("Trade-in credit"));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let fx = fixture(PosSettings::default());
        let mut req = request(cash(dec!(1)));
        req.items.clear();
        let err = fx.manager.checkout(&req).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(DomainError::EmptyCart)));
    }

    fn split(entries: Vec<SplitPaymentDto>) -> PaymentDto {
        PaymentDto {
            method: "split".to_string(),
            split_payments: entries,
            ..PaymentDto::default()
        }
    }

    fn entry(method: &str, amount: Decimal, reference: Option<&str>) -> SplitPaymentDto {
        SplitPaymentDto {
            method: method.to_string(),
            amount,
            reference: reference.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_loyalty_split_needs_points_on_file() {
        let fx = fixture(PosSettings::default());
        fx.customers.lock().await.insert(Customer::new("c-0", "Zawadi"));

        let mut req = request(split(vec![entry("loyalty_points", dec!(50000), None)]));
        req.customer = Some(Customer::new("c-0", "Zawadi"));

        let err = fx.manager.checkout(&req).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Payment(PaymentError::InsufficientLoyaltyPoints { available: 0, .. })
        ));
        assert!(fx.processor.lock().await.payments().is_empty());
    }

    #[tokio::test]
    async fn test_loyalty_split_deducts_points() {
        let fx = fixture(PosSettings::default());
        fx.customers
            .lock()
            .await
            .insert(Customer::new("c-5", "Imani").with_points(3000));

        // 10 currency worth of points at 0.01 per point, the rest in cash
        let mut req = request(split(vec![
            entry("loyalty_points", dec!(10), None),
            entry("cash", dec!(49990), None),
        ]));
        req.customer = Some(Customer::new("c-5", "Imani"));

        let outcome = fx.manager.checkout(&req).await.unwrap();
        assert_eq!(outcome.sale.loyalty_points_earned, 49990);
        assert_eq!(outcome.sale.customer.unwrap().loyalty_points, 3000 - 1000 + 49990);
    }

    #[tokio::test]
    async fn test_gift_card_split_without_code_rejected() {
        let fx = fixture(PosSettings::default());
        let err = fx
            .manager
            .checkout(&request(split(vec![entry("gift_card", dec!(50000), None)])))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Payment(PaymentError::MissingGiftCardCode)));

        let outcome = fx
            .manager
            .checkout(&request(split(vec![entry("gift_card", dec!(50000), Some("GC-1020"))])))
            .await
            .unwrap();
        assert_eq!(outcome.sale.confirmation.amount_paid, dec!(50000));
    }

    #[tokio::test]
    async fn test_trade_in_credit_above_bill_settles_with_nothing_owed() {
        let fx = fixture(PosSettings::default());
        let mut req = request(PaymentDto {
            method: "cash".to_string(),
            ..PaymentDto::default()
        });
        req.trade_in_credit = Some(dec!(70000));

        let outcome = fx.manager.checkout(&req).await.unwrap();
        assert_eq!(outcome.sale.totals.final_amount, Decimal::ZERO);
        assert_eq!(outcome.sale.confirmation.amount_paid, Decimal::ZERO);
        assert_eq!(outcome.sale.balance_due(), Decimal::ZERO);
        assert!(outcome.recorded);
    }

    #[tokio::test]
    async fn test_sale_storage_failure_after_payment_keeps_the_sale() {
        let fx = fixture(PosSettings::default());
        fx.processor.lock().await.fail_next_record("disk full");

        let outcome = fx.manager.checkout(&request(cash(dec!(50000)))).await.unwrap();
        assert!(!outcome.recorded);
        assert_eq!(outcome.sale.confirmation.amount_paid, dec!(50000));

        let processor = fx.processor.lock().await;
        assert_eq!(processor.payments().len(), 1);
        assert!(processor.sales().is_empty());
    }
}
