// src/domain/service/payment.rs
// Payment validation against the final amount of a sale

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::errors::{PaymentError, PaymentResult};
use crate::domain::model::{Customer, LoyaltySettings, PaymentMethodKind, PaymentRequest, SplitPayment};
use crate::domain::service::loyalty;

/// Allowed gap between split entries and the final amount
pub const DEFAULT_SPLIT_TOLERANCE: Decimal = dec!(0.01);

/// What a validated payment settles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSummary {
    pub amount_paid: Decimal,
    pub change: Decimal,
    /// Loyalty points taken from the customer's balance
    pub points_redeemed: u64,
}

impl PaymentSummary {
    fn paid(amount_paid: Decimal) -> Self {
        Self {
            amount_paid,
            change: Decimal::ZERO,
            points_redeemed: 0,
        }
    }
}

/// Everything payment validation needs besides the request itself
#[derive(Debug, Clone, Copy)]
pub struct PaymentContext<'a> {
    pub final_amount: Decimal,
    pub tolerance: Decimal,
    pub customer: Option<&'a Customer>,
    pub loyalty: &'a LoyaltySettings,
}

pub fn split_total(payments: &[SplitPayment]) -> Decimal {
    payments.iter().map(|p| p.amount).sum()
}

/// Amount still to be covered by further split entries
pub fn remaining_amount(final_amount: Decimal, payments: &[SplitPayment]) -> Decimal {
    final_amount - split_total(payments)
}

/// A new split entry must be positive and fit in what is left
pub fn check_split_entry(
    final_amount: Decimal,
    existing: &[SplitPayment],
    amount: Decimal,
) -> PaymentResult<()> {
    let remaining = remaining_amount(final_amount, existing);
    if amount <= Decimal::ZERO || amount > remaining {
        return Err(PaymentError::AmountOutOfRange { remaining });
    }
    Ok(())
}

/// Split entries must add up to the final amount within `tolerance`, and
/// each entry must carry what its method needs. A bill of zero needs no entries.
pub fn validate_split(
    final_amount: Decimal,
    payments: &[SplitPayment],
    tolerance: Decimal,
) -> PaymentResult<()> {
    if payments.is_empty() {
        if final_amount.is_zero() {
            return Ok(());
        }
        return Err(PaymentError::EmptySplit);
    }

    let actual = split_total(payments);
    if (actual - final_amount).abs() > tolerance {
        return Err(PaymentError::SplitMismatch {
            expected: final_amount,
            actual,
        });
    }

    for payment in payments {
        if payment.amount <= Decimal::ZERO {
            return Err(PaymentError::AmountOutOfRange {
                remaining: final_amount,
            });
        }
        payment.check_details()?;
    }

    Ok(())
}

/// Points behind the loyalty entries of a split, checked against the
/// customer's balance and the redemption limits
fn split_loyalty_points(payments: &[SplitPayment], ctx: &PaymentContext) -> PaymentResult<u64> {
    let value: Decimal = payments
        .iter()
        .filter(|p| p.method == PaymentMethodKind::LoyaltyPoints)
        .map(|p| p.amount)
        .sum();
    if value.is_zero() {
        return Ok(0);
    }

    let points = loyalty::points_for_value(value, ctx.loyalty)?;
    let balance = ctx.customer.map(|c| c.loyalty_points).unwrap_or(0);
    loyalty::validate_redemption(points, balance, ctx.final_amount, ctx.loyalty)?;
    Ok(points)
}

/// Change owed for a cash payment
pub fn cash_change(amount_due: Decimal, tendered: Decimal) -> PaymentResult<Decimal> {
    if tendered < amount_due {
        return Err(PaymentError::InsufficientCash {
            due: amount_due,
            tendered,
        });
    }
    Ok(tendered - amount_due)
}

/// Amount must be positive and not above the bill; a bill of zero is settled with zero
fn check_single_amount(amount: Decimal, ctx: &PaymentContext) -> PaymentResult<()> {
    let settles_nothing = amount.is_zero() && ctx.final_amount.is_zero();
    if (amount <= Decimal::ZERO && !settles_nothing) || amount > ctx.final_amount + ctx.tolerance {
        return Err(PaymentError::AmountOutOfRange {
            remaining: ctx.final_amount,
        });
    }
    Ok(())
}

/// Validate a payment request before anything is sent to the backend.
///
/// Single payments may cover part of the bill; the rest stays as balance due.
pub fn validate_payment(request: &PaymentRequest, ctx: &PaymentContext) -> PaymentResult<PaymentSummary> {
    match request {
        PaymentRequest::Cash { amount, tendered } => {
            check_single_amount(*amount, ctx)?;
            let change = match tendered {
                Some(tendered) => cash_change(*amount, *tendered)?,
                None => Decimal::ZERO,
            };
            Ok(PaymentSummary {
                change,
                ..PaymentSummary::paid(*amount)
            })
        }
        PaymentRequest::Card { amount, .. }
        | PaymentRequest::MobileMoney { amount, .. }
        | PaymentRequest::BankTransfer { amount, .. } => {
            check_single_amount(*amount, ctx)?;
            Ok(PaymentSummary::paid(*amount))
        }
        PaymentRequest::LoyaltyPoints { points } => {
            let balance = ctx.customer.map(|c| c.loyalty_points).unwrap_or(0);
            let value = loyalty::validate_redemption(*points, balance, ctx.final_amount, ctx.loyalty)?;
            Ok(PaymentSummary {
                points_redeemed: *points,
                ..PaymentSummary::paid(value)
            })
        }
        PaymentRequest::GiftCard { amount, code } => {
            if code.trim().is_empty() {
                return Err(PaymentError::MissingGiftCardCode);
            }
            check_single_amount(*amount, ctx)?;
            Ok(PaymentSummary::paid(*amount))
        }
        PaymentRequest::Split { payments } => {
            validate_split(ctx.final_amount, payments, ctx.tolerance)?;
            let points_redeemed = split_loyalty_points(payments, ctx)?;
            Ok(PaymentSummary {
                points_redeemed,
                ..PaymentSummary::paid(split_total(payments))
            })
        }
    }
}
