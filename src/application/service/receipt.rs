// src/application/service/receipt.rs
// Receipt preview built from a committed sale and the receipt settings

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::model::{GeneralSettings, ReceiptSettings, Sale};

/// Decimal places shown for a currency
pub fn currency_minor_units(currency: &str) -> u32 {
    match currency.to_uppercase().as_str() {
        "TZS" | "UGX" | "RWF" | "JPY" | "KRW" | "XAF" | "XOF" => 0,
        _ => 2,
    }
}

/// Format an amount as `TZS 1,250,000` / `USD 12.50`
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let places = currency_minor_units(currency);
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.*}", places as usize, rounded.abs());

    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    match fraction {
        Some(f) => format!("{} {}{}.{}", currency, sign, grouped, f),
        None => format!("{} {}{}", currency, sign, grouped),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReceiptLine {
    Centered(String),
    Text(String),
    /// Label on the left, value on the right
    Pair(String, String),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub lines: Vec<ReceiptLine>,
}

impl Receipt {
    pub fn build(sale: &Sale, general: &GeneralSettings, settings: &ReceiptSettings) -> Self {
        let money = |amount: Decimal| format_money(amount, &general.currency);
        let mut lines = Vec::new();

        if settings.show_business_name {
            lines.push(ReceiptLine::Centered(general.business_name.clone()));
        }
        if settings.show_business_address {
            if let Some(address) = &general.business_address {
                lines.push(ReceiptLine::Centered(address.clone()));
            }
        }
        if settings.show_business_phone {
            if let Some(phone) = &general.business_phone {
                lines.push(ReceiptLine::Centered(format!("Tel: {}", phone)));
            }
        }
        lines.push(ReceiptLine::Separator);

        if settings.show_transaction_id {
            lines.push(ReceiptLine::Pair("Receipt".to_string(), sale.receipt_number.clone()));
        }
        if settings.show_date_time {
            lines.push(ReceiptLine::Pair(
                "Date".to_string(),
                sale.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ));
        }
        if settings.show_cashier_name {
            if let Some(cashier) = &sale.cashier_name {
                lines.push(ReceiptLine::Pair("Cashier".to_string(), cashier.clone()));
            }
        }
        if let Some(customer) = &sale.customer {
            if settings.show_customer_name {
                lines.push(ReceiptLine::Pair("Customer".to_string(), customer.name.clone()));
            }
            if settings.show_customer_phone {
                if let Some(phone) = &customer.phone {
                    lines.push(ReceiptLine::Pair("Phone".to_string(), phone.clone()));
                }
            }
        }
        lines.push(ReceiptLine::Separator);

        for item in &sale.items {
            let mut label = if settings.show_product_names {
                item.name.clone()
            } else {
                item.product_id.clone()
            };
            if settings.show_product_skus {
                if let Some(sku) = &item.sku {
                    label = format!("{} [{}]", label, sku);
                }
            }
            lines.push(ReceiptLine::Text(label));

            let detail = match (settings.show_quantities, settings.show_unit_prices) {
                (true, true) => format!("  {} x {}", item.quantity, money(item.unit_price)),
                (true, false) => format!("  x{}", item.quantity),
                (false, true) => format!("  @ {}", money(item.unit_price)),
                (false, false) => String::new(),
            };
            lines.push(ReceiptLine::Pair(detail, money(item.line_total())));
        }
        lines.push(ReceiptLine::Separator);

        let totals = &sale.totals;
        if settings.show_subtotal {
            lines.push(ReceiptLine::Pair("Subtotal".to_string(), money(totals.subtotal)));
        }
        if settings.show_discount_total && totals.discount_amount > Decimal::ZERO {
            lines.push(ReceiptLine::Pair(
                "Discount".to_string(),
                format!("-{}", money(totals.discount_amount)),
            ));
        }
        if settings.show_tax && totals.tax_amount > Decimal::ZERO {
            lines.push(ReceiptLine::Pair(
                format!("Tax ({}%)", totals.tax_rate.normalize()),
                money(totals.tax_amount),
            ));
        }
        if totals.tip_amount > Decimal::ZERO {
            lines.push(ReceiptLine::Pair("Tip".to_string(), money(totals.tip_amount)));
        }
        if let Some(credit) = sale.trade_in_credit.filter(|c| *c > Decimal::ZERO) {
            lines.push(ReceiptLine::Pair("Trade-in credit".to_string(), format!("-{}", money(credit))));
        }
        if totals.adjustments > Decimal::ZERO && sale.trade_in_credit.is_none() {
            lines.push(ReceiptLine::Pair("Credits".to_string(), format!("-{}", money(totals.adjustments))));
        }
        if settings.show_grand_total {
            lines.push(ReceiptLine::Pair("TOTAL".to_string(), money(totals.final_amount)));
        }

        if settings.show_payment_method {
            lines.push(ReceiptLine::Pair("Paid by".to_string(), sale.payment.label()));
            if let Some(reference) = sale.payment.reference() {
                lines.push(ReceiptLine::Pair("Ref".to_string(), reference.to_string()));
            }
            lines.push(ReceiptLine::Pair(
                "Amount paid".to_string(),
                money(sale.confirmation.amount_paid),
            ));
        }
        if settings.show_change_amount && sale.confirmation.change_given > Decimal::ZERO {
            lines.push(ReceiptLine::Pair("Change".to_string(), money(sale.confirmation.change_given)));
        }
        if sale.balance_due() > Decimal::ZERO {
            lines.push(ReceiptLine::Pair("Balance due".to_string(), money(sale.balance_due())));
        }
        if sale.loyalty_points_earned > 0 {
            lines.push(ReceiptLine::Pair(
                "Points earned".to_string(),
                sale.loyalty_points_earned.to_string(),
            ));
        }

        if !settings.footer_message.trim().is_empty() {
            lines.push(ReceiptLine::Separator);
            lines.push(ReceiptLine::Centered(settings.footer_message.clone()));
        }

        Self {
            receipt_number: sale.receipt_number.clone(),
            lines,
        }
    }

    /// Lay the receipt out in a fixed-width column
    pub fn render_text(&self, width: usize) -> String {
        let width = width.max(16);
        let mut out = String::new();

        for line in &self.lines {
            match line {
                ReceiptLine::Separator => out.push_str(&"-".repeat(width)),
                ReceiptLine::Text(text) => out.push_str(text),
                ReceiptLine::Centered(text) => {
                    let len = text.chars().count();
                    let pad = width.saturating_sub(len) / 2;
                    out.push_str(&" ".repeat(pad));
                    out.push_str(text);
                }
                ReceiptLine::Pair(label, value) => {
                    let used = label.chars().count() + value.chars().count();
                    let gap = if used < width { width - used } else { 1 };
                    out.push_str(label);
                    out.push_str(&" ".repeat(gap));
                    out.push_str(value);
                }
            }
            out.push('\n');
        }

        out
    }
}
