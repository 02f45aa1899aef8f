// src/application/service/notification.rs
use std::collections::HashMap;

use super::receipt::format_money;
use crate::domain::model::{GeneralSettings, NotificationSettings, Sale};

/// Substitute `{key}` placeholders. Unknown keys and unmatched braces are kept as written.
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match values.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Values available to every sale notification
pub fn sale_values(sale: &Sale, general: &GeneralSettings) -> HashMap<&'static str, String> {
    let money = |amount| format_money(amount, &general.currency);
    let mut values = HashMap::new();
    values.insert("total", money(sale.totals.final_amount));
    values.insert("paid", money(sale.confirmation.amount_paid));
    values.insert("balance", money(sale.balance_due()));
    values.insert("change", money(sale.confirmation.change_given));
    values.insert("invoice_no", sale.receipt_number.clone());
    values.insert("business_name", general.business_name.clone());
    values.insert(
        "business_phone",
        general.business_phone.clone().unwrap_or_default(),
    );
    values.insert(
        "customer_name",
        sale.customer
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Customer".to_string()),
    );
    values.insert("date", sale.created_at.format("%Y-%m-%d").to_string());
    values.insert("items", sale.item_count().to_string());
    values
}

/// A message ready to hand to a delivery channel
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Sms,
    WhatsApp,
    Email,
}

impl NotificationSettings {
    pub fn sms_message(&self, sale: &Sale, general: &GeneralSettings) -> String {
        render_template(&self.sms_template, &sale_values(sale, general))
    }

    pub fn whatsapp_message(&self, sale: &Sale, general: &GeneralSettings) -> String {
        render_template(&self.whatsapp_message, &sale_values(sale, general))
    }

    /// Subject and body
    pub fn email_message(&self, sale: &Sale, general: &GeneralSettings) -> (String, String) {
        let values = sale_values(sale, general);
        (
            render_template(&self.email_subject, &values),
            render_template(&self.email_template, &values),
        )
    }

    /// Messages that go out automatically once a sale is paid
    pub fn payment_messages(&self, sale: &Sale, general: &GeneralSettings) -> Vec<OutgoingMessage> {
        let mut messages = Vec::new();
        if !self.notify_on_payment {
            return messages;
        }
        let Some(customer) = &sale.customer else {
            return messages;
        };

        if let Some(phone) = &customer.phone {
            if self.sms_enabled && self.sms_auto_send {
                messages.push(OutgoingMessage {
                    channel: Channel::Sms,
                    recipient: phone.clone(),
                    subject: None,
                    body: self.sms_message(sale, general),
                });
            }
            if self.whatsapp_enabled && self.whatsapp_auto_send {
                messages.push(OutgoingMessage {
                    channel: Channel::WhatsApp,
                    recipient: phone.clone(),
                    subject: None,
                    body: self.whatsapp_message(sale, general),
                });
            }
        }
        if let Some(email) = &customer.email {
            if self.email_enabled && self.email_auto_send {
                let (subject, body) = self.email_message(sale, general);
                messages.push(OutgoingMessage {
                    channel: Channel::Email,
                    recipient: email.clone(),
                    subject: Some(subject),
                    body,
                });
            }
        }

        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template_substitutes_known_keys() {
        let mut values = HashMap::new();
        values.insert("total", "TZS 45,000".to_string());
        values.insert("invoice_no", "INV-7".to_string());

        let text = render_template("Total: {total}. Ref: {invoice_no}", &values);
        assert_eq!(text, "Total: TZS 45,000. Ref: INV-7");
    }

    #[test]
    fn test_sms_sent_only_when_auto_send_enabled() {
        use crate::domain::model::{CartItem, CartTotals, Customer, PaymentConfirmation, PaymentRequest};
        use chrono::Utc;
        use rust_decimal_macros::dec;

        let sale = Sale {
            id: "s-2".to_string(),
            receipt_number: "INV-9".to_string(),
            items: vec![CartItem::new("p1", "Earphones", 1, dec!(25000))],
            discount: None,
            totals: CartTotals {
                subtotal: dec!(25000),
                taxable_amount: dec!(25000),
                final_amount: dec!(25000),
                ..CartTotals::default()
            },
            payment: PaymentRequest::Cash {
                amount: dec!(20000),
                tendered: None,
            },
            confirmation: PaymentConfirmation {
                transaction_id: "t-2".to_string(),
                amount_paid: dec!(20000),
                change_given: dec!(0),
            },
            customer: Some(Customer::new("c-3", "Halima").with_phone("+255755123456")),
            cashier_name: None,
            trade_in_credit: None,
            loyalty_points_earned: 0,
            created_at: Utc::now(),
        };
        let general = GeneralSettings::default();
        let mut settings = NotificationSettings::default();
        assert!(settings.payment_messages(&sale, &general).is_empty());

        settings.sms_auto_send = true;
        let messages = settings.payment_messages(&sale, &general);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].channel, Channel::Sms);
        assert_eq!(messages[0].recipient, "+255755123456");
        assert_eq!(
            messages[0].body,
            "Thank you! Total: TZS 25,000. Balance: TZS 5,000. Ref: INV-9"
        );
    }

    #[test]
    fn test_render_template_keeps_unknown_placeholders() {
        let values = HashMap::new();
        assert_eq!(render_template("Hi {customer_name}!", &values), "Hi {customer_name}!");
        assert_eq!(render_template("open { brace", &values), "open { brace");
        assert_eq!(render_template("", &values), "");
    }
}
