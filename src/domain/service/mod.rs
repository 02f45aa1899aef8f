// src/domain/service/mod.rs
// Domain services: pure calculators plus the clock seam

pub mod loyalty;
pub mod payment;
pub mod pricing;
pub mod totals;
pub mod valuation;

use chrono::{DateTime, Local, NaiveTime, Utc};

pub use payment::{validate_payment, validate_split, PaymentContext, PaymentSummary, DEFAULT_SPLIT_TOLERANCE};
pub use pricing::{best_dynamic_discount, markup_percentage, selling_price_from_markup, AppliedPreset};
pub use totals::{calculate_totals, TotalsAdjustments};
pub use valuation::{calculate_customer_payment, calculate_trade_in_value};

/// Source of the current time for timestamps and time-based pricing
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Wall-clock time at the register
    fn local_time(&self) -> NaiveTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock pinned to a single instant
pub struct FixedClock {
    pub at: DateTime<Utc>,
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }

    fn local_time(&self) -> NaiveTime {
        self.at.time()
    }
}
