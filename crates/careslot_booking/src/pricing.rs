// --- File: crates/careslot_booking/src/pricing.rs ---
//! Price of a reservation. Amounts stay unrounded until serialized.

use serde::{Serialize, Serializer};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Price {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// `subtotal = hourly_rate * range_count`, `tax = subtotal * tax_rate`.
pub fn price(range_count: usize, hourly_rate: f64, tax_rate: f64) -> Price {
    let subtotal = hourly_rate * range_count as f64;
    let tax = subtotal * tax_rate;
    Price {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

/// Rounds to cents, half away from zero.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn serialize_cents<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_cents(*amount))
}

/// The breakdown returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PriceBreakdown {
    pub hours: u32,
    #[serde(serialize_with = "serialize_cents")]
    pub hourly_rate: f64,
    #[serde(serialize_with = "serialize_cents")]
    pub subtotal: f64,
    pub tax_rate: f64,
    #[serde(serialize_with = "serialize_cents")]
    pub tax: f64,
    #[serde(serialize_with = "serialize_cents")]
    pub total: f64,
    pub currency: String,
}

/// Rate, tax and currency applied to every reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSettings {
    pub hourly_rate: f64,
    pub tax_rate: f64,
    pub currency: String,
}

impl PriceSettings {
    pub fn breakdown(&self, range_count: usize) -> PriceBreakdown {
        let Price {
            subtotal,
            tax,
            total,
        } = price(range_count, self.hourly_rate, self.tax_rate);
        PriceBreakdown {
            hours: range_count as u32,
            hourly_rate: self.hourly_rate,
            subtotal,
            tax_rate: self.tax_rate,
            tax,
            total,
            currency: self.currency.clone(),
        }
    }
}
