//! Charge arithmetic for rentals.
//!
//! Everything here is pure: the same rental, fee and type always produce the
//! same amount.

use super::payment::PaymentType;
use super::rental::Rental;
use crate::error::{Result, ServiceError};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Factor applied to the daily fee for every day a car comes back late.
pub const FINE_MULTIPLIER: Decimal = dec!(1.7);

/// Charges are kept to whole cents.
pub const AMOUNT_SCALE: u32 = 2;

/// Amount owed for `rental` under `kind`, rounded up to the next cent.
pub fn calculate(daily_fee: Decimal, rental: &Rental, kind: PaymentType) -> Result<Decimal> {
    let raw = match kind {
        PaymentType::Payment => daily_fee.checked_mul(Decimal::from(rental.planned_days())),
        PaymentType::Fine => {
            let late_days = rental
                .overdue_days()
                .ok_or(ServiceError::NoFineDue(rental.id))?;
            daily_fee
                .checked_mul(Decimal::from(late_days))
                .and_then(|amount| amount.checked_mul(FINE_MULTIPLIER))
        }
    };
    raw.map(round_up).ok_or_else(|| {
        out_of_range(format!(
            "{kind} for rental {} at {daily_fee} a day",
            rental.id
        ))
    })
}

fn out_of_range(what: String) -> ServiceError {
    ServiceError::Validation(vec![format!("amount for {what} is out of range")])
}

/// Ceiling rounding to cents: a partial cent never goes in the customer's favour.
pub fn round_up(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToPositiveInfinity)
}

/// Converts a rounded amount into the processor's minor units.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    use rust_decimal::prelude::ToPrimitive;

    round_up(amount)
        .checked_mul(dec!(100))
        .and_then(|cents| cents.trunc().to_i64())
        .ok_or_else(|| out_of_range(amount.to_string()))
}
