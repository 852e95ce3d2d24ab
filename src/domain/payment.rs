use super::{PaymentId, RentalId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    /// Regular rental fee.
    Payment,
    /// Penalty for a late return.
    Fine,
}

impl PaymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentType::Payment => "PAYMENT",
            PaymentType::Fine => "FINE",
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            PaymentType::Payment => 0,
            PaymentType::Fine => 1,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => f.write_str("PENDING"),
            PaymentStatus::Paid => f.write_str("PAID"),
        }
    }
}

/// A charge for one rental, backed by a checkout session at the processor.
///
/// At most one payment exists per `(rental_id, type)`. The status only ever
/// moves from `Pending` to `Paid`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: PaymentId,
    pub status: PaymentStatus,
    pub r#type: PaymentType,
    pub rental_id: RentalId,
    pub amount_to_pay: Decimal,
    pub session_id: String,
    pub session_url: String,
}

impl Payment {
    pub fn pending(
        id: PaymentId,
        r#type: PaymentType,
        rental_id: RentalId,
        amount_to_pay: Decimal,
        session_id: String,
        session_url: String,
    ) -> Self {
        Self {
            id,
            status: PaymentStatus::Pending,
            r#type,
            rental_id,
            amount_to_pay,
            session_id,
            session_url,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Flips the payment to paid. Returns false when it already was.
    pub fn mark_paid(&mut self) -> bool {
        if self.is_paid() {
            return false;
        }
        self.status = PaymentStatus::Paid;
        true
    }
}

/// Message returned when a customer backs out of the checkout page.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PaymentPaused {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_payment() -> Payment {
        Payment::pending(
            1,
            PaymentType::Payment,
            5,
            dec!(122.97),
            "cs_test_1".into(),
            "https://checkout.test/cs_test_1".into(),
        )
    }

    #[test]
    fn test_mark_paid_is_monotonic() {
        let mut payment = sample_payment();
        assert_eq!(payment.status, PaymentStatus::Pending);

        assert!(payment.mark_paid());
        assert!(payment.is_paid());
        assert!(!payment.mark_paid());
        assert_eq!(payment.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_payment_serialization_uses_type_field() {
        let json = serde_json::to_value(sample_payment()).unwrap();
        assert_eq!(json["type"], "PAYMENT");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["amount_to_pay"], "122.97");
    }

    #[test]
    fn test_type_parses_from_uppercase() {
        let kind: PaymentType = serde_json::from_str("\"FINE\"").unwrap();
        assert_eq!(kind, PaymentType::Fine);
        assert_eq!(kind.to_string(), "FINE");
    }
}
