//! Inbound request shapes. Each is validated as a whole before any service
//! logic runs, and every invalid field is reported.

use crate::domain::car::CarType;
use crate::domain::payment::PaymentType;
use crate::domain::{CarId, RentalId};
use crate::error::{Result, ServiceError};
use rust_decimal::Decimal;
use serde::Deserialize;

fn finish(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CarRequest {
    pub model: String,
    pub brand: String,
    pub r#type: CarType,
    pub inventory: i64,
    pub daily_fee: Decimal,
}

impl CarRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.model.trim().is_empty() {
            errors.push("model must not be blank".to_owned());
        }
        if self.brand.trim().is_empty() {
            errors.push("brand must not be blank".to_owned());
        }
        if self.inventory < 0 {
            errors.push("inventory must be greater than or equal to 0".to_owned());
        } else if u32::try_from(self.inventory).is_err() {
            errors.push("inventory is too large".to_owned());
        }
        if self.daily_fee.is_sign_negative() {
            errors.push("daily_fee must be greater than or equal to 0".to_owned());
        }
        finish(errors)
    }

    /// Inventory as stored; call after [`validate`](Self::validate).
    pub fn units(&self) -> Result<u32> {
        u32::try_from(self.inventory)
            .map_err(|_| ServiceError::Validation(vec!["inventory is out of range".to_owned()]))
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct RentalRequest {
    pub car_id: CarId,
    pub days_of_rental: i64,
}

impl RentalRequest {
    pub fn new(car_id: CarId, days_of_rental: i64) -> Self {
        Self {
            car_id,
            days_of_rental,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.car_id == 0 {
            errors.push("car_id must be greater than 0".to_owned());
        }
        if self.days_of_rental <= 0 {
            errors.push("days_of_rental must be greater than 0".to_owned());
        } else if u32::try_from(self.days_of_rental).is_err() {
            errors.push("days_of_rental is too large".to_owned());
        }
        finish(errors)
    }

    pub fn days(&self) -> Result<u32> {
        u32::try_from(self.days_of_rental).map_err(|_| {
            ServiceError::Validation(vec!["days_of_rental is out of range".to_owned()])
        })
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct PaymentRequest {
    pub rental_id: RentalId,
    pub r#type: PaymentType,
}

impl PaymentRequest {
    pub fn new(rental_id: RentalId, r#type: PaymentType) -> Self {
        Self { rental_id, r#type }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.rental_id == 0 {
            errors.push("rental_id must be greater than 0".to_owned());
        }
        finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rental_request_reports_every_field() {
        let err = RentalRequest::new(0, -3).validate().unwrap_err();
        match err {
            ServiceError::Validation(errors) => {
                assert_eq!(
                    errors,
                    vec![
                        "car_id must be greater than 0".to_owned(),
                        "days_of_rental must be greater than 0".to_owned(),
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rental_request_valid() {
        let request = RentalRequest::new(1, 10);
        assert!(request.validate().is_ok());
        assert_eq!(request.days().unwrap(), 10);
    }

    #[test]
    fn test_rental_request_too_long() {
        assert!(RentalRequest::new(1, i64::MAX).validate().is_err());
    }

    #[test]
    fn test_car_request_validation() {
        let request = CarRequest {
            model: " ".into(),
            brand: "VW".into(),
            r#type: CarType::Suv,
            inventory: -1,
            daily_fee: dec!(-5),
        };
        let Err(ServiceError::Validation(errors)) = request.validate() else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("model"));
    }

    #[test]
    fn test_payment_request_deserializes() {
        let request: PaymentRequest =
            serde_json::from_str(r#"{"rental_id": 4, "type": "FINE"}"#).unwrap();
        assert_eq!(request, PaymentRequest::new(4, PaymentType::Fine));
        assert!(request.validate().is_ok());
        assert!(PaymentRequest::new(0, PaymentType::Fine).validate().is_err());
    }
}
