use super::CarId;
use crate::error::{Result, ServiceError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum CarType {
    Sedan,
    Suv,
    Hatchback,
    Universal,
}

/// A car model in the fleet together with its stock of rentable units.
///
/// Cars are never erased: `deleted` hides them from every normal read while
/// historical rentals keep pointing at them.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Car {
    pub id: CarId,
    pub model: String,
    pub brand: String,
    pub r#type: CarType,
    /// Units currently available for rent.
    pub inventory: u32,
    /// Price of one rental day.
    pub daily_fee: Decimal,
    #[serde(default)]
    pub deleted: bool,
}

impl Car {
    pub fn new(
        id: CarId,
        model: impl Into<String>,
        brand: impl Into<String>,
        r#type: CarType,
        inventory: u32,
        daily_fee: Decimal,
    ) -> Self {
        Self {
            id,
            model: model.into(),
            brand: brand.into(),
            r#type,
            inventory,
            daily_fee,
            deleted: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.inventory > 0
    }

    /// Takes one unit out of stock, leaving the car untouched when none remain.
    pub fn take_unit(&mut self) -> Result<()> {
        if !self.is_available() {
            return Err(ServiceError::CarUnavailable(self.id));
        }
        self.inventory -= 1;
        Ok(())
    }

    /// Puts one unit back into stock.
    pub fn return_unit(&mut self) -> Result<()> {
        self.inventory = self
            .inventory
            .checked_add(1)
            .ok_or_else(|| ServiceError::storage(format!("inventory overflow for car {}", self.id)))?;
        Ok(())
    }
}

/// Snapshot of a car as handed out to callers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CarView {
    pub id: CarId,
    pub model: String,
    pub brand: String,
    pub r#type: CarType,
    pub inventory: u32,
    pub daily_fee: Decimal,
}

impl From<&Car> for CarView {
    fn from(car: &Car) -> Self {
        Self {
            id: car.id,
            model: car.model.clone(),
            brand: car.brand.clone(),
            r#type: car.r#type,
            inventory: car.inventory,
            daily_fee: car.daily_fee,
        }
    }
}
