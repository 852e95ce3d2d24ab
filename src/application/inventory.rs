use super::locks::{RowGuard, RowLocks};
use crate::domain::CarId;
use crate::domain::car::Car;
use crate::domain::ports::CarStoreRef;
use crate::error::{Result, ServiceError};
use tracing::debug;

/// A stock mutation: the row as read and the row as written.
#[derive(Debug, Clone, PartialEq)]
pub struct StockChange {
    pub previous: Car,
    pub current: Car,
}

/// Owns the stock count of every car.
///
/// Every mutation is one read plus one write of the car row, performed while
/// the row lock for that car is held. Callers that need the stock change to
/// commit together with their own write take the lock themselves with
/// [`lock`](Self::lock) and use the `*_held` variants.
pub struct InventoryLedger {
    cars: CarStoreRef,
    locks: RowLocks<CarId>,
}

impl InventoryLedger {
    pub fn new(cars: CarStoreRef) -> Self {
        Self {
            cars,
            locks: RowLocks::new(),
        }
    }

    pub(crate) fn cars(&self) -> &CarStoreRef {
        &self.cars
    }

    pub async fn lock(&self, car_id: CarId) -> RowGuard<CarId> {
        self.locks.acquire(car_id).await
    }

    /// Takes one unit of `car_id` out of stock and returns the updated car.
    pub async fn reserve_unit(&self, car_id: CarId) -> Result<Car> {
        let guard = self.lock(car_id).await;
        Ok(self.reserve_held(&guard).await?.current)
    }

    /// Puts one unit of `car_id` back into stock and returns the updated car.
    pub async fn release_unit(&self, car_id: CarId) -> Result<Car> {
        let guard = self.lock(car_id).await;
        Ok(self.release_held(&guard).await?.current)
    }

    pub async fn reserve_held(&self, guard: &RowGuard<CarId>) -> Result<StockChange> {
        let car_id = guard.key();
        let previous = self
            .cars
            .get(car_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("car", car_id))?;
        let mut car = previous.clone();
        car.take_unit()?;
        self.cars.store(car.clone()).await?;
        debug!(car_id, inventory = car.inventory, "Reserved car unit");
        Ok(StockChange {
            previous,
            current: car,
        })
    }

    /// Soft-deleted cars still take their units back: rentals opened before
    /// the deletion must remain returnable.
    pub async fn release_held(&self, guard: &RowGuard<CarId>) -> Result<StockChange> {
        let car_id = guard.key();
        let previous = self
            .cars
            .fetch(car_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("car", car_id))?;
        let mut car = previous.clone();
        car.return_unit()?;
        self.cars.store(car.clone()).await?;
        debug!(car_id, inventory = car.inventory, "Released car unit");
        Ok(StockChange {
            previous,
            current: car,
        })
    }

    /// Writes back a snapshot taken before a failed multi-row operation.
    pub async fn restore_held(&self, guard: &RowGuard<CarId>, snapshot: Car) -> Result<()> {
        debug_assert_eq!(guard.key(), snapshot.id);
        self.cars.store(snapshot).await
    }
}
