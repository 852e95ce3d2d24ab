use super::access::ensure_manager;
use super::inventory::InventoryLedger;
use super::requests::CarRequest;
use crate::domain::CarId;
use crate::domain::car::{Car, CarView};
use crate::domain::user::User;
use crate::error::{Result, ServiceError};
use std::sync::Arc;
use tracing::info;

/// Manager-facing administration of the car fleet, plus the public catalogue.
///
/// Writes go through the ledger's row locks so they never race a reservation.
pub struct FleetService {
    ledger: Arc<InventoryLedger>,
}

impl FleetService {
    pub fn new(ledger: Arc<InventoryLedger>) -> Self {
        Self { ledger }
    }

    pub async fn add_car(&self, actor: &User, request: CarRequest) -> Result<CarView> {
        request.validate()?;
        ensure_manager(actor, "add cars")?;

        let car = self.insert(request).await?;
        info!(car_id = car.id, "Car added to fleet");
        Ok(car)
    }

    /// Loads a fleet row from an import without an acting user.
    pub async fn import_car(&self, request: CarRequest) -> Result<CarView> {
        request.validate()?;
        self.insert(request).await
    }

    async fn insert(&self, request: CarRequest) -> Result<CarView> {
        let units = request.units()?;
        let cars = self.ledger.cars();
        let id = cars.next_id().await?;
        let car = Car::new(
            id,
            request.model,
            request.brand,
            request.r#type,
            units,
            request.daily_fee,
        );
        cars.store(car.clone()).await?;
        Ok(CarView::from(&car))
    }

    pub async fn get_car(&self, car_id: CarId) -> Result<CarView> {
        self.ledger
            .cars()
            .get(car_id)
            .await?
            .map(|car| CarView::from(&car))
            .ok_or_else(|| ServiceError::not_found("car", car_id))
    }

    pub async fn list_cars(&self) -> Result<Vec<CarView>> {
        let cars = self.ledger.cars().get_all().await?;
        Ok(cars.iter().map(CarView::from).collect())
    }

    /// Replaces every descriptive field of a car, stock count included.
    pub async fn update_car(
        &self,
        actor: &User,
        car_id: CarId,
        request: CarRequest,
    ) -> Result<CarView> {
        request.validate()?;
        ensure_manager(actor, "update cars")?;

        let _guard = self.ledger.lock(car_id).await;
        let cars = self.ledger.cars();
        let mut car = cars
            .get(car_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("car", car_id))?;
        car.inventory = request.units()?;
        car.model = request.model;
        car.brand = request.brand;
        car.r#type = request.r#type;
        car.daily_fee = request.daily_fee;
        cars.store(car.clone()).await?;
        info!(car_id, "Car updated");
        Ok(CarView::from(&car))
    }

    /// Soft delete: the row stays for historical rentals but leaves every listing.
    pub async fn delete_car(&self, actor: &User, car_id: CarId) -> Result<()> {
        ensure_manager(actor, "delete cars")?;

        let _guard = self.ledger.lock(car_id).await;
        let cars = self.ledger.cars();
        let mut car = cars
            .get(car_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("car", car_id))?;
        car.deleted = true;
        cars.store(car).await?;
        info!(car_id, "Car soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::car::CarType;
    use crate::infrastructure::in_memory::InMemoryCarStore;
    use rust_decimal_macros::dec;

    fn fleet() -> FleetService {
        FleetService::new(Arc::new(InventoryLedger::new(Arc::new(
            InMemoryCarStore::new(),
        ))))
    }

    fn request(inventory: i64) -> CarRequest {
        CarRequest {
            model: "Golf".into(),
            brand: "VW".into(),
            r#type: CarType::Hatchback,
            inventory,
            daily_fee: dec!(40.99),
        }
    }

    #[tokio::test]
    async fn test_manager_manages_fleet() {
        let fleet = fleet();
        let manager = User::manager(1, "boss@carrent.test");

        let car = fleet.add_car(&manager, request(3)).await.unwrap();
        assert_eq!(car.id, 1);
        assert_eq!(car.inventory, 3);

        let mut update = request(5);
        update.model = "Passat".into();
        let car = fleet.update_car(&manager, 1, update).await.unwrap();
        assert_eq!(car.model, "Passat");
        assert_eq!(car.inventory, 5);

        fleet.delete_car(&manager, 1).await.unwrap();
        assert!(fleet.list_cars().await.unwrap().is_empty());
        assert!(matches!(
            fleet.get_car(1).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            fleet.update_car(&manager, 1, request(1)).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_customers_cannot_administer() {
        let fleet = fleet();
        let customer = User::customer(2, "alice@carrent.test");
        assert!(matches!(
            fleet.add_car(&customer, request(1)).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            fleet.delete_car(&customer, 1).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_authorization() {
        let fleet = fleet();
        let customer = User::customer(2, "alice@carrent.test");
        assert!(matches!(
            fleet.add_car(&customer, request(-1)).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_import_skips_authorization() {
        let fleet = fleet();
        let car = fleet.import_car(request(2)).await.unwrap();
        assert_eq!(fleet.get_car(car.id).await.unwrap().inventory, 2);
    }
}
