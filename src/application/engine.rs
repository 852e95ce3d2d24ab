use super::Stores;
use super::fleet::FleetService;
use super::inventory::InventoryLedger;
use super::payments::PaymentService;
use super::rentals::RentalService;
use super::users::UserService;
use crate::config::CheckoutConfig;
use crate::domain::car::CarView;
use crate::domain::ports::{ClockRef, NotificationSinkRef, PaymentProcessorRef};
use crate::error::Result;
use std::sync::Arc;

/// The main entry point of the rental backend.
///
/// `RentalEngine` owns one instance of every service, all sharing the same
/// stores and the same inventory ledger, so that fleet edits, rentals and
/// returns serialize on the same per-car locks.
pub struct RentalEngine {
    pub fleet: FleetService,
    pub rentals: RentalService,
    pub payments: PaymentService,
    pub users: UserService,
}

impl RentalEngine {
    /// Creates a new `RentalEngine`.
    ///
    /// # Arguments
    ///
    /// * `stores` - Persistence for every entity.
    /// * `processor` - The external checkout provider.
    /// * `notifier` - Sink for lifecycle events.
    /// * `clock` - Source of the business date.
    /// * `checkout` - Callback URLs and currency for checkout sessions.
    pub fn new(
        stores: Stores,
        processor: PaymentProcessorRef,
        notifier: NotificationSinkRef,
        clock: ClockRef,
        checkout: CheckoutConfig,
    ) -> Self {
        let ledger = Arc::new(InventoryLedger::new(stores.cars.clone()));
        Self {
            fleet: FleetService::new(Arc::clone(&ledger)),
            rentals: RentalService::new(
                stores.rentals.clone(),
                ledger,
                Arc::clone(&notifier),
                clock,
            ),
            payments: PaymentService::new(
                stores.payments,
                stores.rentals,
                stores.cars,
                processor,
                notifier,
                checkout,
            ),
            users: UserService::new(stores.users),
        }
    }

    /// Consumes the engine and returns the final state of the fleet.
    pub async fn into_fleet(self) -> Result<Vec<CarView>> {
        self.fleet.list_cars().await
    }
}
