use super::access::{Scope, ensure_owner_or_manager, listing_scope};
use super::inventory::InventoryLedger;
use super::locks::{RowGuard, RowLocks};
use super::publish;
use super::requests::RentalRequest;
use crate::domain::car::{Car, CarView};
use crate::domain::notification::NotificationEvent;
use crate::domain::ports::{ClockRef, NotificationSinkRef, RentalStoreRef};
use crate::domain::rental::{Rental, RentalSummary, RentalView};
use crate::domain::user::User;
use crate::domain::{CarId, RentalId, UserId};
use crate::error::{Result, ServiceError};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info};

/// Rental lifecycle: Created (one unit reserved) to Returned (unit released).
///
/// A rental write and its stock change commit together. Both happen while the
/// car's row lock is held; if the rental write fails, the car row is put back
/// to the snapshot read under that same lock.
pub struct RentalService {
    rentals: RentalStoreRef,
    ledger: Arc<InventoryLedger>,
    notifier: NotificationSinkRef,
    clock: ClockRef,
    locks: RowLocks<RentalId>,
}

impl RentalService {
    pub fn new(
        rentals: RentalStoreRef,
        ledger: Arc<InventoryLedger>,
        notifier: NotificationSinkRef,
        clock: ClockRef,
    ) -> Self {
        Self {
            rentals,
            ledger,
            notifier,
            clock,
            locks: RowLocks::new(),
        }
    }

    pub async fn create_rental(&self, user: &User, request: RentalRequest) -> Result<RentalView> {
        request.validate()?;
        let days = request.days()?;
        let today = self.clock.today();
        Rental::due_date(today, days)?;

        let view = {
            let guard = self.ledger.lock(request.car_id).await;
            let change = self.ledger.reserve_held(&guard).await?;
            match self.open(user, request.car_id, today, days).await {
                Ok(rental) => RentalView::new(&rental, CarView::from(&change.current)),
                Err(e) => {
                    self.rollback(&guard, change.previous).await;
                    return Err(e);
                }
            }
        };

        info!(
            rental_id = view.id,
            car_id = view.car.id,
            user_id = user.id,
            "Rental created"
        );
        publish(
            &self.notifier,
            NotificationEvent::RentalCreated {
                rental: view.clone(),
            },
        )
        .await;
        Ok(view)
    }

    pub async fn get_rental(&self, user: &User, rental_id: RentalId) -> Result<RentalView> {
        let rental = self.load(rental_id).await?;
        ensure_owner_or_manager(user, rental.user_id, "rental")?;
        self.view(&rental).await
    }

    /// Closes a rental on today's date and puts its unit back into stock.
    ///
    /// Lock order is rental, then car.
    pub async fn return_rental(&self, user: &User, rental_id: RentalId) -> Result<RentalView> {
        let _rental_guard = self.locks.acquire(rental_id).await;
        let mut rental = self.load(rental_id).await?;
        ensure_owner_or_manager(user, rental.user_id, "rental")?;
        rental.mark_returned(self.clock.today())?;

        let car_guard = self.ledger.lock(rental.car_id).await;
        let change = self.ledger.release_held(&car_guard).await?;
        if let Err(e) = self.rentals.store(rental.clone()).await {
            self.rollback(&car_guard, change.previous).await;
            return Err(e);
        }

        info!(rental_id, car_id = rental.car_id, "Rental returned");
        Ok(RentalView::new(&rental, CarView::from(&change.current)))
    }

    pub async fn list_rentals(
        &self,
        user: &User,
        is_active: Option<bool>,
        target: Option<UserId>,
    ) -> Result<Vec<RentalSummary>> {
        let rentals = match listing_scope(user, target, "rentals")? {
            Scope::All => self.rentals.get_all().await?,
            Scope::User(user_id) => self.rentals.get_by_user(user_id).await?,
        };
        Ok(rentals
            .iter()
            .filter(|rental| is_active.is_none_or(|active| rental.is_active() == active))
            .map(RentalSummary::from)
            .collect())
    }

    /// Reports every active rental whose return date has passed.
    pub async fn notify_overdue_rentals(&self) -> Result<Vec<RentalSummary>> {
        let today = self.clock.today();
        let overdue: Vec<RentalSummary> = self
            .rentals
            .get_all()
            .await?
            .iter()
            .filter(|rental| rental.is_overdue_on(today))
            .map(RentalSummary::from)
            .collect();

        info!(date = %today, overdue = overdue.len(), "Overdue rentals checked");
        publish(
            &self.notifier,
            NotificationEvent::OverdueRentals {
                date: today,
                rentals: overdue.clone(),
            },
        )
        .await;
        Ok(overdue)
    }

    pub(crate) async fn load(&self, rental_id: RentalId) -> Result<Rental> {
        self.rentals
            .get(rental_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("rental", rental_id))
    }

    async fn view(&self, rental: &Rental) -> Result<RentalView> {
        let car = self
            .ledger
            .cars()
            .fetch(rental.car_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("car", rental.car_id))?;
        Ok(RentalView::new(rental, CarView::from(&car)))
    }

    async fn open(
        &self,
        user: &User,
        car_id: CarId,
        today: NaiveDate,
        days: u32,
    ) -> Result<Rental> {
        let id = self.rentals.next_id().await?;
        let rental = Rental::open(id, car_id, user.id, today, days)?;
        self.rentals.store(rental.clone()).await?;
        Ok(rental)
    }

    async fn rollback(&self, guard: &RowGuard<CarId>, snapshot: Car) {
        let car_id = snapshot.id;
        if let Err(e) = self.ledger.restore_held(guard, snapshot).await {
            error!(car_id, error = %e, "Failed to restore car stock after aborted rental write");
        }
    }
}
