//! Application layer: the services that drive the rental and payment
//! lifecycle on top of the domain ports.
//!
//! [`RentalEngine`](engine::RentalEngine) wires every service to one set of
//! stores, one payment processor and one notification sink.

pub mod access;
pub mod engine;
pub mod fleet;
pub mod inventory;
pub mod locks;
pub mod payments;
pub mod rentals;
pub mod requests;
pub mod users;

use crate::domain::notification::NotificationEvent;
use crate::domain::ports::{
    CarStoreRef, NotificationSinkRef, PaymentStoreRef, RentalStoreRef, UserStoreRef,
};
use tracing::warn;

/// One handle per persisted entity, usually all backed by the same adapter.
#[derive(Clone)]
pub struct Stores {
    pub cars: CarStoreRef,
    pub rentals: RentalStoreRef,
    pub payments: PaymentStoreRef,
    pub users: UserStoreRef,
}

/// Hands an event to the sink. A failed delivery is logged and dropped; it
/// never undoes the operation that produced the event.
pub(crate) async fn publish(sink: &NotificationSinkRef, event: NotificationEvent) {
    if let Err(e) = sink.notify(&event).await {
        warn!(event = event.kind(), error = %e, "Notification delivery failed");
    }
}
