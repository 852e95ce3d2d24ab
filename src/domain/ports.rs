use super::car::Car;
use super::notification::NotificationEvent;
use super::payment::{Payment, PaymentType};
use super::rental::Rental;
use super::user::User;
use super::{CarId, PaymentId, RentalId, UserId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Persistence for the car fleet.
///
/// Implementations only provide raw access. The soft-delete filter lives in
/// the provided `get`/`get_all` methods so every adapter applies it the same way.
#[async_trait]
pub trait CarStore: Send + Sync {
    async fn store(&self, car: Car) -> Result<()>;
    /// Reads a row whether or not it has been soft-deleted.
    async fn fetch(&self, id: CarId) -> Result<Option<Car>>;
    async fn fetch_all(&self) -> Result<Vec<Car>>;
    async fn next_id(&self) -> Result<CarId>;

    async fn get(&self, id: CarId) -> Result<Option<Car>> {
        Ok(self.fetch(id).await?.filter(|car| !car.deleted))
    }

    async fn get_all(&self) -> Result<Vec<Car>> {
        let mut cars = self.fetch_all().await?;
        cars.retain(|car| !car.deleted);
        Ok(cars)
    }
}

#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn store(&self, rental: Rental) -> Result<()>;
    async fn get(&self, id: RentalId) -> Result<Option<Rental>>;
    async fn get_all(&self) -> Result<Vec<Rental>>;
    async fn next_id(&self) -> Result<RentalId>;

    async fn get_by_user(&self, user_id: UserId) -> Result<Vec<Rental>> {
        let mut rentals = self.get_all().await?;
        rentals.retain(|rental| rental.user_id == user_id);
        Ok(rentals)
    }
}

/// Payments are addressed by the `(rental, type)` pair they belong to.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, rental_id: RentalId, kind: PaymentType) -> Result<Option<Payment>>;
    async fn get_all(&self) -> Result<Vec<Payment>>;
    async fn next_id(&self) -> Result<PaymentId>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: User) -> Result<()>;
    async fn fetch(&self, id: UserId) -> Result<Option<User>>;
    async fn fetch_all(&self) -> Result<Vec<User>>;
    async fn next_id(&self) -> Result<UserId>;

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.fetch(id).await?.filter(|user| !user.deleted))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .fetch_all()
            .await?
            .into_iter()
            .find(|user| !user.deleted && user.email.eq_ignore_ascii_case(email)))
    }
}

pub type CarStoreRef = Arc<dyn CarStore>;
pub type RentalStoreRef = Arc<dyn RentalStore>;
pub type PaymentStoreRef = Arc<dyn PaymentStore>;
pub type UserStoreRef = Arc<dyn UserStore>;

/// Everything the processor needs to open a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Paid,
    Unpaid,
    /// Anything the processor reports that we do not model.
    Other(String),
}

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("unknown session: {0}")]
    SessionNotFound(String),
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

/// External checkout provider.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> std::result::Result<CheckoutSession, ProcessorError>;

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> std::result::Result<SessionStatus, ProcessorError>;
}

pub type PaymentProcessorRef = Arc<dyn PaymentProcessor>;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("notification transport failure: {0}")]
    Transport(String),
    #[error("notification rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Outbound channel for lifecycle events. Delivery is best-effort.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> std::result::Result<(), NotificationError>;
}

pub type NotificationSinkRef = Arc<dyn NotificationSink>;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub type ClockRef = Arc<dyn Clock>;
