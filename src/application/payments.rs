use super::access::listing_scope;
use super::locks::RowLocks;
use super::publish;
use super::requests::PaymentRequest;
use crate::config::CheckoutConfig;
use crate::domain::billing;
use crate::domain::notification::NotificationEvent;
use crate::domain::payment::{Payment, PaymentPaused, PaymentType};
use crate::domain::ports::{
    CarStoreRef, CheckoutRequest, NotificationSinkRef, PaymentProcessorRef, PaymentStoreRef,
    RentalStoreRef, SessionStatus,
};
use crate::domain::user::User;
use crate::domain::{RentalId, UserId};
use crate::error::{Result, ServiceError};
use std::collections::HashMap;
use tracing::{info, warn};

pub const PAYMENT_PRODUCT_NAME: &str = "Car rental payment";
pub const FINE_PRODUCT_NAME: &str = "Car rental overdue fine";

fn product_name(kind: PaymentType) -> &'static str {
    match kind {
        PaymentType::Payment => PAYMENT_PRODUCT_NAME,
        PaymentType::Fine => FINE_PRODUCT_NAME,
    }
}

/// Drives a payment through the external processor: one session, and so one
/// row, per `(rental, type)`, flipped from PENDING to PAID exactly once.
///
/// Every mutation runs under the lock for its `(rental, type)` pair. The
/// processor call happens inside that lock, which only ever blocks callers
/// working on the same pair.
pub struct PaymentService {
    payments: PaymentStoreRef,
    rentals: RentalStoreRef,
    cars: CarStoreRef,
    processor: PaymentProcessorRef,
    notifier: NotificationSinkRef,
    checkout: CheckoutConfig,
    locks: RowLocks<(RentalId, PaymentType)>,
}

impl PaymentService {
    pub fn new(
        payments: PaymentStoreRef,
        rentals: RentalStoreRef,
        cars: CarStoreRef,
        processor: PaymentProcessorRef,
        notifier: NotificationSinkRef,
        checkout: CheckoutConfig,
    ) -> Self {
        Self {
            payments,
            rentals,
            cars,
            processor,
            notifier,
            checkout,
            locks: RowLocks::new(),
        }
    }

    pub async fn create_payment_session(&self, request: PaymentRequest) -> Result<Payment> {
        request.validate()?;
        let PaymentRequest { rental_id, r#type: kind } = request;
        let _guard = self.locks.acquire((rental_id, kind)).await;

        match self.payments.get(rental_id, kind).await? {
            Some(existing) if existing.is_paid() => {
                return Err(ServiceError::AlreadyPaid { rental_id, kind });
            }
            Some(_) => return Err(ServiceError::TooManyPayments { rental_id, kind }),
            None => {}
        }

        let rental = self
            .rentals
            .get(rental_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("rental", rental_id))?;
        // Deleted cars still bill the rentals made while they were listed.
        let car = self
            .cars
            .fetch(rental.car_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("car", rental.car_id))?;
        let amount = billing::calculate(car.daily_fee, &rental, kind)?;

        let checkout = CheckoutRequest {
            amount_cents: billing::to_cents(amount)?,
            currency: self.checkout.currency.clone(),
            product_name: product_name(kind).to_owned(),
            success_url: self.checkout.success_url(rental_id, kind),
            cancel_url: self.checkout.cancel_url(rental_id),
        };
        let session = self
            .processor
            .create_session(&checkout)
            .await
            .map_err(ServiceError::SessionCreation)?;

        let recorded = match self.payments.next_id().await {
            Ok(id) => {
                let payment =
                    Payment::pending(id, kind, rental_id, amount, session.id.clone(), session.url);
                self.payments.store(payment.clone()).await.map(|()| payment)
            }
            Err(e) => Err(e),
        };
        let payment = recorded.map_err(|e| {
            warn!(
                rental_id,
                %kind,
                session_id = %session.id,
                error = %e,
                "Processor session left without a payment row"
            );
            ServiceError::OrphanedSession {
                session_id: session.id.clone(),
                source: Box::new(e),
            }
        })?;

        info!(
            payment_id = payment.id,
            rental_id,
            %kind,
            amount = %payment.amount_to_pay,
            "Payment session created"
        );
        Ok(payment)
    }

    /// Confirms a payment once the processor reports its session as paid.
    ///
    /// Confirming an already-paid payment returns it as is: the processor is
    /// not asked again and no second notification goes out.
    pub async fn check_successful_payment(
        &self,
        rental_id: RentalId,
        kind: PaymentType,
    ) -> Result<Payment> {
        let _guard = self.locks.acquire((rental_id, kind)).await;
        let mut payment = self
            .payments
            .get(rental_id, kind)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment", format!("{rental_id}/{kind}")))?;
        if payment.is_paid() {
            return Ok(payment);
        }

        let status = self
            .processor
            .retrieve_session(&payment.session_id)
            .await
            .map_err(ServiceError::SessionRetrieval)?;
        match status {
            SessionStatus::Paid => {}
            SessionStatus::Unpaid => {
                return Err(ServiceError::Forbidden(
                    "Can't access this endpoint - The payment is not paid!".to_owned(),
                ));
            }
            SessionStatus::Other(state) => {
                return Err(ServiceError::UnexpectedSessionState(state));
            }
        }

        payment.mark_paid();
        self.payments.store(payment.clone()).await?;
        info!(payment_id = payment.id, rental_id, %kind, "Payment confirmed");

        publish(
            &self.notifier,
            NotificationEvent::PaymentPaid {
                payment: payment.clone(),
            },
        )
        .await;
        Ok(payment)
    }

    pub fn get_cancel_payment_paused_message(&self, rental_id: RentalId) -> PaymentPaused {
        PaymentPaused {
            message: format!(
                "The Payment was canceled! It can be made later, but the session is available for only {} hours! Rental ID: {}",
                self.checkout.resume_window_hours, rental_id
            ),
        }
    }

    /// Payments belong to whoever owns their rental.
    pub async fn list_payments(&self, user: &User, target: Option<UserId>) -> Result<Vec<Payment>> {
        let scope = listing_scope(user, target, "payments")?;
        let owners: HashMap<RentalId, UserId> = self
            .rentals
            .get_all()
            .await?
            .into_iter()
            .map(|rental| (rental.id, rental.user_id))
            .collect();

        let mut payments = self.payments.get_all().await?;
        payments.retain(|payment| {
            owners
                .get(&payment.rental_id)
                .is_some_and(|owner| scope.includes(*owner))
        });
        payments.sort_by_key(|payment| payment.id);
        Ok(payments)
    }
}
