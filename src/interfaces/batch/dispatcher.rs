use super::request::Request;
use super::response::Response;
use crate::application::engine::RentalEngine;
use crate::application::requests::{PaymentRequest, RentalRequest};
use crate::domain::UserId;
use crate::domain::user::User;
use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const OK: u16 = 200;
const CREATED: u16 = 201;

fn body<T: Serialize>(status: u16, value: &T) -> Result<(u16, Value)> {
    Ok((status, serde_json::to_value(value)?))
}

/// Executes batch requests against the engine and translates every outcome,
/// failures included, into a [`Response`].
pub struct Dispatcher {
    engine: RentalEngine,
}

impl Dispatcher {
    pub fn new(engine: RentalEngine) -> Self {
        Self { engine }
    }

    pub async fn dispatch(&self, line: usize, request: Result<Request>) -> Response {
        let outcome = match request {
            Ok(request) => self.execute(request).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok((status, value)) => Response::success(line, status, value),
            Err(e) => {
                debug!(line, error = %e, "Request failed");
                Response::failure(line, &e)
            }
        }
    }

    pub fn into_engine(self) -> RentalEngine {
        self.engine
    }

    async fn actor(&self, user_id: UserId) -> Result<User> {
        self.engine.users.get_user(user_id).await
    }

    async fn execute(&self, request: Request) -> Result<(u16, Value)> {
        let engine = &self.engine;
        match request {
            Request::AddUser { email, roles } => {
                body(CREATED, &engine.users.add_user(&email, roles).await?)
            }
            Request::AddCar { user_id, car } => {
                let actor = self.actor(user_id).await?;
                body(CREATED, &engine.fleet.add_car(&actor, car).await?)
            }
            Request::UpdateCar {
                user_id,
                car_id,
                car,
            } => {
                let actor = self.actor(user_id).await?;
                body(OK, &engine.fleet.update_car(&actor, car_id, car).await?)
            }
            Request::DeleteCar { user_id, car_id } => {
                let actor = self.actor(user_id).await?;
                engine.fleet.delete_car(&actor, car_id).await?;
                Ok((OK, Value::Null))
            }
            Request::GetCar { car_id } => body(OK, &engine.fleet.get_car(car_id).await?),
            Request::ListCars => body(OK, &engine.fleet.list_cars().await?),
            Request::CreateRental {
                user_id,
                car_id,
                days_of_rental,
            } => {
                let actor = self.actor(user_id).await?;
                let request = RentalRequest::new(car_id, days_of_rental);
                body(CREATED, &engine.rentals.create_rental(&actor, request).await?)
            }
            Request::GetRental { user_id, rental_id } => {
                let actor = self.actor(user_id).await?;
                body(OK, &engine.rentals.get_rental(&actor, rental_id).await?)
            }
            Request::ReturnRental { user_id, rental_id } => {
                let actor = self.actor(user_id).await?;
                body(OK, &engine.rentals.return_rental(&actor, rental_id).await?)
            }
            Request::ListRentals {
                user_id,
                is_active,
                target_user_id,
            } => {
                let actor = self.actor(user_id).await?;
                let rentals = engine
                    .rentals
                    .list_rentals(&actor, is_active, target_user_id)
                    .await?;
                body(OK, &rentals)
            }
            Request::CreatePayment { rental_id, r#type } => {
                let request = PaymentRequest::new(rental_id, r#type);
                body(
                    CREATED,
                    &engine.payments.create_payment_session(request).await?,
                )
            }
            Request::CheckPayment { rental_id, r#type } => body(
                OK,
                &engine
                    .payments
                    .check_successful_payment(rental_id, r#type)
                    .await?,
            ),
            Request::CancelPayment { rental_id } => body(
                OK,
                &engine.payments.get_cancel_payment_paused_message(rental_id),
            ),
            Request::ListPayments {
                user_id,
                target_user_id,
            } => {
                let actor = self.actor(user_id).await?;
                body(
                    OK,
                    &engine.payments.list_payments(&actor, target_user_id).await?,
                )
            }
            Request::NotifyOverdue => body(OK, &engine.rentals.notify_overdue_rentals().await?),
        }
    }
}
