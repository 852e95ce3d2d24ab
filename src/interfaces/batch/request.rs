use crate::application::requests::CarRequest;
use crate::domain::payment::PaymentType;
use crate::domain::user::RoleSet;
use crate::domain::{CarId, RentalId, UserId};
use crate::error::{Result, ServiceError};
use serde::Deserialize;
use std::io::BufRead;

/// A single batch request, tagged by its `op` field.
///
/// Operations acting on behalf of someone carry the acting `user_id`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    AddUser {
        email: String,
        #[serde(default)]
        roles: RoleSet,
    },
    AddCar {
        user_id: UserId,
        car: CarRequest,
    },
    UpdateCar {
        user_id: UserId,
        car_id: CarId,
        car: CarRequest,
    },
    DeleteCar {
        user_id: UserId,
        car_id: CarId,
    },
    GetCar {
        car_id: CarId,
    },
    ListCars,
    CreateRental {
        user_id: UserId,
        car_id: CarId,
        days_of_rental: i64,
    },
    GetRental {
        user_id: UserId,
        rental_id: RentalId,
    },
    ReturnRental {
        user_id: UserId,
        rental_id: RentalId,
    },
    ListRentals {
        user_id: UserId,
        #[serde(default)]
        is_active: Option<bool>,
        #[serde(default)]
        target_user_id: Option<UserId>,
    },
    CreatePayment {
        rental_id: RentalId,
        r#type: PaymentType,
    },
    CheckPayment {
        rental_id: RentalId,
        r#type: PaymentType,
    },
    CancelPayment {
        rental_id: RentalId,
    },
    ListPayments {
        user_id: UserId,
        #[serde(default)]
        target_user_id: Option<UserId>,
    },
    NotifyOverdue,
}

/// Reads requests from a JSON-lines source.
///
/// Blank lines are skipped. Line numbers are 1-based and count every line of
/// the source, so responses can be matched back to the input.
pub struct RequestReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> RequestReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn requests(self) -> impl Iterator<Item = (usize, Result<Request>)> {
        self.source
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => return Some((index + 1, Err(ServiceError::from(e)))),
                };
                if line.trim().is_empty() {
                    return None;
                }
                let request = serde_json::from_str::<Request>(&line).map_err(ServiceError::from);
                Some((index + 1, request))
            })
    }
}
