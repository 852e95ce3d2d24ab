use super::car::CarView;
use super::{CarId, RentalId, UserId};
use crate::error::{Result, ServiceError};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Created,
    Returned,
}

/// One customer's rental of one unit of a car.
///
/// `rental_date` and `return_date` are fixed at creation. `actual_return_date`
/// is set exactly once; after that the rental is terminal.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Rental {
    pub id: RentalId,
    pub car_id: CarId,
    pub user_id: UserId,
    pub rental_date: NaiveDate,
    pub return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
}

impl Rental {
    /// Opens a rental starting `today` and due back `days` later.
    pub fn open(
        id: RentalId,
        car_id: CarId,
        user_id: UserId,
        today: NaiveDate,
        days: u32,
    ) -> Result<Self> {
        let return_date = Self::due_date(today, days)?;
        Ok(Self {
            id,
            car_id,
            user_id,
            rental_date: today,
            return_date,
            actual_return_date: None,
        })
    }

    /// Date a rental starting `today` for `days` days is due back.
    pub fn due_date(today: NaiveDate, days: u32) -> Result<NaiveDate> {
        today
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                ServiceError::Validation(vec![format!("days_of_rental {days} is out of range")])
            })
    }

    pub fn status(&self) -> RentalStatus {
        if self.actual_return_date.is_some() {
            RentalStatus::Returned
        } else {
            RentalStatus::Created
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == RentalStatus::Created
    }

    /// Closes the rental. A second return never touches the recorded date.
    pub fn mark_returned(&mut self, today: NaiveDate) -> Result<()> {
        if !self.is_active() {
            return Err(ServiceError::AlreadyReturned(self.id));
        }
        self.actual_return_date = Some(today);
        Ok(())
    }

    /// Agreed length of the rental in whole days.
    pub fn planned_days(&self) -> i64 {
        (self.return_date - self.rental_date).num_days()
    }

    /// Whole days the car came back late, if it did.
    pub fn overdue_days(&self) -> Option<i64> {
        let actual = self.actual_return_date?;
        let days = (actual - self.return_date).num_days();
        (days > 0).then_some(days)
    }

    /// Still out and past its due date.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.is_active() && self.return_date < today
    }
}

/// Full rental snapshot, car included.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RentalView {
    pub id: RentalId,
    pub rental_date: NaiveDate,
    pub return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub car: CarView,
    pub user_id: UserId,
}

impl RentalView {
    pub fn new(rental: &Rental, car: CarView) -> Self {
        Self {
            id: rental.id,
            rental_date: rental.rental_date,
            return_date: rental.return_date,
            actual_return_date: rental.actual_return_date,
            car,
            user_id: rental.user_id,
        }
    }
}

/// Listing row: the car is referenced by id only.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RentalSummary {
    pub id: RentalId,
    pub rental_date: NaiveDate,
    pub return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub car_id: CarId,
    pub user_id: UserId,
}

impl From<&Rental> for RentalSummary {
    fn from(rental: &Rental) -> Self {
        Self {
            id: rental.id,
            rental_date: rental.rental_date,
            return_date: rental.return_date,
            actual_return_date: rental.actual_return_date,
            car_id: rental.car_id,
            user_id: rental.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_sets_dates() {
        let rental = Rental::open(1, 2, 3, date(2024, 1, 6), 3).unwrap();
        assert_eq!(rental.rental_date, date(2024, 1, 6));
        assert_eq!(rental.return_date, date(2024, 1, 9));
        assert_eq!(rental.actual_return_date, None);
        assert_eq!(rental.status(), RentalStatus::Created);
        assert_eq!(rental.planned_days(), 3);
    }

    #[test]
    fn test_due_date_out_of_calendar_range() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(
            Rental::due_date(today, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
        );
        assert!(matches!(
            Rental::due_date(today, u32::MAX),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_second_return_fails_and_keeps_first_date() {
        let mut rental = Rental::open(7, 2, 3, date(2024, 1, 6), 3).unwrap();
        rental.mark_returned(date(2024, 1, 8)).unwrap();

        let result = rental.mark_returned(date(2024, 1, 20));
        assert!(matches!(result, Err(ServiceError::AlreadyReturned(7))));
        assert_eq!(rental.actual_return_date, Some(date(2024, 1, 8)));
        assert_eq!(rental.status(), RentalStatus::Returned);
    }

    #[test]
    fn test_overdue_days() {
        let mut rental = Rental::open(1, 2, 3, date(2024, 1, 6), 3).unwrap();
        assert_eq!(rental.overdue_days(), None);

        rental.mark_returned(date(2024, 1, 9)).unwrap();
        assert_eq!(rental.overdue_days(), None);

        rental.actual_return_date = Some(date(2024, 1, 11));
        assert_eq!(rental.overdue_days(), Some(2));
    }

    #[test]
    fn test_is_overdue_on() {
        let mut rental = Rental::open(1, 2, 3, date(2024, 1, 6), 3).unwrap();
        assert!(!rental.is_overdue_on(date(2024, 1, 9)));
        assert!(rental.is_overdue_on(date(2024, 1, 10)));

        rental.mark_returned(date(2024, 1, 12)).unwrap();
        assert!(!rental.is_overdue_on(date(2024, 1, 13)));
    }
}
