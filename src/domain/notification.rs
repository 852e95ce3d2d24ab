use super::payment::Payment;
use super::rental::{RentalSummary, RentalView};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

/// Events pushed to the notification sink.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    RentalCreated { rental: RentalView },
    PaymentPaid { payment: Payment },
    OverdueRentals {
        date: NaiveDate,
        rentals: Vec<RentalSummary>,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::RentalCreated { .. } => "rental_created",
            NotificationEvent::PaymentPaid { .. } => "payment_paid",
            NotificationEvent::OverdueRentals { .. } => "overdue_rentals",
        }
    }

    /// Human-readable message for chat-style channels.
    pub fn render(&self) -> String {
        match self {
            NotificationEvent::RentalCreated { rental } => format!(
                "New rental has been created:\n\
                 Rental ID: {}\n\
                 Car ID: {}\n\
                 Rental Date: {}\n\
                 Return Date: {}\n\
                 User ID: {}",
                rental.id, rental.car.id, rental.rental_date, rental.return_date, rental.user_id
            ),
            NotificationEvent::PaymentPaid { payment } => format!(
                "Payment has been paid:\n\
                 Payment ID: {}\n\
                 Payment Status: {}\n\
                 Payment Type: {}\n\
                 Rental ID: {}\n\
                 Amount Paid: {}",
                payment.id,
                payment.status,
                payment.r#type,
                payment.rental_id,
                payment.amount_to_pay
            ),
            NotificationEvent::OverdueRentals { date, rentals } if rentals.is_empty() => {
                format!("{date} - no rentals overdue!")
            }
            NotificationEvent::OverdueRentals { date, rentals } => {
                let mut text = format!("{date} - Rentals Overdue:\n");
                for rental in rentals {
                    // Writing into a String cannot fail.
                    let _ = write!(
                        text,
                        "\nRental ID: {}\nUser ID: {}\nCar ID: {}\nReturn Date: {}\n",
                        rental.id, rental.user_id, rental.car_id, rental.return_date
                    );
                }
                text
            }
        }
    }
}
