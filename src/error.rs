use crate::domain::payment::PaymentType;
use crate::domain::ports::ProcessorError;
use crate::domain::{CarId, RentalId};
use thiserror::Error;

/// Failure classes exposed at the boundary, each with a fixed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    Unavailable,
    Forbidden,
    ServiceUnavailable,
    BadRequest,
    Internal,
}

impl ErrorClass {
    pub fn status(self) -> u16 {
        match self {
            ErrorClass::NotFound => 404,
            ErrorClass::Conflict => 409,
            ErrorClass::Unavailable => 422,
            ErrorClass::Forbidden => 403,
            ErrorClass::ServiceUnavailable => 503,
            ErrorClass::BadRequest => 400,
            ErrorClass::Internal => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Can't find {entity} with id: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Car {0} is currently out of stock! Please choose another")]
    CarUnavailable(CarId),
    #[error("{0}")]
    Forbidden(String),
    #[error("Rental {0} has already been returned")]
    AlreadyReturned(RentalId),
    #[error(
        "Too many payment records for the given rental ID: {rental_id}. Finish previous payment instead of creating a new one!"
    )]
    TooManyPayments {
        rental_id: RentalId,
        kind: PaymentType,
    },
    #[error("The {kind} for rental {rental_id} has already been paid")]
    AlreadyPaid {
        rental_id: RentalId,
        kind: PaymentType,
    },
    #[error("A user with email {0} already exists")]
    EmailTaken(String),
    #[error("Rental {0} was not returned late, there is no fine to pay")]
    NoFineDue(RentalId),
    #[error("Failed to create a payment session: {0}")]
    SessionCreation(#[source] ProcessorError),
    #[error("Failed to retrieve the payment session: {0}")]
    SessionRetrieval(#[source] ProcessorError),
    #[error("Payment session {session_id} was opened but could not be recorded: {source}")]
    OrphanedSession {
        session_id: String,
        #[source]
        source: Box<ServiceError>,
    },
    #[error("Payment processor reported an unexpected session state: {0}")]
    UnexpectedSessionState(String),
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ServiceError::Storage(Box::new(std::io::Error::other(message.into())))
    }

    /// Maps the error onto the boundary taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            ServiceError::NotFound { .. } => ErrorClass::NotFound,
            ServiceError::CarUnavailable(_) => ErrorClass::Unavailable,
            ServiceError::Forbidden(_) => ErrorClass::Forbidden,
            ServiceError::AlreadyReturned(_)
            | ServiceError::TooManyPayments { .. }
            | ServiceError::AlreadyPaid { .. }
            | ServiceError::NoFineDue(_)
            | ServiceError::EmailTaken(_) => ErrorClass::Conflict,
            ServiceError::SessionCreation(_)
            | ServiceError::SessionRetrieval(_)
            | ServiceError::OrphanedSession { .. }
            | ServiceError::UnexpectedSessionState(_) => ErrorClass::ServiceUnavailable,
            ServiceError::Validation(_) | ServiceError::Csv(_) | ServiceError::Json(_) => {
                ErrorClass::BadRequest
            }
            ServiceError::Configuration(_) | ServiceError::Storage(_) | ServiceError::Io(_) => {
                ErrorClass::Internal
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_share_one_class() {
        let errors = [
            ServiceError::AlreadyReturned(1),
            ServiceError::TooManyPayments {
                rental_id: 1,
                kind: PaymentType::Payment,
            },
            ServiceError::AlreadyPaid {
                rental_id: 1,
                kind: PaymentType::Fine,
            },
        ];
        for error in errors {
            assert_eq!(error.class(), ErrorClass::Conflict);
            assert_eq!(error.class().status(), 409);
        }
    }

    #[test]
    fn test_processor_failures_are_service_unavailable() {
        let error = ServiceError::SessionCreation(ProcessorError::Transport("timeout".into()));
        assert_eq!(error.class().status(), 503);
        assert!(error.to_string().contains("timeout"));
    }

    #[test]
    fn test_orphaned_session_is_service_unavailable() {
        let error = ServiceError::OrphanedSession {
            session_id: "cs_1".into(),
            source: Box::new(ServiceError::storage("disk full")),
        };
        assert_eq!(error.class(), ErrorClass::ServiceUnavailable);
        assert!(error.to_string().contains("cs_1"));
        assert!(error.to_string().contains("disk full"));
    }

    #[test]
    fn test_validation_message_lists_every_field() {
        let error = ServiceError::Validation(vec![
            "carId must be positive".into(),
            "daysOfRental must be positive".into(),
        ]);
        assert_eq!(error.class(), ErrorClass::BadRequest);
        assert_eq!(
            error.to_string(),
            "Validation failed: carId must be positive; daysOfRental must be positive"
        );
    }

    #[test]
    fn test_not_found_message() {
        let error = ServiceError::not_found("rental", 42);
        assert_eq!(error.to_string(), "Can't find rental with id: 42");
        assert_eq!(error.class(), ErrorClass::NotFound);
    }
}
