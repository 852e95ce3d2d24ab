//! Domain layer: entities, value objects, pure billing rules and the ports
//! the application layer drives.

pub mod billing;
pub mod car;
pub mod notification;
pub mod payment;
pub mod ports;
pub mod rental;
pub mod user;

pub type CarId = u64;
pub type RentalId = u64;
pub type PaymentId = u64;
pub type UserId = u64;
