//! Adapters for the domain ports: storage, payment processors, notification
//! channels and clocks.

pub mod clock;
pub mod in_memory;
pub mod notify;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod sandbox;
pub mod stripe;
