use crate::application::Stores;
use crate::domain::car::Car;
use crate::domain::payment::{Payment, PaymentType};
use crate::domain::ports::{CarStore, PaymentStore, RentalStore, UserStore};
use crate::domain::rental::Rental;
use crate::domain::user::User;
use crate::domain::{CarId, PaymentId, RentalId, UserId};
use crate::error::{Result, ServiceError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for the car fleet.
pub const CF_CARS: &str = "cars";
/// Column Family for rentals.
pub const CF_RENTALS: &str = "rentals";
/// Column Family for payments, keyed by rental id and payment type.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for users.
pub const CF_USERS: &str = "users";
/// Column Family holding the id sequences.
pub const CF_META: &str = "meta";

const FAMILIES: [&str; 5] = [CF_CARS, CF_RENTALS, CF_PAYMENTS, CF_USERS, CF_META];

impl From<rocksdb::Error> for ServiceError {
    fn from(err: rocksdb::Error) -> Self {
        ServiceError::Storage(Box::new(err))
    }
}

/// A persistent store implementation using RocksDB.
///
/// One Column Family per entity, values stored as JSON. `Clone` shares the
/// underlying `Arc<DB>`, so a single instance backs every port.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    sequence_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating any
    /// missing Column Families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()));
        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            sequence_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Every port backed by this one database.
    pub fn stores(&self) -> Stores {
        Stores {
            cars: Arc::new(self.clone()),
            rentals: Arc::new(self.clone()),
            payments: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
        }
    }

    fn write<T: Serialize>(&self, family: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.handle(family)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, family: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.handle(family)?;
        match self.db.get_pinned_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, family: &str) -> Result<Vec<T>> {
        let cf = self.handle(family)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    fn advance_sequence(&self, sequence: &str) -> Result<u64> {
        let _guard = self
            .sequence_lock
            .lock()
            .map_err(|_| ServiceError::storage("sequence lock poisoned"))?;
        let current: u64 = self.read(CF_META, sequence.as_bytes())?.unwrap_or(0);
        let next = current + 1;
        self.write(CF_META, sequence.as_bytes(), &next)?;
        Ok(next)
    }

    fn handle(&self, family: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(family)
            .ok_or_else(|| ServiceError::storage(format!("{family} column family not found")))
    }
}

fn payment_key(rental_id: RentalId, kind: PaymentType) -> [u8; 9] {
    let mut key = [0u8; 9];
    key[..8].copy_from_slice(&rental_id.to_be_bytes());
    key[8] = kind.code();
    key
}

#[async_trait]
impl CarStore for RocksDBStore {
    async fn store(&self, car: Car) -> Result<()> {
        self.write(CF_CARS, &car.id.to_be_bytes(), &car)
    }

    async fn fetch(&self, id: CarId) -> Result<Option<Car>> {
        self.read(CF_CARS, &id.to_be_bytes())
    }

    async fn fetch_all(&self) -> Result<Vec<Car>> {
        self.scan(CF_CARS)
    }

    async fn next_id(&self) -> Result<CarId> {
        self.advance_sequence("car_seq")
    }
}

#[async_trait]
impl RentalStore for RocksDBStore {
    async fn store(&self, rental: Rental) -> Result<()> {
        self.write(CF_RENTALS, &rental.id.to_be_bytes(), &rental)
    }

    async fn get(&self, id: RentalId) -> Result<Option<Rental>> {
        self.read(CF_RENTALS, &id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Rental>> {
        self.scan(CF_RENTALS)
    }

    async fn next_id(&self) -> Result<RentalId> {
        self.advance_sequence("rental_seq")
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let key = payment_key(payment.rental_id, payment.r#type);
        self.write(CF_PAYMENTS, &key, &payment)
    }

    async fn get(&self, rental_id: RentalId, kind: PaymentType) -> Result<Option<Payment>> {
        self.read(CF_PAYMENTS, &payment_key(rental_id, kind))
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        self.scan(CF_PAYMENTS)
    }

    async fn next_id(&self) -> Result<PaymentId> {
        self.advance_sequence("payment_seq")
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn store(&self, user: User) -> Result<()> {
        self.write(CF_USERS, &user.id.to_be_bytes(), &user)
    }

    async fn fetch(&self, id: UserId) -> Result<Option<User>> {
        self.read(CF_USERS, &id.to_be_bytes())
    }

    async fn fetch_all(&self) -> Result<Vec<User>> {
        self.scan(CF_USERS)
    }

    async fn next_id(&self) -> Result<UserId> {
        self.advance_sequence("user_seq")
    }
}
