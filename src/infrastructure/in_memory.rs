use crate::application::Stores;
use crate::domain::car::Car;
use crate::domain::payment::{Payment, PaymentType};
use crate::domain::ports::{CarStore, PaymentStore, RentalStore, UserStore};
use crate::domain::rental::Rental;
use crate::domain::user::User;
use crate::domain::{CarId, PaymentId, RentalId, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Shared map plus id sequence backing each in-memory store.
///
/// `BTreeMap` keeps listings in id order.
struct Table<K, V> {
    rows: RwLock<BTreeMap<K, V>>,
    sequence: AtomicU64,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            sequence: AtomicU64::new(0),
        }
    }
}

impl<K: Ord, V: Clone> Table<K, V> {
    async fn put(&self, key: K, value: V) {
        self.rows.write().await.insert(key, value);
    }

    async fn get(&self, key: &K) -> Option<V> {
        self.rows.read().await.get(key).cloned()
    }

    async fn values(&self) -> Vec<V> {
        self.rows.read().await.values().cloned().collect()
    }

    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// A thread-safe in-memory car fleet.
#[derive(Default, Clone)]
pub struct InMemoryCarStore {
    table: Arc<Table<CarId, Car>>,
}

impl InMemoryCarStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CarStore for InMemoryCarStore {
    async fn store(&self, car: Car) -> Result<()> {
        self.table.put(car.id, car).await;
        Ok(())
    }

    async fn fetch(&self, id: CarId) -> Result<Option<Car>> {
        Ok(self.table.get(&id).await)
    }

    async fn fetch_all(&self) -> Result<Vec<Car>> {
        Ok(self.table.values().await)
    }

    async fn next_id(&self) -> Result<CarId> {
        Ok(self.table.next_id())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryRentalStore {
    table: Arc<Table<RentalId, Rental>>,
}

impl InMemoryRentalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RentalStore for InMemoryRentalStore {
    async fn store(&self, rental: Rental) -> Result<()> {
        self.table.put(rental.id, rental).await;
        Ok(())
    }

    async fn get(&self, id: RentalId) -> Result<Option<Rental>> {
        Ok(self.table.get(&id).await)
    }

    async fn get_all(&self) -> Result<Vec<Rental>> {
        Ok(self.table.values().await)
    }

    async fn next_id(&self) -> Result<RentalId> {
        Ok(self.table.next_id())
    }
}

/// Payments keyed by `(rental, type)`, so a second row for the same pair
/// can only ever replace the first.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    table: Arc<Table<(RentalId, PaymentType), Payment>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        self.table
            .put((payment.rental_id, payment.r#type), payment)
            .await;
        Ok(())
    }

    async fn get(&self, rental_id: RentalId, kind: PaymentType) -> Result<Option<Payment>> {
        Ok(self.table.get(&(rental_id, kind)).await)
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        Ok(self.table.values().await)
    }

    async fn next_id(&self) -> Result<PaymentId> {
        Ok(self.table.next_id())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    table: Arc<Table<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: User) -> Result<()> {
        self.table.put(user.id, user).await;
        Ok(())
    }

    async fn fetch(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.table.get(&id).await)
    }

    async fn fetch_all(&self) -> Result<Vec<User>> {
        Ok(self.table.values().await)
    }

    async fn next_id(&self) -> Result<UserId> {
        Ok(self.table.next_id())
    }
}

/// Fresh, empty in-memory stores for every entity.
pub fn in_memory_stores() -> Stores {
    Stores {
        cars: Arc::new(InMemoryCarStore::new()),
        rentals: Arc::new(InMemoryRentalStore::new()),
        payments: Arc::new(InMemoryPaymentStore::new()),
        users: Arc::new(InMemoryUserStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::car::CarType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_car_store_hides_soft_deleted_rows() {
        let store = InMemoryCarStore::new();
        let mut car = Car::new(1, "Golf", "VW", CarType::Hatchback, 2, dec!(30));
        store.store(car.clone()).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), Some(car.clone()));

        car.deleted = true;
        store.store(car.clone()).await.unwrap();
        assert!(store.get(1).await.unwrap().is_none());
        assert!(store.get_all().await.unwrap().is_empty());
        assert_eq!(store.fetch(1).await.unwrap(), Some(car));
    }

    #[tokio::test]
    async fn test_sequences_start_at_one() {
        let store = InMemoryRentalStore::new();
        assert_eq!(store.next_id().await.unwrap(), 1);
        assert_eq!(store.next_id().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rentals_by_user() {
        let store = InMemoryRentalStore::new();
        let today = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        store
            .store(Rental::open(1, 1, 10, today, 2).unwrap())
            .await
            .unwrap();
        store
            .store(Rental::open(2, 1, 20, today, 2).unwrap())
            .await
            .unwrap();

        let mine = store.get_by_user(10).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, 1);
    }

    #[tokio::test]
    async fn test_payment_store_keys_by_rental_and_type() {
        let store = InMemoryPaymentStore::new();
        let payment = Payment::pending(
            1,
            PaymentType::Payment,
            7,
            dec!(10),
            "cs_1".into(),
            "https://pay/cs_1".into(),
        );
        store.store(payment.clone()).await.unwrap();

        assert_eq!(
            store.get(7, PaymentType::Payment).await.unwrap(),
            Some(payment)
        );
        assert!(store.get(7, PaymentType::Fine).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_lookup_by_email_ignores_case() {
        let store = InMemoryUserStore::new();
        store
            .store(User::customer(1, "Alice@carrent.test"))
            .await
            .unwrap();
        let found = store.get_by_email("alice@carrent.test").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(1));
    }
}
