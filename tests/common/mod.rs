#![allow(dead_code)]

use carrent::application::engine::RentalEngine;
use carrent::application::requests::CarRequest;
use carrent::config::CheckoutConfig;
use carrent::domain::car::CarType;
use carrent::domain::user::{Role, RoleSet, User};
use carrent::infrastructure::clock::FixedClock;
use carrent::infrastructure::in_memory::in_memory_stores;
use carrent::infrastructure::notify::InMemoryNotifier;
use carrent::infrastructure::sandbox::SandboxProcessor;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::io::{Error, Write};
use std::sync::Arc;
use tempfile::NamedTempFile;

pub struct Harness {
    pub engine: RentalEngine,
    pub processor: Arc<SandboxProcessor>,
    pub notifier: Arc<InMemoryNotifier>,
    pub clock: Arc<FixedClock>,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// An in-memory engine pinned to `today`, with a sandbox processor that only
/// settles sessions when told to.
pub fn harness(today: NaiveDate) -> Harness {
    let processor = Arc::new(SandboxProcessor::new("https://checkout.test"));
    let notifier = Arc::new(InMemoryNotifier::new());
    let clock = Arc::new(FixedClock::new(today));
    let engine = RentalEngine::new(
        in_memory_stores(),
        processor.clone(),
        notifier.clone(),
        clock.clone(),
        CheckoutConfig::new("https://carrent.test", "usd"),
    );
    Harness {
        engine,
        processor,
        notifier,
        clock,
    }
}

pub async fn manager(engine: &RentalEngine) -> User {
    engine
        .users
        .add_user("boss@carrent.test", RoleSet::from([Role::Manager]))
        .await
        .unwrap()
}

pub async fn customer(engine: &RentalEngine, email: &str) -> User {
    engine.users.add_user(email, RoleSet::new()).await.unwrap()
}

pub fn car_request(model: &str, inventory: i64, daily_fee: Decimal) -> CarRequest {
    CarRequest {
        model: model.to_owned(),
        brand: "VW".to_owned(),
        r#type: CarType::Hatchback,
        inventory,
        daily_fee,
    }
}

pub fn write_lines(lines: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(file)
}

pub fn parse_responses(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
