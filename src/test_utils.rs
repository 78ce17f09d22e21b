//! Shared fixtures for tests: an in-memory SQLite database with the real
//! migrations applied.

use crate::models::{Month, Subscription};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

pub async fn setup_db() -> DatabaseConnection {
    // A single connection keeps every query on the same in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn sample_subscription(
    service_name: &str,
    price: i32,
    owner_id: Uuid,
    start: &str,
    end: Option<&str>,
) -> Subscription {
    Subscription {
        id: Uuid::new_v4(),
        service_name: service_name.to_string(),
        price,
        owner_id,
        start_date: Month::parse(start).unwrap(),
        end_date: end.map(|e| Month::parse(e).unwrap()),
        created_at: Utc::now(),
    }
}
