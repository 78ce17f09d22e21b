pub mod connection;
pub mod subscription_store;

pub use connection::{create_pool, run_migrations};
pub use subscription_store::SubscriptionStore;
