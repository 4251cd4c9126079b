//! The document store behind the services.
//!
//! Two collections are kept: `users`, unique on `id`, and `costs`, which
//! reference a user through the plain `userid` field. Nothing enforces that
//! reference; a cost may name a user that does not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::schemas::{Cost, NewCost, NewUser, User};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key")]
    DuplicateKey,
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_cost(&self, cost: NewCost) -> Result<Cost, StoreError>;

    /// Costs of `userid` created within `[start, end]`, oldest first.
    async fn find_costs(
        &self,
        userid: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Cost>, StoreError>;

    async fn sum_costs(&self, userid: &str) -> Result<f64, StoreError>;

    /// Atomically adds `amount` to the stored total of the user. Returns
    /// `false` when no user has that id.
    async fn increment_user_total(&self, userid: &str, amount: f64) -> Result<bool, StoreError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Removes every user and cost.
    async fn clear(&self) -> Result<(), StoreError>;

    async fn shutdown(&self);
}
