use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{Store, StoreError};
use crate::schemas::{Cost, NewCost, NewUser, User};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    costs: Vec<Cost>,
}

/// In-process store with the same observable behaviour as [`super::MongoStore`].
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_cost(&self, cost: NewCost) -> Result<Cost, StoreError> {
        let cost = Cost {
            id: ObjectId::new().to_hex(),
            description: cost.description,
            category: cost.category.to_string(),
            sum: cost.sum,
            userid: cost.userid,
            created_at: cost.created_at,
        };
        self.collections.lock().await.costs.push(cost.clone());
        Ok(cost)
    }

    async fn find_costs(
        &self,
        userid: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Cost>, StoreError> {
        let collections = self.collections.lock().await;
        let mut costs = collections
            .costs
            .iter()
            .filter(|cost| cost.userid == userid)
            .filter(|cost| cost.created_at >= start && cost.created_at <= end)
            .cloned()
            .collect::<Vec<_>>();
        costs.sort_by_key(|cost| cost.created_at);
        Ok(costs)
    }

    async fn sum_costs(&self, userid: &str) -> Result<f64, StoreError> {
        let collections = self.collections.lock().await;
        Ok(collections
            .costs
            .iter()
            .filter(|cost| cost.userid == userid)
            .map(|cost| cost.sum)
            .sum())
    }

    async fn increment_user_total(&self, userid: &str, amount: f64) -> Result<bool, StoreError> {
        let mut collections = self.collections.lock().await;
        match collections.users.iter_mut().find(|user| user.id == userid) {
            Some(user) => {
                user.total += amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut collections = self.collections.lock().await;
        if collections.users.iter().any(|existing| existing.id == user.id) {
            return Err(StoreError::DuplicateKey);
        }
        let user = User {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            birthday: user.birthday,
            marital_status: user.marital_status,
            total: 0.0,
        };
        collections.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let collections = self.collections.lock().await;
        Ok(collections.users.iter().find(|user| user.id == id).cloned())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().await;
        collections.users.clear();
        collections.costs.clear();
        Ok(())
    }

    async fn shutdown(&self) {}
}
