use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions},
    Client, Collection, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Store, StoreError};
use crate::schemas::{Cost, NewCost, NewUser, User};

const USERS: &str = "users";
const COSTS: &str = "costs";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Deserialize, Serialize)]
struct CostDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    description: String,
    category: String,
    sum: f64,
    userid: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<CostDocument> for Cost {
    fn from(doc: CostDocument) -> Self {
        Cost {
            id: doc.id.to_hex(),
            description: doc.description,
            category: doc.category,
            sum: doc.sum,
            userid: doc.userid,
            created_at: doc.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct UserDocument {
    id: String,
    first_name: String,
    last_name: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    birthday: DateTime<Utc>,
    marital_status: String,
    #[serde(default)]
    total: f64,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User {
            id: doc.id,
            first_name: doc.first_name,
            last_name: doc.last_name,
            birthday: doc.birthday.date_naive(),
            marital_status: doc.marital_status,
            total: doc.total,
        }
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

fn as_f64(value: Option<&Bson>) -> f64 {
    match value {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => f64::from(*v),
        // Totals never get near 2^53.
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

/// Store backed by a MongoDB database.
pub struct MongoStore {
    client: Client,
    users: Collection<UserDocument>,
    costs: Collection<CostDocument>,
}

impl MongoStore {
    /// Connects to `uri`, selects `database` and makes sure `users.id` is
    /// unique.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        let store = MongoStore {
            users: db.collection(USERS),
            costs: db.collection(COSTS),
            client,
        };
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        store.users.create_index(index, None).await?;
        info!(database, "connected to MongoDB");
        Ok(store)
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_cost(&self, cost: NewCost) -> Result<Cost, StoreError> {
        let document = CostDocument {
            id: ObjectId::new(),
            description: cost.description,
            category: cost.category.to_string(),
            sum: cost.sum,
            userid: cost.userid,
            created_at: cost.created_at,
        };
        self.costs.insert_one(&document, None).await?;
        Ok(document.into())
    }

    async fn find_costs(
        &self,
        userid: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Cost>, StoreError> {
        let filter = doc! {
            "userid": userid,
            "created_at": {
                "$gte": bson::DateTime::from_chrono(start),
                "$lte": bson::DateTime::from_chrono(end),
            },
        };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1, "_id": 1 })
            .build();
        let documents: Vec<CostDocument> =
            self.costs.find(filter, options).await?.try_collect().await?;
        Ok(documents.into_iter().map(Cost::from).collect())
    }

    async fn sum_costs(&self, userid: &str) -> Result<f64, StoreError> {
        let pipeline = vec![
            doc! { "$match": { "userid": userid } },
            doc! { "$group": { "_id": Bson::Null, "total": { "$sum": "$sum" } } },
        ];
        let groups: Vec<Document> = self
            .costs
            .aggregate(pipeline, None)
            .await?
            .try_collect()
            .await?;
        Ok(groups
            .first()
            .map(|group| as_f64(group.get("total")))
            .unwrap_or(0.0))
    }

    async fn increment_user_total(&self, userid: &str, amount: f64) -> Result<bool, StoreError> {
        let result = self
            .users
            .update_one(
                doc! { "id": userid },
                doc! { "$inc": { "total": amount } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let document = UserDocument {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            birthday: midnight_utc(user.birthday),
            marital_status: user.marital_status,
            total: 0.0,
        };
        match self.users.insert_one(&document, None).await {
            Ok(_) => Ok(document.into()),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::DuplicateKey),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let found = self.users.find_one(doc! { "id": id }, None).await?;
        Ok(found.map(User::from))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.costs.delete_many(doc! {}, None).await?;
        self.users.delete_many(doc! {}, None).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cost_documents_store_bson_dates() {
        let created_at = Utc.with_ymd_and_hms(2025, 2, 15, 0, 0, 0).unwrap();
        let document = CostDocument {
            id: ObjectId::new(),
            description: "Test Food".into(),
            category: "food".into(),
            sum: 50.0,
            userid: "123123".into(),
            created_at,
        };
        let raw = bson::to_document(&document).unwrap();
        assert_eq!(
            raw.get("created_at"),
            Some(&Bson::DateTime(bson::DateTime::from_chrono(created_at)))
        );

        let cost = Cost::from(bson::from_document::<CostDocument>(raw).unwrap());
        assert_eq!(cost.created_at, created_at);
        assert_eq!(cost.category, "food");
    }

    #[test]
    fn users_without_total_default_to_zero() {
        let raw = doc! {
            "id": "7",
            "first_name": "Grace",
            "last_name": "Hopper",
            "birthday": bson::DateTime::from_chrono(midnight_utc(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())),
            "marital_status": "single",
        };
        let user = User::from(bson::from_document::<UserDocument>(raw).unwrap());
        assert_eq!(user.total, 0.0);
        assert_eq!(user.birthday, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
    }

    #[test]
    fn aggregated_totals_accept_any_numeric_type() {
        assert_eq!(as_f64(Some(&Bson::Double(1.5))), 1.5);
        assert_eq!(as_f64(Some(&Bson::Int32(3))), 3.0);
        assert_eq!(as_f64(Some(&Bson::Int64(4))), 4.0);
        assert_eq!(as_f64(None), 0.0);
    }
}
