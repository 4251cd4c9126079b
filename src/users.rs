use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::dates::parse_date;
use crate::error::{ApiError, ValidationError};
use crate::schemas::{Developer, NewUser, User, UserProfile};
use crate::store::Store;

pub const DEFAULT_MARITAL_STATUS: &str = "Single";

pub fn default_birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 1, 1).unwrap_or_default()
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<String>,
    pub marital_status: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let id = self
            .id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty());
        let first_name = self.first_name.filter(|name| !name.is_empty());
        let last_name = self.last_name.filter(|name| !name.is_empty());
        let (Some(id), Some(first_name), Some(last_name)) = (id, first_name, last_name) else {
            return Err(ValidationError::MissingFields);
        };

        Ok(NewUser {
            id,
            first_name,
            last_name,
            birthday: self
                .birthday
                .as_deref()
                .and_then(parse_date)
                .unwrap_or_else(default_birthday),
            marital_status: self
                .marital_status
                .filter(|status| !status.is_empty())
                .unwrap_or_else(|| DEFAULT_MARITAL_STATUS.to_owned()),
        })
    }
}

pub async fn create_user(store: &dyn Store, request: CreateUserRequest) -> Result<User, ApiError> {
    let user = store.insert_user(request.validate()?).await?;
    info!(id = %user.id, "user created");
    Ok(user)
}

/// The user's total is the sum of their recorded costs, read at lookup time.
pub async fn user_details(store: &dyn Store, id: &str) -> Result<UserProfile, ApiError> {
    let user = store.find_user(id).await?.ok_or(ApiError::NotFound)?;
    let total = store.sum_costs(&user.id).await?;
    Ok(UserProfile {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        total,
    })
}

pub fn developers() -> Vec<Developer> {
    [("Ofek", "Drihan"), ("Ziv", "Katzir")]
        .into_iter()
        .map(|(first_name, last_name)| Developer {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
        })
        .collect()
}
