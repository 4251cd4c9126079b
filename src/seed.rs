use chrono::NaiveDate;
use tracing::info;

use crate::error::ApiError;
use crate::schemas::{NewUser, User};
use crate::store::Store;

pub fn demo_user() -> NewUser {
    NewUser {
        id: "123123".to_owned(),
        first_name: "mosh".to_owned(),
        last_name: "israeli".to_owned(),
        birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default(),
        marital_status: "single".to_owned(),
    }
}

/// Empties both collections and inserts the demo user.
pub async fn reset_database(store: &dyn Store) -> Result<User, ApiError> {
    store.clear().await?;
    info!("collections cleared");
    let user = store.insert_user(demo_user()).await?;
    info!(id = %user.id, "demo user added");
    Ok(user)
}
