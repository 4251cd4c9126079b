use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type UserId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Health,
    Housing,
    Sport,
    Education,
}

impl Category {
    /// Every category, in the order reports list them.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Health,
        Category::Housing,
        Category::Sport,
        Category::Education,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Health => "health",
            Category::Housing => "housing",
            Category::Sport => "sport",
            Category::Education => "education",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

/// A validated cost, ready to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCost {
    pub description: String,
    pub category: Category,
    pub sum: f64,
    pub userid: UserId,
    pub created_at: DateTime<Utc>,
}

/// A cost as stored. The category is kept as written by the store so that
/// records which predate validation can still be read back.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Cost {
    pub id: String,
    pub description: String,
    pub category: String,
    pub sum: f64,
    pub userid: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub marital_status: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub marital_status: String,
    pub total: f64,
}

/// The public view of a user returned by lookups.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Developer {
    pub first_name: String,
    pub last_name: String,
}
