use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::dates::timestamp_from_json;
use crate::error::{ApiError, ValidationError};
use crate::schemas::{Category, Cost, NewCost};
use crate::store::Store;

/// Raw add-cost body. Fields stay untyped until validation so that a wrongly
/// typed field is reported by the validation rules, not by the extractor.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddCostRequest {
    pub description: Option<Value>,
    pub category: Option<Value>,
    pub sum: Option<Value>,
    pub userid: Option<Value>,
    pub created_at: Option<Value>,
}

/// Strings as given, numbers in their JSON form. Blank strings count as absent.
fn text(value: Option<Value>) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!raw.trim().is_empty()).then_some(raw)
}

enum Amount {
    Absent,
    Invalid,
    Value(f64),
}

fn amount(value: Option<Value>) -> Amount {
    match value {
        None | Some(Value::Null) => Amount::Absent,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(sum) if sum == 0.0 => Amount::Absent,
            Some(sum) => Amount::Value(sum),
            None => Amount::Invalid,
        },
        Some(Value::String(s)) if s.trim().is_empty() => Amount::Absent,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_or(Amount::Invalid, Amount::Value),
        Some(_) => Amount::Invalid,
    }
}

impl AddCostRequest {
    /// Checks the category first, then presence of every field, then the sum.
    /// An unusable `created_at` is replaced by `now` rather than rejected;
    /// one without an offset is read in `local`.
    pub fn validate(
        self,
        now: DateTime<Utc>,
        local: FixedOffset,
    ) -> Result<NewCost, ValidationError> {
        let category = match &self.category {
            Some(Value::String(raw)) => raw.parse::<Category>().ok(),
            _ => None,
        }
        .ok_or(ValidationError::InvalidCategory)?;

        let description = text(self.description).map(|d| d.trim().to_owned());
        let userid = text(self.userid);
        let sum = amount(self.sum);
        let (Some(description), Some(userid)) = (description, userid) else {
            return Err(ValidationError::MissingFields);
        };
        let sum = match sum {
            Amount::Absent => return Err(ValidationError::MissingFields),
            Amount::Value(sum) if sum.is_finite() && sum > 0.0 => sum,
            Amount::Value(_) | Amount::Invalid => return Err(ValidationError::InvalidSum),
        };

        let created_at = self
            .created_at
            .as_ref()
            .and_then(|raw| timestamp_from_json(raw, local))
            .unwrap_or(now);

        Ok(NewCost {
            description,
            category,
            sum,
            userid,
            created_at,
        })
    }
}

/// Records a cost and then bumps the owner's stored total. The second write
/// is best-effort: a cost for an unknown user is still a success.
pub async fn add_cost(
    store: &dyn Store,
    local: FixedOffset,
    request: AddCostRequest,
) -> Result<Cost, ApiError> {
    let cost = request.validate(Utc::now(), local)?;
    let saved = store.insert_cost(cost).await?;

    match store.increment_user_total(&saved.userid, saved.sum).await {
        Ok(true) => {}
        Ok(false) => warn!(userid = %saved.userid, "cost recorded for unknown user"),
        Err(err) => warn!(userid = %saved.userid, error = %err, "failed to update user total"),
    }

    info!(id = %saved.id, userid = %saved.userid, category = %saved.category, sum = saved.sum, "cost added");
    Ok(saved)
}
