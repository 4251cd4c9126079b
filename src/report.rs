//! Monthly spending report, bucketed by category.
//!
//! A report covers one calendar month in the configured local offset: from
//! the first instant of day 1 to 23:59:59.999 of the last day, both ends
//! included.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ValidationError};
use crate::schemas::{Category, Cost, UserId};
use crate::store::Store;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub id: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl ReportQuery {
    pub fn validate(self) -> Result<(UserId, Period), ValidationError> {
        let (Some(id), Some(year), Some(month)) =
            (present(self.id), present(self.year), present(self.month))
        else {
            return Err(ValidationError::MissingParams);
        };
        let year = year
            .parse::<i32>()
            .map_err(|_| ValidationError::InvalidPeriod)?;
        let month = month
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidPeriod)?;
        if !(1..=12).contains(&month) {
            return Err(ValidationError::InvalidPeriod);
        }
        Ok((id, Period { year, month }))
    }
}

impl Period {
    /// `None` when the month cannot be represented, e.g. a year out of range.
    pub fn window(self, offset: FixedOffset) -> Option<ReportWindow> {
        let first_day = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let (next_year, next_month) = if self.month == 12 {
            (self.year.checked_add(1)?, 1)
        } else {
            (self.year, self.month + 1)
        };
        // Day 0 of the next month.
        let last_day = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;

        let start = offset
            .from_local_datetime(&first_day.and_hms_opt(0, 0, 0)?)
            .single()?;
        let end = offset
            .from_local_datetime(&last_day.and_hms_milli_opt(23, 59, 59, 999)?)
            .single()?;
        Some(ReportWindow {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ReportEntry {
    pub sum: f64,
    pub description: String,
    pub day: u32,
}

/// One category and its entries, serialized as `{"<category>": [...]}`.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryBucket {
    pub category: Category,
    pub entries: Vec<ReportEntry>,
}

impl Serialize for CategoryBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.category.as_str(), &self.entries)?;
        map.end()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub userid: UserId,
    pub year: i32,
    pub month: u32,
    pub costs: Vec<CategoryBucket>,
}

#[cfg(test)]
impl MonthlyReport {
    pub fn bucket(&self, category: Category) -> &[ReportEntry] {
        self.costs
            .iter()
            .find(|bucket| bucket.category == category)
            .map(|bucket| bucket.entries.as_slice())
            .unwrap_or_default()
    }
}

/// Groups `costs` into the five fixed categories, keeping their order.
/// Costs whose category is not one of them are left out.
pub fn aggregate(
    userid: UserId,
    period: Period,
    costs: Vec<Cost>,
    offset: FixedOffset,
) -> MonthlyReport {
    let mut buckets = Category::ALL.map(|category| CategoryBucket {
        category,
        entries: Vec::new(),
    });

    for cost in costs {
        let Ok(category) = cost.category.parse::<Category>() else {
            continue;
        };
        if let Some(bucket) = buckets.iter_mut().find(|b| b.category == category) {
            bucket.entries.push(ReportEntry {
                sum: cost.sum,
                description: cost.description,
                day: cost.created_at.with_timezone(&offset).day(),
            });
        }
    }

    MonthlyReport {
        userid,
        year: period.year,
        month: period.month,
        costs: buckets.into(),
    }
}

pub async fn monthly_report(
    store: &dyn Store,
    offset: FixedOffset,
    query: ReportQuery,
) -> Result<MonthlyReport, ApiError> {
    let (userid, period) = query.validate()?;
    let window = period
        .window(offset)
        .ok_or(ValidationError::InvalidPeriod)?;

    let costs = store.find_costs(&userid, window.start, window.end).await?;
    info!(%userid, year = period.year, month = period.month, count = costs.len(), "report generated");
    Ok(aggregate(userid, period, costs, offset))
}
