//! Dense time series read from the rollups.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine, daily_rollups, monthly_rollups,
    util::{days_in_month, normalize_owner},
};

use super::Engine;

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 3000;

/// Granularity of a history series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// One entry per day of a month.
    Month,
    /// One entry per month of a year.
    Year,
}

/// One bucket of a history series.
///
/// `month` is the 0-based month index (0 = January). `day` is set only for
/// [`Timeframe::Month`] series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
    pub income: i64,
    pub expense: i64,
}

impl Engine {
    /// Income/expense series for a year (12 entries) or a month (one entry per
    /// calendar day). Buckets without activity are zero.
    ///
    /// `month` is 0-based and required for [`Timeframe::Month`].
    pub async fn history(
        &self,
        owner_id: &str,
        timeframe: Timeframe,
        year: i32,
        month: Option<u32>,
    ) -> ResultEngine<Vec<HistoryEntry>> {
        let owner_id = normalize_owner(owner_id)?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(EngineError::InvalidDate(format!(
                "year must be between {MIN_YEAR} and {MAX_YEAR}"
            )));
        }
        if let Some(month) = month
            && month > 11
        {
            return Err(EngineError::InvalidDate(
                "month must be between 0 and 11".to_string(),
            ));
        }

        match timeframe {
            Timeframe::Year => self.year_history(&owner_id, year).await,
            Timeframe::Month => {
                let month = month.ok_or_else(|| {
                    EngineError::InvalidDate("month is required for a month history".to_string())
                })?;
                self.month_history(&owner_id, year, month).await
            }
        }
    }

    async fn year_history(&self, owner_id: &str, year: i32) -> ResultEngine<Vec<HistoryEntry>> {
        let stored: HashMap<i32, (i64, i64)> = monthly_rollups::Entity::find()
            .filter(monthly_rollups::Column::OwnerId.eq(owner_id))
            .filter(monthly_rollups::Column::Year.eq(year))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| (m.month, (m.income, m.expense)))
            .collect();

        Ok((0..12u32)
            .map(|index| {
                let (income, expense) = stored
                    .get(&(index as i32 + 1))
                    .copied()
                    .unwrap_or_default();
                HistoryEntry {
                    year,
                    month: index,
                    day: None,
                    income,
                    expense,
                }
            })
            .collect())
    }

    async fn month_history(
        &self,
        owner_id: &str,
        year: i32,
        month: u32,
    ) -> ResultEngine<Vec<HistoryEntry>> {
        let days = days_in_month(year, month + 1)?;
        let stored: HashMap<i32, (i64, i64)> = daily_rollups::Entity::find()
            .filter(daily_rollups::Column::OwnerId.eq(owner_id))
            .filter(daily_rollups::Column::Year.eq(year))
            .filter(daily_rollups::Column::Month.eq(month as i32 + 1))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| (m.day, (m.income, m.expense)))
            .collect();

        Ok((1..=days)
            .map(|day| {
                let (income, expense) = stored.get(&(day as i32)).copied().unwrap_or_default();
                HistoryEntry {
                    year,
                    month,
                    day: Some(day),
                    income,
                    expense,
                }
            })
            .collect())
    }

    /// Years with recorded activity, ascending. Never empty: without
    /// activity the current year is returned.
    pub async fn available_years(&self, owner_id: &str) -> ResultEngine<Vec<i32>> {
        let owner_id = normalize_owner(owner_id)?;

        let years: Vec<i32> = daily_rollups::Entity::find()
            .select_only()
            .column(daily_rollups::Column::Year)
            .distinct()
            .filter(daily_rollups::Column::OwnerId.eq(owner_id))
            .order_by_asc(daily_rollups::Column::Year)
            .into_tuple()
            .all(&self.database)
            .await?;

        if years.is_empty() {
            return Ok(vec![Utc::now().year()]);
        }
        Ok(years)
    }
}
