//! Delivered-order revenue over calendar windows.
//!
//! Windows are computed from a caller-supplied "today" on the server's local
//! calendar. The week is the ISO week (Monday through Sunday).

use chrono::{Datelike, Days, Months, NaiveDate};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sqlite::SqliteStore;
use fooddel_core::{Error, Result};

/// Inclusive date bounds for each revenue window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueWindows {
    pub today: NaiveDate,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
}

impl RevenueWindows {
    pub fn containing(today: NaiveDate) -> Self {
        let back = u64::from(today.weekday().num_days_from_monday());
        let week_start = today.checked_sub_days(Days::new(back)).unwrap_or(today);
        let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);

        let month_start = today.with_day(1).unwrap_or(today);
        let month_end = month_start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX);

        Self {
            today,
            week_start,
            week_end,
            month_start,
            month_end,
        }
    }
}

/// Revenue totals for one restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub today: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub total: f64,
}

impl SqliteStore {
    /// Sum `total_amount` of delivered orders for each window.
    pub fn restaurant_revenue(&self, restaurant_id: i64, today: NaiveDate) -> Result<RevenueSummary> {
        let windows = RevenueWindows::containing(today);

        let summary = RevenueSummary {
            today: self.delivered_sum(restaurant_id, Some((windows.today, windows.today)))?,
            weekly: self.delivered_sum(restaurant_id, Some((windows.week_start, windows.week_end)))?,
            monthly: self
                .delivered_sum(restaurant_id, Some((windows.month_start, windows.month_end)))?,
            total: self.delivered_sum(restaurant_id, None)?,
        };
        debug!("Revenue for restaurant {}: {:?}", restaurant_id, summary);
        Ok(summary)
    }

    fn delivered_sum(&self, restaurant_id: i64, range: Option<(NaiveDate, NaiveDate)>) -> Result<f64> {
        let conn = self.conn.lock();
        let sum = match range {
            Some((from, to)) => conn
                .prepare_cached(
                    "SELECT COALESCE(SUM(total_amount), 0.0) FROM Orders \
                     WHERE restaurant_id = ?1 AND status = 'delivered' \
                     AND date >= ?2 AND date <= ?3",
                )
                .map_err(|e| Error::Database(e.to_string()))?
                .query_row(
                    params![restaurant_id, from.to_string(), to.to_string()],
                    |row| row.get(0),
                ),
            None => conn
                .prepare_cached(
                    "SELECT COALESCE(SUM(total_amount), 0.0) FROM Orders \
                     WHERE restaurant_id = ?1 AND status = 'delivered'",
                )
                .map_err(|e| Error::Database(e.to_string()))?
                .query_row(params![restaurant_id], |row| row.get(0)),
        };
        sum.map_err(|e| Error::Database(e.to_string()))
    }
}
