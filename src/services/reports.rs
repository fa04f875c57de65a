use crate::{
    db::DbPool,
    entities::rental::{self, Entity as RentalEntity},
    entities::rental_item::Entity as RentalItemEntity,
    errors::ServiceError,
    services::rentals::RentalRecord,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// Reporting window granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Daily,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub customer_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub period: Option<ReportPeriod>,
}

/// Inclusive start date window for a reporting period anchored at `date`.
pub fn period_window(date: NaiveDate, period: ReportPeriod) -> (NaiveDate, NaiveDate) {
    match period {
        ReportPeriod::Daily => (date, date),
        ReportPeriod::Monthly => {
            let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .unwrap_or(date);
            let next_month = if date.month() == 12 {
                NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
            };
            let last = next_month
                .and_then(|d| d.pred_opt())
                .unwrap_or(date);
            (first, last)
        }
        ReportPeriod::Yearly => {
            let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
            let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
            (first, last)
        }
    }
}

/// Service answering rental report queries
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Filters rentals by an optional customer name fragment and an optional
    /// period window over the start date.
    #[instrument(skip(self))]
    pub async fn rental_report(&self, query: ReportQuery) -> Result<Vec<RentalRecord>, ServiceError> {
        let mut finder = RentalEntity::find();

        if let Some(name) = query.customer_name.as_deref() {
            let name = name.trim();
            if !name.is_empty() {
                let pattern = format!("%{}%", name.to_lowercase());
                finder = finder.filter(
                    Expr::expr(Func::lower(Expr::col(rental::Column::CustomerName)))
                        .like(&pattern),
                );
            }
        }

        if let (Some(date), Some(period)) = (query.date, query.period) {
            let (from, to) = period_window(date, period);
            finder = finder.filter(rental::Column::StartDate.between(from, to));
        }

        let rows = finder
            .order_by_desc(rental::Column::CreatedAt)
            .find_with_related(RentalItemEntity)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(rental, items)| RentalRecord { rental, items })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_window_is_the_anchor_date() {
        let (from, to) = period_window(date(2024, 3, 15), ReportPeriod::Daily);
        assert_eq!(from, date(2024, 3, 15));
        assert_eq!(to, date(2024, 3, 15));
    }

    #[test]
    fn monthly_window_covers_the_whole_month() {
        let (from, to) = period_window(date(2024, 2, 15), ReportPeriod::Monthly);
        assert_eq!(from, date(2024, 2, 1));
        assert_eq!(to, date(2024, 2, 29));
    }

    #[test]
    fn monthly_window_handles_december() {
        let (from, to) = period_window(date(2023, 12, 5), ReportPeriod::Monthly);
        assert_eq!(from, date(2023, 12, 1));
        assert_eq!(to, date(2023, 12, 31));
    }

    #[test]
    fn yearly_window_covers_the_whole_year() {
        let (from, to) = period_window(date(2024, 7, 4), ReportPeriod::Yearly);
        assert_eq!(from, date(2024, 1, 1));
        assert_eq!(to, date(2024, 12, 31));
    }
}
