//! Period reports and the date-range parsing shared with `transactions list`.

use chrono::{Days, NaiveDate, TimeZone, Utc};
use clipper_core::report::{ReportPeriod, RevenueReport};
use clipper_db::Session;

use crate::error::ApiError;

/// Turns an inclusive day range into a half-open UTC period.
///
/// `from` defaults to `today`; `to` defaults to `from`. So no flags means
/// "today", and `--from 2026-10-01` alone means that single day.
pub fn period_from_dates(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<ReportPeriod, ApiError> {
    let first = from.unwrap_or(today);
    let last = to.unwrap_or(first);

    if last < first {
        return Err(ApiError::validation(format!(
            "--to ({}) is before --from ({})",
            last, first
        )));
    }

    let end = last
        .checked_add_days(Days::new(1))
        .ok_or_else(|| ApiError::validation("date out of range"))?;

    let start_at = Utc.from_utc_datetime(&first.and_time(chrono::NaiveTime::MIN));
    let end_at = Utc.from_utc_datetime(&end.and_time(chrono::NaiveTime::MIN));

    ReportPeriod::new(start_at, end_at).map_err(|e| ApiError::validation(e.to_string()))
}

pub async fn summary(session: &Session, period: &ReportPeriod) -> Result<RevenueReport, ApiError> {
    Ok(session.report(period).await?)
}
