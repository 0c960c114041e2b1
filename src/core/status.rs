//! Event status derivation.
//!
//! The status users see is derived on every read from the stored status and
//! the calendar day; it is not written back automatically. The separate
//! [`should_auto_finalize`] predicate says when the stored row itself is stale,
//! and [`finalize_past_events`] applies it. The last finalize day is kept in
//! the `system_state` table so the startup pass runs at most once per day.

use crate::{
    entities::{Event, EventStatus, SystemState, event, system_state},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Set, prelude::*};
use std::cmp::Ordering;
use tracing::{debug, info};

const LAST_AUTO_FINALIZE_KEY: &str = "last_auto_finalize";

/// Derives the effective status of an event on `today`.
///
/// 1. `cancelled` and `finished` are terminal and returned as stored.
/// 2. A future event stays `in_progress` if it was started manually,
///    otherwise it is `planned`.
/// 3. An event on `today` is `in_progress`.
/// 4. A past event is `finished`.
#[must_use]
pub fn effective_status(date: NaiveDate, stored: EventStatus, today: NaiveDate) -> EventStatus {
    match stored {
        EventStatus::Cancelled | EventStatus::Finished => stored,
        EventStatus::Planned | EventStatus::InProgress => match date.cmp(&today) {
            Ordering::Greater if stored == EventStatus::InProgress => EventStatus::InProgress,
            Ordering::Greater => EventStatus::Planned,
            Ordering::Equal => EventStatus::InProgress,
            Ordering::Less => EventStatus::Finished,
        },
    }
}

/// True when the stored row should be rewritten as `finished`.
#[must_use]
pub fn should_auto_finalize(date: NaiveDate, stored: EventStatus, today: NaiveDate) -> bool {
    !matches!(stored, EventStatus::Cancelled | EventStatus::Finished) && date < today
}

/// Today's calendar day in UTC.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Writes `finished` to every stored event whose day has passed.
///
/// Returns the ids of the events that were updated.
pub async fn finalize_past_events(db: &DatabaseConnection, today: NaiveDate) -> Result<Vec<i64>> {
    let stale: Vec<i64> = Event::find()
        .filter(event::Column::Date.lt(today))
        .filter(
            event::Column::Status.is_in([EventStatus::Planned, EventStatus::InProgress]),
        )
        .all(db)
        .await?
        .into_iter()
        .filter(|e| should_auto_finalize(e.date, e.status, today))
        .map(|e| e.id)
        .collect();

    if !stale.is_empty() {
        Event::update_many()
            .col_expr(event::Column::Status, Expr::value(EventStatus::Finished))
            .filter(event::Column::Id.is_in(stale.clone()))
            .exec(db)
            .await?;
        info!(count = stale.len(), "Auto-finalized past events");
    }

    set_last_auto_finalize_date(db, today).await?;
    Ok(stale)
}

/// Runs [`finalize_past_events`] unless it already ran on `today`.
pub async fn finalize_if_needed(db: &DatabaseConnection, today: NaiveDate) -> Result<Vec<i64>> {
    if get_last_auto_finalize_date(db).await? == Some(today) {
        debug!("Auto-finalize already ran today");
        return Ok(Vec::new());
    }
    finalize_past_events(db, today).await
}

/// Retrieves the day of the last auto-finalize pass, if any.
pub async fn get_last_auto_finalize_date(db: &DatabaseConnection) -> Result<Option<NaiveDate>> {
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_AUTO_FINALIZE_KEY))
        .one(db)
        .await?;

    match state {
        Some(s) => NaiveDate::parse_from_str(&s.value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| Error::Config {
                message: format!("Failed to parse last auto-finalize date: {e}"),
            }),
        None => Ok(None),
    }
}

async fn set_last_auto_finalize_date(db: &DatabaseConnection, date: NaiveDate) -> Result<()> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let now = Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_AUTO_FINALIZE_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(date_str);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        system_state::ActiveModel {
            key: Set(LAST_AUTO_FINALIZE_KEY.to_string()),
            value: Set(date_str),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use crate::entities::EventStatus::{Cancelled, Finished, InProgress, Planned};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_past_open_events_are_finished() {
        let today = day(2024, 6, 10);
        for stored in [Planned, InProgress] {
            assert_eq!(effective_status(day(2024, 6, 9), stored, today), Finished);
            assert_eq!(effective_status(day(2020, 1, 1), stored, today), Finished);
        }
    }

    #[test]
    fn test_terminal_statuses_never_change() {
        let today = day(2024, 6, 10);
        for date in [day(2024, 6, 9), today, day(2024, 6, 11)] {
            assert_eq!(effective_status(date, Cancelled, today), Cancelled);
            assert_eq!(effective_status(date, Finished, today), Finished);
        }
    }

    #[test]
    fn test_today_is_in_progress() {
        let today = day(2024, 6, 10);
        assert_eq!(effective_status(today, Planned, today), InProgress);
        assert_eq!(effective_status(today, InProgress, today), InProgress);
    }

    #[test]
    fn test_future_keeps_manual_start() {
        let today = day(2024, 6, 10);
        let tomorrow = day(2024, 6, 11);
        assert_eq!(effective_status(tomorrow, Planned, today), Planned);
        assert_eq!(effective_status(tomorrow, InProgress, today), InProgress);
    }

    #[test]
    fn test_year_boundary() {
        assert_eq!(
            effective_status(day(2023, 12, 31), Planned, day(2024, 1, 1)),
            Finished
        );
    }

    #[test]
    fn test_should_auto_finalize() {
        let today = day(2024, 6, 10);
        assert!(should_auto_finalize(day(2024, 6, 9), Planned, today));
        assert!(should_auto_finalize(day(2024, 6, 9), InProgress, today));
        assert!(!should_auto_finalize(day(2024, 6, 9), Cancelled, today));
        assert!(!should_auto_finalize(day(2024, 6, 9), Finished, today));
        assert!(!should_auto_finalize(today, Planned, today));
    }

    #[tokio::test]
    async fn test_finalize_past_events_updates_only_stale_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let today = day(2024, 6, 10);

        let past = create_custom_event(&db, "Past", day(2024, 6, 1), Planned).await?;
        let cancelled = create_custom_event(&db, "Off", day(2024, 6, 1), Cancelled).await?;
        let future = create_custom_event(&db, "Future", day(2024, 7, 1), Planned).await?;

        let updated = finalize_past_events(&db, today).await?;
        assert_eq!(updated, vec![past.id]);

        let reload = |id: i64| Event::find_by_id(id).one(&db);
        assert_eq!(reload(past.id).await?.unwrap().status, Finished);
        assert_eq!(reload(cancelled.id).await?.unwrap().status, Cancelled);
        assert_eq!(reload(future.id).await?.unwrap().status, Planned);

        assert_eq!(get_last_auto_finalize_date(&db).await?, Some(today));
        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_if_needed_runs_once_per_day() -> Result<()> {
        let db = setup_test_db().await?;
        let today = day(2024, 6, 10);

        finalize_if_needed(&db, today).await?;
        let late = create_custom_event(&db, "Late", day(2024, 6, 1), Planned).await?;

        assert!(finalize_if_needed(&db, today).await?.is_empty());
        assert_eq!(finalize_if_needed(&db, day(2024, 6, 11)).await?, vec![late.id]);
        Ok(())
    }
}
