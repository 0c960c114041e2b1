//! Event business logic - creating, editing and staffing events.
//!
//! Reads attach the derived status from [`crate::core::status`]; writes only
//! ever store what the caller asked for.

use crate::{
    core::{double_option, status, template},
    entities::{Document, Event, EventStaff, EventStatus, document, event, event_staff},
    errors::{Error, Result},
    storage::LocalStorage,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Fields accepted when creating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    /// Display title
    pub title: String,
    /// Calendar day
    pub date: NaiveDate,
    /// Optional start time
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// Optional end time
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Optional location
    #[serde(default)]
    pub location: Option<String>,
    /// Optional notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Initial status, `planned` when omitted
    #[serde(default)]
    pub status: Option<EventStatus>,
}

/// Partial update; `None` leaves the stored value alone. The optional
/// columns take `Some(None)` (JSON `null`) to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    /// New title
    pub title: Option<String>,
    /// New day
    pub date: Option<NaiveDate>,
    /// New start time, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub start_time: Option<Option<NaiveTime>>,
    /// New end time, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub end_time: Option<Option<NaiveTime>>,
    /// New location, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    /// New notes, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    /// New stored status
    pub status: Option<EventStatus>,
}

/// How many people of a category an event needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffNeed {
    /// Category being staffed
    pub category_id: i64,
    /// Number of people
    pub count: i32,
}

/// An event together with the status derived for today.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    /// Stored row
    #[serde(flatten)]
    pub event: event::Model,
    /// Status after applying the date rules
    pub effective_status: EventStatus,
}

impl EventView {
    /// Wraps a stored event with its status as of `today`.
    #[must_use]
    pub fn new(event: event::Model, today: NaiveDate) -> Self {
        let effective_status = status::effective_status(event.date, event.status, today);
        Self {
            event,
            effective_status,
        }
    }
}

fn validate_times(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Result<()> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(Error::validation("Event cannot end before it starts")),
        _ => Ok(()),
    }
}

/// Creates an event after validating title and times.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_event(db: &DatabaseConnection, input: NewEvent) -> Result<event::Model> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(Error::validation("Event title cannot be empty"));
    }
    validate_times(input.start_time, input.end_time)?;

    let model = event::ActiveModel {
        title: Set(title.to_string()),
        date: Set(input.date),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        location: Set(input.location),
        notes: Set(input.notes),
        status: Set(input.status.unwrap_or(EventStatus::Planned)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let event = model.insert(db).await?;
    debug!(event_id = event.id, "Event created");
    Ok(event)
}

/// Finds an event by id.
pub async fn get_event_by_id(db: &DatabaseConnection, event_id: i64) -> Result<Option<event::Model>> {
    Event::find_by_id(event_id).one(db).await.map_err(Into::into)
}

/// Finds an event by id, failing with `NotFound` when absent.
pub async fn require_event(db: &DatabaseConnection, event_id: i64) -> Result<event::Model> {
    get_event_by_id(db, event_id)
        .await?
        .ok_or_else(|| Error::not_found("Event", event_id))
}

/// All events, soonest first.
pub async fn list_events(db: &DatabaseConnection) -> Result<Vec<event::Model>> {
    Event::find()
        .order_by_asc(event::Column::Date)
        .order_by_asc(event::Column::StartTime)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies the provided fields of `patch` to an event.
pub async fn update_event(
    db: &DatabaseConnection,
    event_id: i64,
    patch: EventPatch,
) -> Result<event::Model> {
    let existing = require_event(db, event_id).await?;
    validate_times(
        patch.start_time.unwrap_or(existing.start_time),
        patch.end_time.unwrap_or(existing.end_time),
    )?;

    let mut active: event::ActiveModel = existing.into();
    if let Some(title) = patch.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(Error::validation("Event title cannot be empty"));
        }
        active.title = Set(title);
    }
    if let Some(date) = patch.date {
        active.date = Set(date);
    }
    if let Some(start) = patch.start_time {
        active.start_time = Set(start);
    }
    if let Some(end) = patch.end_time {
        active.end_time = Set(end);
    }
    if let Some(location) = patch.location {
        active.location = Set(location);
    }
    if let Some(notes) = patch.notes {
        active.notes = Set(notes);
    }
    if let Some(status) = patch.status {
        active.status = Set(status);
    }

    active.update(db).await.map_err(Into::into)
}

/// Hard-deletes an event; staff, payments, menu links, documents and filled
/// templates cascade. Their stored files are removed afterwards.
pub async fn delete_event(
    db: &DatabaseConnection,
    storage: &LocalStorage,
    event_id: i64,
) -> Result<()> {
    let mut paths = template::event_object_paths(db, event_id).await?;
    paths.extend(
        Document::find()
            .filter(document::Column::EventId.eq(event_id))
            .all(db)
            .await?
            .into_iter()
            .map(|d| d.storage_path),
    );

    let result = Event::delete_by_id(event_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Event", event_id));
    }
    for path in paths {
        if let Err(err) = storage.remove(&path).await {
            warn!(%path, error = %err, "Stored object left behind");
        }
    }
    Ok(())
}

/// Current staff needs of an event.
pub async fn get_staff(db: &DatabaseConnection, event_id: i64) -> Result<Vec<event_staff::Model>> {
    EventStaff::find()
        .filter(event_staff::Column::EventId.eq(event_id))
        .order_by_asc(event_staff::Column::CategoryId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the staff needs of an event. Entries with a zero count are dropped.
pub async fn set_staff(
    db: &DatabaseConnection,
    event_id: i64,
    needs: &[StaffNeed],
) -> Result<Vec<event_staff::Model>> {
    if let Some(bad) = needs.iter().find(|n| n.count < 0) {
        return Err(Error::validation(format!(
            "Staff count for category {} cannot be negative",
            bad.category_id
        )));
    }
    require_event(db, event_id).await?;

    let txn = db.begin().await?;
    EventStaff::delete_many()
        .filter(event_staff::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;

    for need in needs.iter().filter(|n| n.count > 0) {
        event_staff::ActiveModel {
            event_id: Set(event_id),
            category_id: Set(need.category_id),
            count: Set(need.count),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    get_staff(db, event_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_event_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = new_event("   ", test_date());
        let result = create_event(&db, input.clone()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        input.title = "Gala".to_string();
        input.start_time = NaiveTime::from_hms_opt(20, 0, 0);
        input.end_time = NaiveTime::from_hms_opt(18, 0, 0);
        let result = create_event(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(list_events(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_update_event() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Gala").await?;
        assert_eq!(event.status, EventStatus::Planned);

        let patch = EventPatch {
            location: Some(Some("Hall A".to_string())),
            ..Default::default()
        };
        let updated = update_event(&db, event.id, patch).await?;
        assert_eq!(updated.location.as_deref(), Some("Hall A"));
        assert_eq!(updated.title, "Gala");
        Ok(())
    }

    #[tokio::test]
    async fn test_patch_null_clears_optional_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = new_event("Gala", test_date());
        input.start_time = NaiveTime::from_hms_opt(18, 0, 0);
        input.location = Some("Hall A".to_string());
        input.notes = Some("Bring chairs".to_string());
        let event = create_event(&db, input).await?;

        let patch: EventPatch =
            serde_json::from_str(r#"{"location": null, "start_time": null, "title": "Gala II"}"#)?;
        assert_eq!(patch.location, Some(None));
        assert_eq!(patch.notes, None);

        let updated = update_event(&db, event.id, patch).await?;
        assert_eq!(updated.title, "Gala II");
        assert_eq!(updated.location, None);
        assert_eq!(updated.start_time, None);
        assert_eq!(updated.notes.as_deref(), Some("Bring chairs"));
        Ok(())
    }

    #[tokio::test]
    async fn test_patch_times_checked_against_stored_values() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = new_event("Gala", test_date());
        input.start_time = NaiveTime::from_hms_opt(18, 0, 0);
        let event = create_event(&db, input).await?;

        let early_end = EventPatch {
            end_time: Some(NaiveTime::from_hms_opt(17, 0, 0)),
            ..Default::default()
        };
        let result = update_event(&db, event.id, early_end).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let cleared_start = EventPatch {
            start_time: Some(None),
            end_time: Some(NaiveTime::from_hms_opt(17, 0, 0)),
            ..Default::default()
        };
        let updated = update_event(&db, event.id, cleared_start).await?;
        assert_eq!(updated.start_time, None);
        assert_eq!(updated.end_time, NaiveTime::from_hms_opt(17, 0, 0));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_event_removes_stored_files() -> Result<()> {
        use crate::core::{document, template::{self, NewTemplate, TemplateKind}};

        let db = setup_test_db().await?;
        let storage = test_storage();
        let event = create_test_event(&db, "Gala").await?;

        let doc = document::upload_document(&db, &storage, Some(event.id), "plan.png", None, b"png")
            .await?;
        let contract = template::create_template(
            &db,
            &storage,
            TemplateKind::Contract,
            NewTemplate {
                name: "Standard".to_string(),
                field_names: vec!["1".to_string()],
            },
            "standard.pdf",
            b"%PDF",
        )
        .await?;
        let filled = template::fill_template(
            &db,
            TemplateKind::Contract,
            contract.id,
            event.id,
            template::FieldData::new(),
            test_date(),
        )
        .await?;
        let generated =
            template::attach_file(&db, &storage, TemplateKind::Contract, filled.id, b"%PDF").await?;

        delete_event(&db, &storage, event.id).await?;

        assert!(storage.read(&doc.storage_path).await.is_err());
        assert!(storage.read(&generated.storage_path.unwrap()).await.is_err());
        assert_eq!(storage.read(&contract.storage_path).await?, b"%PDF");

        tokio::fs::remove_dir_all(storage.root()).await.ok();
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_event() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_event(&db, &test_storage(), 999).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Event", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_staff_replaces_needs() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Gala").await?;
        let waiters = create_test_category(&db, "Waiter").await?;
        let bar = create_test_category(&db, "Bartender").await?;

        set_staff(
            &db,
            event.id,
            &[
                StaffNeed { category_id: waiters.id, count: 4 },
                StaffNeed { category_id: bar.id, count: 1 },
            ],
        )
        .await?;

        let staff = set_staff(
            &db,
            event.id,
            &[
                StaffNeed { category_id: waiters.id, count: 6 },
                StaffNeed { category_id: bar.id, count: 0 },
            ],
        )
        .await?;

        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].category_id, waiters.id);
        assert_eq!(staff[0].count, 6);
        Ok(())
    }

    #[test]
    fn test_event_view_uses_derived_status() {
        let today = test_date();
        let model = event::Model {
            id: 1,
            title: "Old".to_string(),
            date: today.pred_opt().unwrap(),
            start_time: None,
            end_time: None,
            location: None,
            status: EventStatus::Planned,
            notes: None,
            created_at: Utc::now(),
        };
        let view = EventView::new(model, today);
        assert_eq!(view.effective_status, EventStatus::Finished);
        assert_eq!(view.event.status, EventStatus::Planned);
    }
}
