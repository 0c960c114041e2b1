//! Contract and budget templates.
//!
//! A template is an uploaded PDF form plus the names of its fields. Filling
//! one for an event builds a flat field → value record from the event,
//! merges caller overrides on top, and keeps only the template's own fields:
//! unmatched fields stay blank, extra keys are dropped. Producing the PDF
//! itself happens outside this service; the finished file is attached back
//! with [`attach_file`].
//!
//! Contracts and budgets live in separate tables but share every operation.
//! Rows of either family are read into [`Template`] and [`FilledTemplate`];
//! only the small row helpers at the bottom of this module look at
//! [`TemplateKind`] to pick a table. Every stored object (blank forms and
//! generated files) is removed again when the row that owns it goes away.

use crate::{
    core::{event::require_event, payment},
    entities::{
        BudgetTemplate, ContractTemplate, EventStaff, FilledBudget, FilledContract, WorkflowStatus,
        budget_template, contract_template, event, event_staff, filled_budget, filled_contract,
    },
    errors::{Error, Result},
    storage::{LocalStorage, StoredObject},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue::Unchanged, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, instrument, warn};

/// Flat form data, field name → value.
pub type FieldData = BTreeMap<String, String>;

/// Which template family an operation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Service contracts
    Contract,
    /// Budgets / quotes
    Budget,
}

impl TemplateKind {
    /// Storage folder for blank forms and generated files.
    const fn folder(self) -> &'static str {
        match self {
            Self::Contract => "contracts",
            Self::Budget => "budgets",
        }
    }

    const fn template_entity(self) -> &'static str {
        match self {
            Self::Contract => "ContractTemplate",
            Self::Budget => "BudgetTemplate",
        }
    }

    const fn filled_entity(self) -> &'static str {
        match self {
            Self::Contract => "FilledContract",
            Self::Budget => "FilledBudget",
        }
    }

    /// The event record this family's forms are filled from.
    #[must_use]
    pub fn record(self, facts: &EventFacts, today: NaiveDate) -> FieldData {
        match self {
            Self::Contract => contract_data(facts, today),
            Self::Budget => budget_data(facts, today),
        }
    }
}

/// A blank form of either family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Row id within its family's table
    pub id: i64,
    /// Family the template belongs to
    pub kind: TemplateKind,
    /// Template name
    pub name: String,
    /// Public URL of the blank form
    pub file_url: String,
    /// Object path of the blank form in storage
    pub storage_path: String,
    /// Form field names
    pub field_names: Vec<String>,
    /// When the template was uploaded
    pub created_at: DateTime<Utc>,
}

/// One event's values for a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilledTemplate {
    /// Row id within its family's table
    pub id: i64,
    /// Family the instance belongs to
    pub kind: TemplateKind,
    /// Template being filled
    pub template_id: i64,
    /// Event the values were taken from
    pub event_id: i64,
    /// Field name → value
    pub field_data: FieldData,
    /// Public URL of the generated file, once produced
    pub file_url: Option<String>,
    /// Object path of the generated file in storage
    pub storage_path: Option<String>,
    /// Review status
    pub status: WorkflowStatus,
    /// When the row was created
    pub created_at: DateTime<Utc>,
}

impl TryFrom<contract_template::Model> for Template {
    type Error = Error;

    fn try_from(model: contract_template::Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            kind: TemplateKind::Contract,
            name: model.name,
            file_url: model.file_url,
            storage_path: model.storage_path,
            field_names: serde_json::from_value(model.field_names)?,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<budget_template::Model> for Template {
    type Error = Error;

    fn try_from(model: budget_template::Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            kind: TemplateKind::Budget,
            name: model.name,
            file_url: model.file_url,
            storage_path: model.storage_path,
            field_names: serde_json::from_value(model.field_names)?,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<filled_contract::Model> for FilledTemplate {
    type Error = Error;

    fn try_from(model: filled_contract::Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            kind: TemplateKind::Contract,
            template_id: model.template_id,
            event_id: model.event_id,
            field_data: serde_json::from_value(model.field_data)?,
            file_url: model.file_url,
            storage_path: model.storage_path,
            status: model.status,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<filled_budget::Model> for FilledTemplate {
    type Error = Error;

    fn try_from(model: filled_budget::Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            kind: TemplateKind::Budget,
            template_id: model.template_id,
            event_id: model.event_id,
            field_data: serde_json::from_value(model.field_data)?,
            file_url: model.file_url,
            storage_path: model.storage_path,
            status: model.status,
            created_at: model.created_at,
        })
    }
}

/// Facts about an event that templates draw on.
#[derive(Debug, Clone)]
pub struct EventFacts {
    /// The event row
    pub event: event::Model,
    /// Sum of staff counts
    pub staff_total: i64,
    /// Sum of payment amounts
    pub payments_total: f64,
}

/// Keeps exactly `template_fields`, taking values from `data` and leaving
/// the rest blank.
#[must_use]
pub fn fill_fields(template_fields: &[String], data: &FieldData) -> FieldData {
    template_fields
        .iter()
        .map(|field| (field.clone(), data.get(field).cloned().unwrap_or_default()))
        .collect()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn format_money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Contract record: numbered form fields plus a couple of named ones.
#[must_use]
pub fn contract_data(facts: &EventFacts, today: NaiveDate) -> FieldData {
    let event = &facts.event;
    let time = |t: Option<chrono::NaiveTime>| t.map(|t| t.format("%H:%M").to_string()).unwrap_or_default();

    BTreeMap::from([
        ("1".to_string(), event.title.clone()),
        ("2".to_string(), format_date(event.date)),
        ("3".to_string(), time(event.start_time)),
        ("4".to_string(), time(event.end_time)),
        ("5".to_string(), event.location.clone().unwrap_or_default()),
        ("6".to_string(), facts.staff_total.to_string()),
        ("7".to_string(), format_money(facts.payments_total)),
        ("event_title".to_string(), event.title.clone()),
        ("signature_date".to_string(), format_date(today)),
    ])
}

/// Budget record keyed by literal field names.
#[must_use]
pub fn budget_data(facts: &EventFacts, today: NaiveDate) -> FieldData {
    let event = &facts.event;
    BTreeMap::from([
        ("event_title".to_string(), event.title.clone()),
        ("event_date".to_string(), format_date(event.date)),
        ("location".to_string(), event.location.clone().unwrap_or_default()),
        ("staff_count".to_string(), facts.staff_total.to_string()),
        ("staff_cost".to_string(), format_money(facts.payments_total)),
        ("issue_date".to_string(), format_date(today)),
    ])
}

/// Loads the facts templates need about an event.
pub async fn event_facts(db: &DatabaseConnection, event_id: i64) -> Result<EventFacts> {
    let event = require_event(db, event_id).await?;
    let staff_total = EventStaff::find()
        .filter(event_staff::Column::EventId.eq(event_id))
        .all(db)
        .await?
        .iter()
        .map(|s| i64::from(s.count))
        .sum();
    // fold from +0.0; an empty f64 sum is -0.0 and would print as "-0.00"
    let payments_total = payment::list_for_event(db, event_id)
        .await?
        .iter()
        .fold(0.0, |acc, p| acc + p.payment.amount);
    Ok(EventFacts {
        event,
        staff_total,
        payments_total,
    })
}

/// The `kind` record for an event, before any template narrows it.
pub async fn record_for_event(
    db: &DatabaseConnection,
    kind: TemplateKind,
    event_id: i64,
    today: NaiveDate,
) -> Result<FieldData> {
    Ok(kind.record(&event_facts(db, event_id).await?, today))
}

/// Trims names, drops blanks and duplicates, and requires at least one field.
fn clean_field_names(names: Vec<String>) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let cleaned: Vec<String> = names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .collect();
    if cleaned.is_empty() {
        return Err(Error::validation("A template needs at least one field"));
    }
    Ok(cleaned)
}

fn check_status_change(has_file: bool, next: WorkflowStatus) -> Result<()> {
    if next != WorkflowStatus::Draft && !has_file {
        return Err(Error::validation(
            "Attach the generated file before moving past draft",
        ));
    }
    Ok(())
}

/// Removes stored objects whose rows are already gone.
async fn remove_objects(storage: &LocalStorage, paths: impl IntoIterator<Item = String>) {
    for path in paths {
        if let Err(err) = storage.remove(&path).await {
            warn!(%path, error = %err, "Stored object left behind");
        }
    }
}

/// Template metadata accepted on upload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
    /// Template name
    pub name: String,
    /// Names of the form fields
    pub field_names: Vec<String>,
}

/// Stores a blank form and records it as a `kind` template.
#[instrument(skip(db, storage, input, bytes), fields(name = %input.name))]
pub async fn create_template(
    db: &DatabaseConnection,
    storage: &LocalStorage,
    kind: TemplateKind,
    input: NewTemplate,
    file_name: &str,
    bytes: &[u8],
) -> Result<Template> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Template name cannot be empty"));
    }
    if bytes.is_empty() {
        return Err(Error::validation("Template file is empty"));
    }
    let fields = serde_json::to_value(clean_field_names(input.field_names)?)?;

    let stored = storage.upload(kind.folder(), file_name, bytes).await?;
    match insert_template(db, kind, name, &stored, fields).await {
        Ok(template) => Ok(template),
        Err(err) => {
            remove_objects(storage, [stored.path]).await;
            Err(err)
        }
    }
}

/// All `kind` templates, newest first.
pub async fn list_templates(db: &DatabaseConnection, kind: TemplateKind) -> Result<Vec<Template>> {
    match kind {
        TemplateKind::Contract => ContractTemplate::find()
            .order_by_desc(contract_template::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(Template::try_from)
            .collect(),
        TemplateKind::Budget => BudgetTemplate::find()
            .order_by_desc(budget_template::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(Template::try_from)
            .collect(),
    }
}

/// Deletes a template with its filled instances, then their stored files.
#[instrument(skip(db, storage))]
pub async fn delete_template(
    db: &DatabaseConnection,
    storage: &LocalStorage,
    kind: TemplateKind,
    template_id: i64,
) -> Result<()> {
    let template = find_template(db, kind, template_id).await?;
    let filled = filled_of_template(db, kind, template_id).await?;

    let txn = db.begin().await?;
    delete_template_rows(&txn, kind, template_id).await?;
    txn.commit().await?;

    info!(filled = filled.len(), "Template deleted");
    let paths = filled.into_iter().filter_map(|f| f.storage_path);
    remove_objects(storage, std::iter::once(template.storage_path).chain(paths)).await;
    Ok(())
}

/// Fills a `kind` template for an event as a new draft.
pub async fn fill_template(
    db: &DatabaseConnection,
    kind: TemplateKind,
    template_id: i64,
    event_id: i64,
    overrides: FieldData,
    today: NaiveDate,
) -> Result<FilledTemplate> {
    let template = find_template(db, kind, template_id).await?;
    let facts = event_facts(db, event_id).await?;

    let mut data = kind.record(&facts, today);
    data.extend(overrides);
    let record = serde_json::to_value(fill_fields(&template.field_names, &data))?;

    insert_filled(db, kind, template_id, event_id, record).await
}

/// Stores the generated file and marks the instance generated. A file
/// attached earlier is replaced and removed from storage.
#[instrument(skip(db, storage, bytes), fields(size = bytes.len()))]
pub async fn attach_file(
    db: &DatabaseConnection,
    storage: &LocalStorage,
    kind: TemplateKind,
    filled_id: i64,
    bytes: &[u8],
) -> Result<FilledTemplate> {
    if bytes.is_empty() {
        return Err(Error::validation("Generated file is empty"));
    }
    let mut filled = find_filled(db, kind, filled_id).await?;
    let file_name = format!("{}-{filled_id}.pdf", kind.folder().trim_end_matches('s'));
    let stored = storage.upload(kind.folder(), &file_name, bytes).await?;

    let previous = filled.storage_path.replace(stored.path.clone());
    filled.file_url = Some(stored.url);
    filled.status = WorkflowStatus::Generated;

    match update_filled(db, &filled).await {
        Ok(updated) => {
            remove_objects(storage, previous).await;
            Ok(updated)
        }
        Err(err) => {
            remove_objects(storage, [stored.path]).await;
            Err(err)
        }
    }
}

/// Moves a filled instance through its workflow.
pub async fn set_status(
    db: &DatabaseConnection,
    kind: TemplateKind,
    filled_id: i64,
    status: WorkflowStatus,
) -> Result<FilledTemplate> {
    let mut filled = find_filled(db, kind, filled_id).await?;
    check_status_change(filled.storage_path.is_some(), status)?;
    filled.status = status;
    update_filled(db, &filled).await
}

/// Filled `kind` instances of an event.
pub async fn list_filled(
    db: &DatabaseConnection,
    kind: TemplateKind,
    event_id: i64,
) -> Result<Vec<FilledTemplate>> {
    match kind {
        TemplateKind::Contract => FilledContract::find()
            .filter(filled_contract::Column::EventId.eq(event_id))
            .order_by_asc(filled_contract::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(FilledTemplate::try_from)
            .collect(),
        TemplateKind::Budget => FilledBudget::find()
            .filter(filled_budget::Column::EventId.eq(event_id))
            .order_by_asc(filled_budget::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(FilledTemplate::try_from)
            .collect(),
    }
}

/// Deletes a filled instance and its generated file.
pub async fn delete_filled(
    db: &DatabaseConnection,
    storage: &LocalStorage,
    kind: TemplateKind,
    filled_id: i64,
) -> Result<()> {
    let filled = find_filled(db, kind, filled_id).await?;
    let rows = match kind {
        TemplateKind::Contract => FilledContract::delete_by_id(filled_id).exec(db).await?,
        TemplateKind::Budget => FilledBudget::delete_by_id(filled_id).exec(db).await?,
    }
    .rows_affected;
    if rows == 0 {
        return Err(Error::not_found(kind.filled_entity(), filled_id));
    }
    remove_objects(storage, filled.storage_path).await;
    Ok(())
}

/// Generated file paths of every filled instance of an event, both families.
pub async fn event_object_paths(db: &DatabaseConnection, event_id: i64) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for kind in [TemplateKind::Contract, TemplateKind::Budget] {
        paths.extend(
            list_filled(db, kind, event_id)
                .await?
                .into_iter()
                .filter_map(|f| f.storage_path),
        );
    }
    Ok(paths)
}

// ---------------------------------------------------------------------------
// Row helpers, one table per family
// ---------------------------------------------------------------------------

async fn insert_template(
    db: &DatabaseConnection,
    kind: TemplateKind,
    name: String,
    stored: &StoredObject,
    field_names: Json,
) -> Result<Template> {
    match kind {
        TemplateKind::Contract => contract_template::ActiveModel {
            name: Set(name),
            file_url: Set(stored.url.clone()),
            storage_path: Set(stored.path.clone()),
            field_names: Set(field_names),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?
        .try_into(),
        TemplateKind::Budget => budget_template::ActiveModel {
            name: Set(name),
            file_url: Set(stored.url.clone()),
            storage_path: Set(stored.path.clone()),
            field_names: Set(field_names),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?
        .try_into(),
    }
}

async fn find_template(db: &DatabaseConnection, kind: TemplateKind, id: i64) -> Result<Template> {
    let found = match kind {
        TemplateKind::Contract => ContractTemplate::find_by_id(id)
            .one(db)
            .await?
            .map(Template::try_from)
            .transpose()?,
        TemplateKind::Budget => BudgetTemplate::find_by_id(id)
            .one(db)
            .await?
            .map(Template::try_from)
            .transpose()?,
    };
    found.ok_or_else(|| Error::not_found(kind.template_entity(), id))
}

async fn delete_template_rows<C: ConnectionTrait>(
    db: &C,
    kind: TemplateKind,
    template_id: i64,
) -> Result<()> {
    match kind {
        TemplateKind::Contract => {
            FilledContract::delete_many()
                .filter(filled_contract::Column::TemplateId.eq(template_id))
                .exec(db)
                .await?;
            ContractTemplate::delete_by_id(template_id).exec(db).await?;
        }
        TemplateKind::Budget => {
            FilledBudget::delete_many()
                .filter(filled_budget::Column::TemplateId.eq(template_id))
                .exec(db)
                .await?;
            BudgetTemplate::delete_by_id(template_id).exec(db).await?;
        }
    }
    Ok(())
}

async fn insert_filled(
    db: &DatabaseConnection,
    kind: TemplateKind,
    template_id: i64,
    event_id: i64,
    field_data: Json,
) -> Result<FilledTemplate> {
    match kind {
        TemplateKind::Contract => filled_contract::ActiveModel {
            template_id: Set(template_id),
            event_id: Set(event_id),
            field_data: Set(field_data),
            file_url: Set(None),
            storage_path: Set(None),
            status: Set(WorkflowStatus::Draft),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?
        .try_into(),
        TemplateKind::Budget => filled_budget::ActiveModel {
            template_id: Set(template_id),
            event_id: Set(event_id),
            field_data: Set(field_data),
            file_url: Set(None),
            storage_path: Set(None),
            status: Set(WorkflowStatus::Draft),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?
        .try_into(),
    }
}

async fn find_filled(db: &DatabaseConnection, kind: TemplateKind, id: i64) -> Result<FilledTemplate> {
    let found = match kind {
        TemplateKind::Contract => FilledContract::find_by_id(id)
            .one(db)
            .await?
            .map(FilledTemplate::try_from)
            .transpose()?,
        TemplateKind::Budget => FilledBudget::find_by_id(id)
            .one(db)
            .await?
            .map(FilledTemplate::try_from)
            .transpose()?,
    };
    found.ok_or_else(|| Error::not_found(kind.filled_entity(), id))
}

async fn filled_of_template(
    db: &DatabaseConnection,
    kind: TemplateKind,
    template_id: i64,
) -> Result<Vec<FilledTemplate>> {
    match kind {
        TemplateKind::Contract => FilledContract::find()
            .filter(filled_contract::Column::TemplateId.eq(template_id))
            .all(db)
            .await?
            .into_iter()
            .map(FilledTemplate::try_from)
            .collect(),
        TemplateKind::Budget => FilledBudget::find()
            .filter(filled_budget::Column::TemplateId.eq(template_id))
            .all(db)
            .await?
            .into_iter()
            .map(FilledTemplate::try_from)
            .collect(),
    }
}

/// Writes the file and status columns of `filled`.
async fn update_filled(db: &DatabaseConnection, filled: &FilledTemplate) -> Result<FilledTemplate> {
    match filled.kind {
        TemplateKind::Contract => filled_contract::ActiveModel {
            id: Unchanged(filled.id),
            file_url: Set(filled.file_url.clone()),
            storage_path: Set(filled.storage_path.clone()),
            status: Set(filled.status),
            ..Default::default()
        }
        .update(db)
        .await?
        .try_into(),
        TemplateKind::Budget => filled_budget::ActiveModel {
            id: Unchanged(filled.id),
            file_url: Set(filled.file_url.clone()),
            storage_path: Set(filled.storage_path.clone()),
            status: Set(filled.status),
            ..Default::default()
        }
        .update(db)
        .await?
        .try_into(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::event::{StaffNeed, set_staff};
    use crate::test_utils::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    async fn upload(
        db: &DatabaseConnection,
        storage: &LocalStorage,
        kind: TemplateKind,
        names: &[&str],
    ) -> Result<Template> {
        create_template(
            db,
            storage,
            kind,
            NewTemplate {
                name: "Standard".to_string(),
                field_names: fields(names),
            },
            "standard.pdf",
            b"%PDF",
        )
        .await
    }

    #[test]
    fn test_fill_fields_blank_and_drop() {
        let data = BTreeMap::from([
            ("1".to_string(), "Gala".to_string()),
            ("extra".to_string(), "ignored".to_string()),
        ]);
        let filled = fill_fields(&fields(&["1", "2"]), &data);

        assert_eq!(filled.len(), 2);
        assert_eq!(filled["1"], "Gala");
        assert_eq!(filled["2"], "");
        assert!(!filled.contains_key("extra"));
    }

    #[test]
    fn test_clean_field_names() {
        let cleaned = clean_field_names(fields(&[" a ", "", "b", "a"])).unwrap();
        assert_eq!(cleaned, fields(&["a", "b"]));
        assert!(clean_field_names(fields(&["  "])).is_err());
    }

    #[test]
    fn test_status_needs_file() {
        assert!(check_status_change(false, WorkflowStatus::Draft).is_ok());
        assert!(check_status_change(false, WorkflowStatus::Sent).is_err());
        assert!(check_status_change(true, WorkflowStatus::Accepted).is_ok());
    }

    #[tokio::test]
    async fn test_fill_contract_for_event() -> Result<()> {
        let (db, event, person) = setup_with_person().await?;
        let storage = test_storage();
        set_staff(
            &db,
            event.id,
            &[StaffNeed {
                category_id: person.category_id,
                count: 3,
            }],
        )
        .await?;
        create_test_payment(&db, event.id, person.id, 150.0).await?;

        let template = upload(
            &db,
            &storage,
            TemplateKind::Contract,
            &["1", "2", "6", "7", "client_name", "unknown"],
        )
        .await?;
        assert_eq!(template.kind, TemplateKind::Contract);
        assert_eq!(storage.read(&template.storage_path).await?, b"%PDF");

        let overrides = BTreeMap::from([
            ("client_name".to_string(), "Maria".to_string()),
            ("not_a_field".to_string(), "x".to_string()),
        ]);
        let filled = fill_template(
            &db,
            TemplateKind::Contract,
            template.id,
            event.id,
            overrides,
            test_date(),
        )
        .await?;
        let data = &filled.field_data;

        assert_eq!(data.len(), 6);
        assert_eq!(data["1"], "Test Event");
        assert_eq!(data["2"], format_date(test_date()));
        assert_eq!(data["6"], "3");
        assert_eq!(data["7"], "150.00");
        assert_eq!(data["client_name"], "Maria");
        assert_eq!(data["unknown"], "");
        assert_eq!(filled.status, WorkflowStatus::Draft);

        let sent = set_status(&db, TemplateKind::Contract, filled.id, WorkflowStatus::Sent).await;
        assert!(matches!(sent, Err(Error::Validation { .. })));

        let generated =
            attach_file(&db, &storage, TemplateKind::Contract, filled.id, b"%PDF filled").await?;
        assert_eq!(generated.status, WorkflowStatus::Generated);
        assert!(generated.file_url.is_some());
        let sent = set_status(&db, TemplateKind::Contract, filled.id, WorkflowStatus::Sent).await?;
        assert_eq!(sent.status, WorkflowStatus::Sent);
        assert_eq!(sent.storage_path, generated.storage_path);

        tokio::fs::remove_dir_all(storage.root()).await.ok();
        Ok(())
    }

    #[tokio::test]
    async fn test_fill_budget_for_event() -> Result<()> {
        let db = setup_test_db().await?;
        let storage = test_storage();
        let event = create_test_event(&db, "Gala").await?;

        let template = upload(&db, &storage, TemplateKind::Budget, &["event_title", "staff_cost"]).await?;
        let filled = fill_template(
            &db,
            TemplateKind::Budget,
            template.id,
            event.id,
            FieldData::new(),
            test_date(),
        )
        .await?;

        assert_eq!(filled.field_data["event_title"], "Gala");
        assert_eq!(filled.field_data["staff_cost"], "0.00");
        assert_eq!(list_filled(&db, TemplateKind::Budget, event.id).await?.len(), 1);
        assert!(list_filled(&db, TemplateKind::Contract, event.id).await?.is_empty());

        tokio::fs::remove_dir_all(storage.root()).await.ok();
        Ok(())
    }

    #[tokio::test]
    async fn test_record_without_payments_is_positive_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Gala").await?;

        let facts = event_facts(&db, event.id).await?;
        assert!(facts.payments_total.is_sign_positive());

        let budget = record_for_event(&db, TemplateKind::Budget, event.id, test_date()).await?;
        assert_eq!(budget["staff_cost"], "0.00");
        let contract = record_for_event(&db, TemplateKind::Contract, event.id, test_date()).await?;
        assert_eq!(contract["7"], "0.00");
        Ok(())
    }

    #[tokio::test]
    async fn test_reattach_removes_previous_file() -> Result<()> {
        let db = setup_test_db().await?;
        let storage = test_storage();
        let event = create_test_event(&db, "Gala").await?;
        let template = upload(&db, &storage, TemplateKind::Budget, &["event_title"]).await?;
        let filled = fill_template(
            &db,
            TemplateKind::Budget,
            template.id,
            event.id,
            FieldData::new(),
            test_date(),
        )
        .await?;

        let first = attach_file(&db, &storage, TemplateKind::Budget, filled.id, b"v1").await?;
        let second = attach_file(&db, &storage, TemplateKind::Budget, filled.id, b"v2").await?;
        let first_path = first.storage_path.unwrap();
        let second_path = second.storage_path.unwrap();

        assert_ne!(first_path, second_path);
        assert!(storage.read(&first_path).await.is_err());
        assert_eq!(storage.read(&second_path).await?, b"v2");

        let empty = attach_file(&db, &storage, TemplateKind::Budget, filled.id, b"").await;
        assert!(matches!(empty, Err(Error::Validation { .. })));

        delete_filled(&db, &storage, TemplateKind::Budget, filled.id).await?;
        assert!(storage.read(&second_path).await.is_err());
        assert!(list_filled(&db, TemplateKind::Budget, event.id).await?.is_empty());

        tokio::fs::remove_dir_all(storage.root()).await.ok();
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_template_removes_all_files() -> Result<()> {
        let db = setup_test_db().await?;
        let storage = test_storage();
        let event = create_test_event(&db, "Gala").await?;
        let template = upload(&db, &storage, TemplateKind::Contract, &["1"]).await?;
        let filled = fill_template(
            &db,
            TemplateKind::Contract,
            template.id,
            event.id,
            FieldData::new(),
            test_date(),
        )
        .await?;
        let generated = attach_file(&db, &storage, TemplateKind::Contract, filled.id, b"%PDF").await?;
        let generated_path = generated.storage_path.unwrap();

        delete_template(&db, &storage, TemplateKind::Contract, template.id).await?;

        assert!(storage.read(&template.storage_path).await.is_err());
        assert!(storage.read(&generated_path).await.is_err());
        assert!(list_templates(&db, TemplateKind::Contract).await?.is_empty());
        assert!(list_filled(&db, TemplateKind::Contract, event.id).await?.is_empty());

        let again = delete_template(&db, &storage, TemplateKind::Contract, template.id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));

        tokio::fs::remove_dir_all(storage.root()).await.ok();
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_insert_removes_upload() -> Result<()> {
        let db = setup_test_db().await?;
        let storage = test_storage();
        db.execute_unprepared("DROP TABLE budget_templates").await?;

        let result = upload(&db, &storage, TemplateKind::Budget, &["event_title"]).await;
        assert!(matches!(result, Err(Error::Database(_))));

        let mut entries = tokio::fs::read_dir(storage.root().join("budgets")).await?;
        while let Some(entry) = entries.next_entry().await? {
            let mut inner = tokio::fs::read_dir(entry.path()).await?;
            assert!(inner.next_entry().await?.is_none());
        }

        tokio::fs::remove_dir_all(storage.root()).await.ok();
        Ok(())
    }
}
