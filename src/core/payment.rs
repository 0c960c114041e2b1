//! Payment business logic - what each event owes its staff.
//!
//! Besides CRUD this module owns the category report: payments joined with
//! their person's category and partitioned by category id with
//! [`group_by_category`].

use crate::{
    core::{category::require_category, event::require_event, person::require_person},
    entities::{Category, Payment, Person, payment, person},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

/// Fields accepted when creating a single payment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    /// Event being paid for
    pub event_id: i64,
    /// Person being paid
    pub person_id: i64,
    /// Amount owed
    pub amount: f64,
}

/// A payment with the person and category metadata needed for display.
#[derive(Debug, Clone, Serialize)]
pub struct CategorizedPayment {
    /// Stored row
    #[serde(flatten)]
    pub payment: payment::Model,
    /// Name of the person being paid
    pub person_name: String,
    /// Category of the person
    pub category_id: i64,
    /// Category name
    pub category_name: String,
    /// Category display color
    pub category_color: String,
}

/// Payments sharing one category, with their totals.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentGroup {
    /// Grouping key
    pub category_id: i64,
    /// Label taken from the first member
    pub category_name: String,
    /// Color taken from the first member
    pub color: String,
    /// Members in encounter order
    pub payments: Vec<CategorizedPayment>,
    /// Sum of all amounts
    pub total_amount: f64,
    /// Sum of paid amounts
    pub paid_amount: f64,
    /// Number of paid members
    pub paid_count: usize,
    /// Number of unpaid members
    pub unpaid_count: usize,
}

impl PaymentGroup {
    fn open(first: &CategorizedPayment) -> Self {
        Self {
            category_id: first.category_id,
            category_name: first.category_name.clone(),
            color: first.category_color.clone(),
            payments: Vec::new(),
            total_amount: 0.0,
            paid_amount: 0.0,
            paid_count: 0,
            unpaid_count: 0,
        }
    }

    fn push(&mut self, entry: CategorizedPayment) {
        self.total_amount += entry.payment.amount;
        if entry.payment.is_paid {
            self.paid_amount += entry.payment.amount;
            self.paid_count += 1;
        } else {
            self.unpaid_count += 1;
        }
        self.payments.push(entry);
    }
}

/// Per-event payment report.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    /// Event the report is for
    pub event_id: i64,
    /// One group per category
    pub groups: Vec<PaymentGroup>,
    /// Sum over all groups
    pub total_amount: f64,
    /// Paid sum over all groups
    pub paid_amount: f64,
    /// Paid members over all groups
    pub paid_count: usize,
    /// Unpaid members over all groups
    pub unpaid_count: usize,
}

/// Result of creating payments for a whole category at once.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Rows inserted
    pub created: Vec<payment::Model>,
    /// People skipped because they already had a payment for the event
    pub skipped_person_ids: Vec<i64>,
}

/// Partitions payments by category id.
///
/// Groups appear in the order their first member is encountered and members
/// keep their input order. Label and color come from the first member; the
/// rest are assumed to agree.
#[must_use]
pub fn group_by_category<I>(payments: I) -> Vec<PaymentGroup>
where
    I: IntoIterator<Item = CategorizedPayment>,
{
    let mut groups: Vec<PaymentGroup> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for entry in payments {
        let slot = *index.entry(entry.category_id).or_insert_with(|| {
            groups.push(PaymentGroup::open(&entry));
            groups.len() - 1
        });
        groups[slot].push(entry);
    }

    groups
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Creates one payment. A second payment for the same (event, person) fails
/// with [`Error::Conflict`].
#[instrument(skip(db))]
pub async fn create_payment(db: &DatabaseConnection, input: NewPayment) -> Result<payment::Model> {
    validate_amount(input.amount)?;
    require_event(db, input.event_id).await?;
    require_person(db, input.person_id).await?;

    payment::ActiveModel {
        event_id: Set(input.event_id),
        person_id: Set(input.person_id),
        amount: Set(input.amount),
        is_paid: Set(false),
        paid_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a payment by id, failing with `NotFound` when absent.
pub async fn require_payment(db: &DatabaseConnection, payment_id: i64) -> Result<payment::Model> {
    Payment::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Payment", payment_id))
}

/// Partial payment update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaymentPatch {
    /// Mark paid or unpaid
    pub is_paid: Option<bool>,
    /// New amount
    pub amount: Option<f64>,
}

/// Applies a patch in a single write.
///
/// `paid_at` is stamped only when an unpaid payment becomes paid and cleared
/// when it becomes unpaid; marking a paid payment paid again keeps the
/// original timestamp.
pub async fn update_payment(
    db: &DatabaseConnection,
    payment_id: i64,
    patch: PaymentPatch,
) -> Result<payment::Model> {
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    let current = require_payment(db, payment_id).await?;
    let was_paid = current.is_paid;
    let mut active: payment::ActiveModel = current.into();

    if let Some(amount) = patch.amount {
        active.amount = Set(amount);
    }
    match patch.is_paid {
        Some(true) if !was_paid => {
            active.is_paid = Set(true);
            active.paid_at = Set(Some(Utc::now()));
        }
        Some(false) if was_paid => {
            active.is_paid = Set(false);
            active.paid_at = Set(None);
        }
        _ => {}
    }

    active.update(db).await.map_err(Into::into)
}

/// Marks a payment paid or unpaid, see [`update_payment`].
pub async fn set_paid(db: &DatabaseConnection, payment_id: i64, paid: bool) -> Result<payment::Model> {
    update_payment(
        db,
        payment_id,
        PaymentPatch {
            is_paid: Some(paid),
            amount: None,
        },
    )
    .await
}

/// Changes the amount of a payment.
pub async fn update_amount(db: &DatabaseConnection, payment_id: i64, amount: f64) -> Result<payment::Model> {
    update_payment(
        db,
        payment_id,
        PaymentPatch {
            is_paid: None,
            amount: Some(amount),
        },
    )
    .await
}

/// Hard-deletes a payment.
pub async fn delete_payment(db: &DatabaseConnection, payment_id: i64) -> Result<()> {
    let result = Payment::delete_by_id(payment_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Payment", payment_id));
    }
    Ok(())
}

/// Payments of an event joined with person and category, in creation order.
pub async fn list_for_event(db: &DatabaseConnection, event_id: i64) -> Result<Vec<CategorizedPayment>> {
    let rows = Payment::find()
        .filter(payment::Column::EventId.eq(event_id))
        .order_by_asc(payment::Column::Id)
        .find_also_related(Person)
        .all(db)
        .await?;

    let category_ids: HashSet<i64> = rows
        .iter()
        .filter_map(|(_, person)| person.as_ref().map(|p| p.category_id))
        .collect();
    let categories: HashMap<i64, _> = Category::find()
        .filter(crate::entities::category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    Ok(rows
        .into_iter()
        .filter_map(|(payment, person)| {
            let Some(person) = person else {
                warn!(payment_id = payment.id, "Payment without person skipped");
                return None;
            };
            let category = categories.get(&person.category_id)?;
            Some(CategorizedPayment {
                payment,
                person_name: person.name,
                category_id: category.id,
                category_name: category.name.clone(),
                category_color: category.color.clone(),
            })
        })
        .collect())
}

/// Builds the grouped payment report of an event.
pub async fn payment_summary(db: &DatabaseConnection, event_id: i64) -> Result<PaymentSummary> {
    require_event(db, event_id).await?;
    let groups = group_by_category(list_for_event(db, event_id).await?);

    Ok(PaymentSummary {
        event_id,
        total_amount: groups.iter().fold(0.0, |acc, g| acc + g.total_amount),
        paid_amount: groups.iter().fold(0.0, |acc, g| acc + g.paid_amount),
        paid_count: groups.iter().map(|g| g.paid_count).sum(),
        unpaid_count: groups.iter().map(|g| g.unpaid_count).sum(),
        groups,
    })
}

/// Creates a payment for every member of a category.
///
/// Each person is charged their own `value`, falling back to
/// `default_amount`. People who already have a payment for the event are
/// skipped. All inserts run in one database transaction, so either every new
/// row is written or none is.
#[instrument(skip(db))]
pub async fn create_team_payments(
    db: &DatabaseConnection,
    event_id: i64,
    category_id: i64,
    default_amount: Option<f64>,
) -> Result<BatchOutcome> {
    if let Some(amount) = default_amount {
        validate_amount(amount)?;
    }
    require_event(db, event_id).await?;
    require_category(db, category_id).await?;

    let members = Person::find()
        .filter(person::Column::CategoryId.eq(category_id))
        .order_by_asc(person::Column::Name)
        .all(db)
        .await?;

    let already_paid: HashSet<i64> = Payment::find()
        .filter(payment::Column::EventId.eq(event_id))
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.person_id)
        .collect();

    let (skipped, pending): (Vec<_>, Vec<_>) =
        members.into_iter().partition(|p| already_paid.contains(&p.id));

    let mut rows = Vec::with_capacity(pending.len());
    for member in &pending {
        let amount = member.value.or(default_amount).ok_or_else(|| {
            Error::validation(format!("No amount known for {}", member.name))
        })?;
        validate_amount(amount)?;
        rows.push(payment::ActiveModel {
            event_id: Set(event_id),
            person_id: Set(member.id),
            amount: Set(amount),
            is_paid: Set(false),
            paid_at: Set(None),
            ..Default::default()
        });
    }

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(rows.len());
    for row in rows {
        created.push(row.insert(&txn).await?);
    }
    txn.commit().await?;

    info!(created = created.len(), skipped = skipped.len(), "Team payments created");
    Ok(BatchOutcome {
        created,
        skipped_person_ids: skipped.into_iter().map(|p| p.id).collect(),
    })
}
