//! Read-only consistency queries over the store.
//!
//! Built once at startup and shared through the application state; nothing
//! here writes.

use crate::{
    core::status::{effective_status, should_auto_finalize},
    entities::{
        BudgetTemplate, Category, ContractTemplate, Document, Event, EventMenu, EventStatus,
        FilledBudget, FilledContract, Menu, MenuCategory, MenuItem, MenuSelection, Payment, Person,
        event, event_menu, payment,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, prelude::*, sea_query::Query};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Row count of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    /// Table name
    pub table: &'static str,
    /// Number of rows
    pub rows: u64,
}

/// An event whose stored status lags behind its day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleEvent {
    /// Event id
    pub id: i64,
    /// Event title
    pub title: String,
    /// Event day
    pub date: NaiveDate,
    /// Stored status
    pub stored_status: EventStatus,
    /// Status derived for the given day
    pub effective_status: EventStatus,
}

/// Outstanding payments of one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnpaidTotal {
    /// Event id
    pub event_id: i64,
    /// Number of unpaid payments
    pub unpaid_count: i64,
    /// Sum of unpaid amounts
    pub unpaid_amount: f64,
}

/// A selection pointing at an item outside its event-menu's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedSelection {
    /// Selection id
    pub selection_id: i64,
    /// Event-menu the selection belongs to
    pub event_menu_id: i64,
    /// Selected item
    pub menu_item_id: i64,
}

/// Named diagnostic queries.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    db: DatabaseConnection,
}

impl Diagnostics {
    /// Wraps a connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Row counts for every table.
    pub async fn table_counts(&self) -> Result<Vec<TableCount>> {
        let db = &self.db;
        let counts = vec![
            TableCount {
                table: "events",
                rows: Event::find().count(db).await?,
            },
            TableCount {
                table: "categories",
                rows: Category::find().count(db).await?,
            },
            TableCount {
                table: "people",
                rows: Person::find().count(db).await?,
            },
            TableCount {
                table: "payments",
                rows: Payment::find().count(db).await?,
            },
            TableCount {
                table: "menus",
                rows: Menu::find().count(db).await?,
            },
            TableCount {
                table: "menu_categories",
                rows: MenuCategory::find().count(db).await?,
            },
            TableCount {
                table: "menu_items",
                rows: MenuItem::find().count(db).await?,
            },
            TableCount {
                table: "event_menus",
                rows: EventMenu::find().count(db).await?,
            },
            TableCount {
                table: "menu_selections",
                rows: MenuSelection::find().count(db).await?,
            },
            TableCount {
                table: "contract_templates",
                rows: ContractTemplate::find().count(db).await?,
            },
            TableCount {
                table: "filled_contracts",
                rows: FilledContract::find().count(db).await?,
            },
            TableCount {
                table: "budget_templates",
                rows: BudgetTemplate::find().count(db).await?,
            },
            TableCount {
                table: "filled_budgets",
                rows: FilledBudget::find().count(db).await?,
            },
            TableCount {
                table: "documents",
                rows: Document::find().count(db).await?,
            },
        ];
        debug!(tables = counts.len(), "Counted table rows");
        Ok(counts)
    }

    /// Events the finalize pass would rewrite on `today`.
    pub async fn stale_event_statuses(&self, today: NaiveDate) -> Result<Vec<StaleEvent>> {
        let events = Event::find()
            .filter(event::Column::Date.lt(today))
            .order_by_asc(event::Column::Date)
            .all(&self.db)
            .await?;

        Ok(events
            .into_iter()
            .filter(|e| should_auto_finalize(e.date, e.status, today))
            .map(|e| StaleEvent {
                effective_status: effective_status(e.date, e.status, today),
                id: e.id,
                title: e.title,
                date: e.date,
                stored_status: e.status,
            })
            .collect())
    }

    /// Unpaid count and amount per event, only for events with something unpaid.
    pub async fn unpaid_totals_by_event(&self) -> Result<Vec<UnpaidTotal>> {
        let rows: Vec<(i64, i64, Option<f64>)> = Payment::find()
            .select_only()
            .column(payment::Column::EventId)
            .column_as(Expr::col(payment::Column::Id).count(), "unpaid_count")
            .column_as(Expr::col(payment::Column::Amount).sum(), "unpaid_amount")
            .filter(payment::Column::IsPaid.eq(false))
            .group_by(payment::Column::EventId)
            .order_by_asc(payment::Column::EventId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(event_id, unpaid_count, amount)| UnpaidTotal {
                event_id,
                unpaid_count,
                unpaid_amount: amount.unwrap_or_default(),
            })
            .collect())
    }

    /// Selections whose item belongs to a different menu than the one linked.
    pub async fn orphaned_selections(&self) -> Result<Vec<OrphanedSelection>> {
        let db = &self.db;
        let link_menu: HashMap<i64, i64> = EventMenu::find()
            .all(db)
            .await?
            .into_iter()
            .map(|link| (link.id, link.menu_id))
            .collect();
        let category_menu: HashMap<i64, i64> = MenuCategory::find()
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.menu_id))
            .collect();
        let item_menu: HashMap<i64, i64> = MenuItem::find()
            .all(db)
            .await?
            .into_iter()
            .filter_map(|i| category_menu.get(&i.menu_category_id).map(|m| (i.id, *m)))
            .collect();

        Ok(MenuSelection::find()
            .all(db)
            .await?
            .into_iter()
            .filter(|s| {
                let expected = link_menu.get(&s.event_menu_id);
                expected.is_none() || expected != item_menu.get(&s.menu_item_id)
            })
            .map(|s| OrphanedSelection {
                selection_id: s.id,
                event_menu_id: s.event_menu_id,
                menu_item_id: s.menu_item_id,
            })
            .collect())
    }

    /// Events that have no menu linked.
    pub async fn events_without_menu(&self) -> Result<Vec<event::Model>> {
        Event::find()
            .filter(
                event::Column::Id.not_in_subquery(
                    Query::select()
                        .column(event_menu::Column::EventId)
                        .from(EventMenu)
                        .to_owned(),
                ),
            )
            .order_by_asc(event::Column::Date)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::menu::link_event_menu;
    use crate::entities::menu_selection;
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn test_table_counts() -> Result<()> {
        let (db, _event, _person) = setup_with_person().await?;
        let counts = Diagnostics::new(db).table_counts().await?;

        let rows = |name: &str| counts.iter().find(|c| c.table == name).unwrap().rows;
        assert_eq!(rows("events"), 1);
        assert_eq!(rows("people"), 1);
        assert_eq!(rows("payments"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_event_statuses() -> Result<()> {
        let db = setup_test_db().await?;
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        let past = create_custom_event(&db, "Past", day(1), EventStatus::Planned).await?;
        create_custom_event(&db, "Done", day(1), EventStatus::Finished).await?;
        create_custom_event(&db, "Later", day(30), EventStatus::Planned).await?;

        let stale = Diagnostics::new(db).stale_event_statuses(day(15)).await?;
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, past.id);
        assert_eq!(stale[0].effective_status, EventStatus::Finished);
        Ok(())
    }

    #[tokio::test]
    async fn test_unpaid_totals_by_event() -> Result<()> {
        let (db, event, person) = setup_with_person().await?;
        let other = create_test_person(&db, "Bruno", person.category_id).await?;
        create_test_payment(&db, event.id, person.id, 100.0).await?;
        let paid = create_test_payment(&db, event.id, other.id, 40.0).await?;
        crate::core::payment::set_paid(&db, paid.id, true).await?;

        let totals = Diagnostics::new(db).unpaid_totals_by_event().await?;
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].event_id, event.id);
        assert_eq!(totals[0].unpaid_count, 1);
        assert_eq!(totals[0].unpaid_amount, 100.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_orphaned_selections_and_unlinked_events() -> Result<()> {
        let (db, link, _tree) = setup_with_event_menu().await?;
        let other = create_test_menu(&db).await?;
        let lonely = create_test_event(&db, "No menu").await?;

        let foreign = other.categories[0].items[0].id;
        let orphan = menu_selection::ActiveModel {
            event_menu_id: Set(link.id),
            menu_item_id: Set(foreign),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let diagnostics = Diagnostics::new(db.clone());
        let orphans = diagnostics.orphaned_selections().await?;
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].selection_id, orphan.id);

        let unlinked = diagnostics.events_without_menu().await?;
        assert_eq!(unlinked.len(), 1);
        assert_eq!(unlinked[0].id, lonely.id);

        link_event_menu(&db, lonely.id, other.menu.id).await?;
        assert!(diagnostics.events_without_menu().await?.is_empty());
        Ok(())
    }
}
