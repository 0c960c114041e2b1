//! Menu selection - a guest's chosen items for one event menu.
//!
//! Each (event menu, item) pair is either selected or not. [`SelectionSet`]
//! is the in-memory copy of that set; [`SelectionSet::toggle`] writes the
//! change to the database first and only flips local membership once the
//! write succeeded. Recommended counts per category are advisory and are only
//! reported, never enforced.

use crate::{
    core::{
        event::require_event,
        menu::{MenuTree, get_event_menu_by_token, get_menu_tree, require_event_menu},
    },
    entities::{MenuCategory, MenuItem, MenuSelection, event_menu, menu_selection},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Set, prelude::*};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// The selected items of one event menu.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    event_menu: event_menu::Model,
    items: HashSet<i64>,
}

impl SelectionSet {
    /// Loads the persisted selection of an event menu.
    pub async fn load(db: &DatabaseConnection, event_menu_id: i64) -> Result<Self> {
        let event_menu = require_event_menu(db, event_menu_id).await?;
        Self::load_for(db, event_menu).await
    }

    /// Loads the persisted selection of an already resolved event menu.
    pub async fn load_for(db: &DatabaseConnection, event_menu: event_menu::Model) -> Result<Self> {
        let items = MenuSelection::find()
            .filter(menu_selection::Column::EventMenuId.eq(event_menu.id))
            .all(db)
            .await?
            .into_iter()
            .map(|s| s.menu_item_id)
            .collect();
        Ok(Self { event_menu, items })
    }

    /// The event menu this set belongs to.
    #[must_use]
    pub const fn event_menu(&self) -> &event_menu::Model {
        &self.event_menu
    }

    /// Whether `item_id` is selected.
    #[must_use]
    pub fn contains(&self, item_id: i64) -> bool {
        self.items.contains(&item_id)
    }

    /// Selected item ids.
    #[must_use]
    pub const fn items(&self) -> &HashSet<i64> {
        &self.items
    }

    /// Flips the selection of `item_id` and returns whether it is now selected.
    ///
    /// The item must belong to the menu linked to this event menu.
    pub async fn toggle(&mut self, db: &DatabaseConnection, item_id: i64) -> Result<bool> {
        self.ensure_item_in_menu(db, item_id).await?;

        let selected = if self.items.contains(&item_id) {
            MenuSelection::delete_many()
                .filter(menu_selection::Column::EventMenuId.eq(self.event_menu.id))
                .filter(menu_selection::Column::MenuItemId.eq(item_id))
                .exec(db)
                .await?;
            self.items.remove(&item_id);
            false
        } else {
            let insert = menu_selection::ActiveModel {
                event_menu_id: Set(self.event_menu.id),
                menu_item_id: Set(item_id),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(Error::from);
            match insert {
                // Another request already stored the same pair.
                Ok(_) | Err(Error::Conflict { .. }) => {}
                Err(err) => return Err(err),
            }
            self.items.insert(item_id);
            true
        };

        debug!(event_menu_id = self.event_menu.id, item_id, selected, "Selection toggled");
        Ok(selected)
    }

    async fn ensure_item_in_menu(&self, db: &DatabaseConnection, item_id: i64) -> Result<()> {
        let (_, category) = MenuItem::find_by_id(item_id)
            .find_also_related(MenuCategory)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("MenuItem", item_id))?;

        match category {
            Some(c) if c.menu_id == self.event_menu.menu_id => Ok(()),
            _ => Err(Error::validation(format!(
                "Item {item_id} is not part of this event's menu"
            ))),
        }
    }
}

/// Selected vs. recommended picks for one menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    /// Menu category
    pub menu_category_id: i64,
    /// Category name
    pub name: String,
    /// Items currently selected
    pub selected: usize,
    /// Advisory target, if any
    pub recommended: Option<i32>,
    /// True when more items than recommended are selected
    pub over_recommended: bool,
}

/// Computes per-category progress for a selection. Never fails on over-selection.
#[must_use]
pub fn category_progress(tree: &MenuTree, selection: &HashSet<i64>) -> Vec<CategoryProgress> {
    tree.categories
        .iter()
        .map(|node| {
            let selected = node.items.iter().filter(|i| selection.contains(&i.id)).count();
            let recommended = node.category.recommended_count;
            CategoryProgress {
                menu_category_id: node.category.id,
                name: node.category.name.clone(),
                selected,
                recommended,
                over_recommended: recommended
                    .is_some_and(|r| usize::try_from(r).is_ok_and(|r| selected > r)),
            }
        })
        .collect()
}

/// One item as shown on the guest page.
#[derive(Debug, Clone, Serialize)]
pub struct PublicItem {
    /// Item id, used to toggle
    pub id: i64,
    /// Dish name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Whether the guest picked it
    pub selected: bool,
}

/// One category as shown on the guest page.
#[derive(Debug, Clone, Serialize)]
pub struct PublicCategory {
    /// Selection progress for the category
    #[serde(flatten)]
    pub progress: CategoryProgress,
    /// Items in display order
    pub items: Vec<PublicItem>,
}

/// Everything the guest page needs, reachable with the share token alone.
#[derive(Debug, Clone, Serialize)]
pub struct PublicMenuView {
    /// Event title
    pub event_title: String,
    /// Event day
    pub event_date: NaiveDate,
    /// Menu name
    pub menu_name: String,
    /// Categories in display order
    pub categories: Vec<PublicCategory>,
}

/// Builds the guest view from a menu tree and a selection.
#[must_use]
pub fn build_public_view(
    event_title: String,
    event_date: NaiveDate,
    tree: MenuTree,
    selection: &HashSet<i64>,
) -> PublicMenuView {
    let progress = category_progress(&tree, selection);
    let categories = tree
        .categories
        .into_iter()
        .zip(progress)
        .map(|(node, progress)| PublicCategory {
            progress,
            items: node
                .items
                .into_iter()
                .map(|item| PublicItem {
                    selected: selection.contains(&item.id),
                    id: item.id,
                    name: item.name,
                    description: item.description,
                })
                .collect(),
        })
        .collect();

    PublicMenuView {
        event_title,
        event_date,
        menu_name: tree.menu.name,
        categories,
    }
}

/// Loads the guest view for a share token.
pub async fn public_view_by_token(db: &DatabaseConnection, token: &str) -> Result<PublicMenuView> {
    let event_menu = get_event_menu_by_token(db, token).await?;
    let event = require_event(db, event_menu.event_id).await?;
    let tree = get_menu_tree(db, event_menu.menu_id).await?;
    let selection = SelectionSet::load_for(db, event_menu).await?;
    Ok(build_public_view(event.title, event.date, tree, selection.items()))
}

/// Toggles an item for the event menu behind a share token.
pub async fn toggle_by_token(db: &DatabaseConnection, token: &str, item_id: i64) -> Result<bool> {
    let event_menu = get_event_menu_by_token(db, token).await?;
    let mut selection = SelectionSet::load_for(db, event_menu).await?;
    selection.toggle(db, item_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::menu::{MenuCategoryPatch, link_event_menu, update_menu_category};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_toggle_twice_restores_persisted_set() -> Result<()> {
        let (db, link, tree) = setup_with_event_menu().await?;
        let item = tree.categories[0].items[0].id;

        let before = SelectionSet::load(&db, link.id).await?.items().clone();

        let mut set = SelectionSet::load(&db, link.id).await?;
        assert!(set.toggle(&db, item).await?);
        assert!(SelectionSet::load(&db, link.id).await?.contains(item));
        assert!(!set.toggle(&db, item).await?);

        let after = SelectionSet::load(&db, link.id).await?.items().clone();
        assert_eq!(before, after);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_rejects_foreign_item() -> Result<()> {
        let (db, link, _) = setup_with_event_menu().await?;
        let other = create_test_menu(&db).await?;
        let foreign = other.categories[0].items[0].id;

        let mut set = SelectionSet::load(&db, link.id).await?;
        let result = set.toggle(&db, foreign).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(set.items().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_local_set_still_converges() -> Result<()> {
        let (db, link, tree) = setup_with_event_menu().await?;
        let item = tree.categories[0].items[0].id;

        let mut first = SelectionSet::load(&db, link.id).await?;
        let mut second = SelectionSet::load(&db, link.id).await?;
        assert!(first.toggle(&db, item).await?);
        assert!(second.toggle(&db, item).await?);
        assert!(SelectionSet::load(&db, link.id).await?.contains(item));
        Ok(())
    }

    #[tokio::test]
    async fn test_over_selection_is_reported_not_blocked() -> Result<()> {
        let (db, link, tree) = setup_with_event_menu().await?;
        let category = &tree.categories[0];
        let patch = MenuCategoryPatch {
            recommended_count: Some(Some(1)),
            ..Default::default()
        };
        update_menu_category(&db, category.category.id, patch).await?;

        let mut set = SelectionSet::load(&db, link.id).await?;
        for item in &category.items {
            set.toggle(&db, item.id).await?;
        }

        let tree = get_menu_tree(&db, link.menu_id).await?;
        let progress = category_progress(&tree, set.items());
        assert_eq!(progress[0].selected, category.items.len());
        assert_eq!(progress[0].recommended, Some(1));
        assert!(progress[0].over_recommended);
        Ok(())
    }

    #[tokio::test]
    async fn test_public_view_by_token() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Gala").await?;
        let tree = create_test_menu(&db).await?;
        let link = link_event_menu(&db, event.id, tree.menu.id).await?;
        let item = tree.categories[0].items[0].id;

        assert!(toggle_by_token(&db, &link.share_token, item).await?);

        let view = public_view_by_token(&db, &link.share_token).await?;
        assert_eq!(view.event_title, "Gala");
        assert_eq!(view.menu_name, tree.menu.name);
        assert!(view.categories[0].items[0].selected);
        assert_eq!(view.categories[0].progress.selected, 1);
        Ok(())
    }
}
