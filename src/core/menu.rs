//! Menu business logic - the menu tree and its links to events.
//!
//! Order indices are assigned sequentially when categories and items are
//! added, so within a parent they are unique and increasing.

use crate::{
    core::{double_option, event::require_event, menu_parser::ParsedMenu},
    entities::{
        EventMenu, Menu, MenuCategory, MenuItem, event_menu, menu, menu_category, menu_item,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// Fields accepted when creating a menu by hand.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenu {
    /// Menu name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields accepted when adding a category to a menu.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuCategory {
    /// Section name
    pub name: String,
    /// Advisory pick count
    #[serde(default)]
    pub recommended_count: Option<i32>,
}

/// Fields accepted when adding an item to a category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    /// Dish name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial menu update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuPatch {
    /// New name
    pub name: Option<String>,
    /// New description, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// Partial category update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuCategoryPatch {
    /// New name
    pub name: Option<String>,
    /// New advisory pick count, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub recommended_count: Option<Option<i32>>,
}

/// Partial item update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemPatch {
    /// New name
    pub name: Option<String>,
    /// New description, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// A menu category with its items in display order.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    /// Stored category
    #[serde(flatten)]
    pub category: menu_category::Model,
    /// Items ordered by `order_index`
    pub items: Vec<menu_item::Model>,
}

/// A menu with its categories and items in display order.
#[derive(Debug, Clone, Serialize)]
pub struct MenuTree {
    /// Stored menu
    #[serde(flatten)]
    pub menu: menu::Model,
    /// Categories ordered by `order_index`
    pub categories: Vec<CategoryNode>,
}

fn clean(name: &str, what: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation(format!("{what} name cannot be empty")));
    }
    Ok(name.to_string())
}

async fn insert_menu<C: ConnectionTrait>(db: &C, name: String, description: Option<String>) -> Result<menu::Model> {
    menu::ActiveModel {
        name: Set(name),
        description: Set(description),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn insert_category<C: ConnectionTrait>(
    db: &C,
    menu_id: i64,
    name: String,
    order_index: i32,
    recommended_count: Option<i32>,
) -> Result<menu_category::Model> {
    menu_category::ActiveModel {
        menu_id: Set(menu_id),
        name: Set(name),
        order_index: Set(order_index),
        recommended_count: Set(recommended_count),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn insert_item<C: ConnectionTrait>(
    db: &C,
    menu_category_id: i64,
    name: String,
    description: Option<String>,
    order_index: i32,
) -> Result<menu_item::Model> {
    menu_item::ActiveModel {
        menu_category_id: Set(menu_category_id),
        name: Set(name),
        description: Set(description),
        order_index: Set(order_index),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

fn check_recommended(count: Option<i32>) -> Result<()> {
    if count.is_some_and(|n| n < 0) {
        return Err(Error::validation("Recommended count cannot be negative"));
    }
    Ok(())
}

async fn require_menu(db: &DatabaseConnection, menu_id: i64) -> Result<menu::Model> {
    Menu::find_by_id(menu_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Menu", menu_id))
}

async fn require_category(db: &DatabaseConnection, category_id: i64) -> Result<menu_category::Model> {
    MenuCategory::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("MenuCategory", category_id))
}

fn index_of(position: usize) -> Result<i32> {
    i32::try_from(position).map_err(|_| Error::validation("Too many entries for one menu level"))
}

/// Creates an empty menu.
pub async fn create_menu(db: &DatabaseConnection, input: NewMenu) -> Result<menu::Model> {
    insert_menu(db, clean(&input.name, "Menu")?, input.description).await
}

/// All menus, newest first.
pub async fn list_menus(db: &DatabaseConnection) -> Result<Vec<menu::Model>> {
    Menu::find()
        .order_by_desc(menu::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies the provided fields of `patch` to a menu.
pub async fn update_menu(
    db: &DatabaseConnection,
    menu_id: i64,
    patch: MenuPatch,
) -> Result<menu::Model> {
    let name = patch.name.as_deref().map(|n| clean(n, "Menu")).transpose()?;
    let mut active: menu::ActiveModel = require_menu(db, menu_id).await?.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    active.update(db).await.map_err(Into::into)
}

/// Hard-deletes a menu; categories, items, event links and selections cascade.
pub async fn delete_menu(db: &DatabaseConnection, menu_id: i64) -> Result<()> {
    let result = Menu::delete_by_id(menu_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Menu", menu_id));
    }
    Ok(())
}

/// Loads a menu with its categories and items in display order.
pub async fn get_menu_tree(db: &DatabaseConnection, menu_id: i64) -> Result<MenuTree> {
    let menu = require_menu(db, menu_id).await?;

    let rows = MenuCategory::find()
        .filter(menu_category::Column::MenuId.eq(menu_id))
        .order_by_asc(menu_category::Column::OrderIndex)
        .find_with_related(MenuItem)
        .order_by_asc(menu_item::Column::OrderIndex)
        .all(db)
        .await?;

    let mut categories: Vec<CategoryNode> = rows
        .into_iter()
        .map(|(category, mut items)| {
            items.sort_by_key(|i| i.order_index);
            CategoryNode { category, items }
        })
        .collect();
    categories.sort_by_key(|c| c.category.order_index);

    Ok(MenuTree { menu, categories })
}

/// Appends a category at the end of a menu.
pub async fn add_category(
    db: &DatabaseConnection,
    menu_id: i64,
    input: NewMenuCategory,
) -> Result<menu_category::Model> {
    let name = clean(&input.name, "Category")?;
    check_recommended(input.recommended_count)?;
    require_menu(db, menu_id).await?;

    let next = MenuCategory::find()
        .filter(menu_category::Column::MenuId.eq(menu_id))
        .order_by_desc(menu_category::Column::OrderIndex)
        .one(db)
        .await?
        .map_or(0, |last| last.order_index + 1);

    insert_category(db, menu_id, name, next, input.recommended_count).await
}

/// Renames a menu category or changes its advisory pick count.
pub async fn update_menu_category(
    db: &DatabaseConnection,
    menu_category_id: i64,
    patch: MenuCategoryPatch,
) -> Result<menu_category::Model> {
    let name = patch.name.as_deref().map(|n| clean(n, "Category")).transpose()?;
    if let Some(count) = patch.recommended_count {
        check_recommended(count)?;
    }
    let mut active: menu_category::ActiveModel =
        require_category(db, menu_category_id).await?.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(count) = patch.recommended_count {
        active.recommended_count = Set(count);
    }
    active.update(db).await.map_err(Into::into)
}

/// Hard-deletes a menu category; its items and their selections cascade.
/// The remaining categories keep their order indices.
pub async fn delete_menu_category(db: &DatabaseConnection, menu_category_id: i64) -> Result<()> {
    let result = MenuCategory::delete_by_id(menu_category_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("MenuCategory", menu_category_id));
    }
    Ok(())
}

/// Appends an item at the end of a menu category.
pub async fn add_item(
    db: &DatabaseConnection,
    menu_category_id: i64,
    input: NewMenuItem,
) -> Result<menu_item::Model> {
    let name = clean(&input.name, "Item")?;
    require_category(db, menu_category_id).await?;

    let next = MenuItem::find()
        .filter(menu_item::Column::MenuCategoryId.eq(menu_category_id))
        .order_by_desc(menu_item::Column::OrderIndex)
        .one(db)
        .await?
        .map_or(0, |last| last.order_index + 1);

    insert_item(db, menu_category_id, name, input.description, next).await
}

/// Applies the provided fields of `patch` to a menu item.
pub async fn update_item(
    db: &DatabaseConnection,
    item_id: i64,
    patch: MenuItemPatch,
) -> Result<menu_item::Model> {
    let name = patch.name.as_deref().map(|n| clean(n, "Item")).transpose()?;
    let item = MenuItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("MenuItem", item_id))?;
    let mut active: menu_item::ActiveModel = item.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    active.update(db).await.map_err(Into::into)
}

/// Hard-deletes a menu item; selections of it cascade.
pub async fn delete_item(db: &DatabaseConnection, item_id: i64) -> Result<()> {
    let result = MenuItem::delete_by_id(item_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("MenuItem", item_id));
    }
    Ok(())
}

/// Persists a parsed menu as a new menu tree in one transaction.
#[instrument(skip_all, fields(menu = %parsed.name))]
pub async fn import_parsed_menu(db: &DatabaseConnection, parsed: &ParsedMenu) -> Result<MenuTree> {
    let txn = db.begin().await?;
    let menu = insert_menu(&txn, parsed.name.clone(), None).await?;

    for (position, category) in parsed.categories.iter().enumerate() {
        let stored =
            insert_category(&txn, menu.id, category.name.clone(), index_of(position)?, None).await?;
        for (item_position, item) in category.items.iter().enumerate() {
            insert_item(
                &txn,
                stored.id,
                item.name.clone(),
                item.description.clone(),
                index_of(item_position)?,
            )
            .await?;
        }
    }
    txn.commit().await?;

    info!(menu_id = menu.id, items = parsed.item_count(), "Menu imported");
    get_menu_tree(db, menu.id).await
}

/// Links a menu to an event under a fresh share token.
pub async fn link_event_menu(
    db: &DatabaseConnection,
    event_id: i64,
    menu_id: i64,
) -> Result<event_menu::Model> {
    require_event(db, event_id).await?;
    require_menu(db, menu_id).await?;

    event_menu::ActiveModel {
        event_id: Set(event_id),
        menu_id: Set(menu_id),
        share_token: Set(Uuid::new_v4().simple().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Menus linked to an event.
pub async fn list_event_menus(
    db: &DatabaseConnection,
    event_id: i64,
) -> Result<Vec<event_menu::Model>> {
    EventMenu::find()
        .filter(event_menu::Column::EventId.eq(event_id))
        .order_by_asc(event_menu::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an event menu by id, failing with `NotFound` when absent.
pub async fn require_event_menu(db: &DatabaseConnection, event_menu_id: i64) -> Result<event_menu::Model> {
    EventMenu::find_by_id(event_menu_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("EventMenu", event_menu_id))
}

/// Resolves a share token. Unknown tokens are `NotFound`.
pub async fn get_event_menu_by_token(db: &DatabaseConnection, token: &str) -> Result<event_menu::Model> {
    EventMenu::find()
        .filter(event_menu::Column::ShareToken.eq(token))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("EventMenu", "share token"))
}

/// Removes the link between an event and a menu, with its selections.
pub async fn unlink_event_menu(db: &DatabaseConnection, event_menu_id: i64) -> Result<()> {
    let result = EventMenu::delete_by_id(event_menu_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("EventMenu", event_menu_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::menu_parser::parse_menu;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_import_assigns_order_indices() -> Result<()> {
        let db = setup_test_db().await?;
        let parsed = parse_menu("MENU: Gala\nCATEGORY: A\n- a1\n- a2\nCATEGORY: B\n- b1")?;

        let tree = import_parsed_menu(&db, &parsed).await?;
        assert_eq!(tree.menu.name, "Gala");
        let names: Vec<_> = tree.categories.iter().map(|c| c.category.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(tree.categories[0].category.order_index, 0);
        assert_eq!(tree.categories[1].category.order_index, 1);
        let idx: Vec<_> = tree.categories[0].items.iter().map(|i| i.order_index).collect();
        assert_eq!(idx, vec![0, 1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_category_and_item_append() -> Result<()> {
        let db = setup_test_db().await?;
        let tree = create_test_menu(&db).await?;
        let first = &tree.categories[0];

        let item = add_item(
            &db,
            first.category.id,
            NewMenuItem {
                name: "Extra".to_string(),
                description: None,
            },
        )
        .await?;
        assert_eq!(item.order_index, i32::try_from(first.items.len()).unwrap());

        let cat = add_category(
            &db,
            tree.menu.id,
            NewMenuCategory {
                name: "Desserts".to_string(),
                recommended_count: Some(2),
            },
        )
        .await?;
        assert_eq!(cat.order_index, i32::try_from(tree.categories.len()).unwrap());
        Ok(())
    }

    #[tokio::test]
    async fn test_link_and_resolve_share_token() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Gala").await?;
        let tree = create_test_menu(&db).await?;

        let link = link_event_menu(&db, event.id, tree.menu.id).await?;
        assert_eq!(link.share_token.len(), 32);

        let resolved = get_event_menu_by_token(&db, &link.share_token).await?;
        assert_eq!(resolved.id, link.id);

        let missing = get_event_menu_by_token(&db, "nope").await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_menu_and_item() -> Result<()> {
        let db = setup_test_db().await?;
        let tree = create_test_menu(&db).await?;

        let patch: MenuPatch =
            serde_json::from_str(r#"{"name": " Summer Menu ", "description": "Light"}"#)?;
        let updated = update_menu(&db, tree.menu.id, patch).await?;
        assert_eq!(updated.name, "Summer Menu");
        assert_eq!(updated.description.as_deref(), Some("Light"));

        let cleared = update_menu(
            &db,
            tree.menu.id,
            MenuPatch {
                description: Some(None),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(cleared.name, "Summer Menu");
        assert_eq!(cleared.description, None);

        let blank = update_menu(
            &db,
            tree.menu.id,
            MenuPatch {
                name: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        let item = &tree.categories[0].items[0];
        assert_eq!(item.description.as_deref(), Some("Tomato and basil"));
        let patch: MenuItemPatch = serde_json::from_str(r#"{"description": null}"#)?;
        let updated = update_item(&db, item.id, patch).await?;
        assert_eq!(updated.name, "Bruschetta");
        assert_eq!(updated.description, None);
        assert_eq!(updated.order_index, item.order_index);

        let missing = update_item(&db, 9999, MenuItemPatch::default()).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_menu_category() -> Result<()> {
        let db = setup_test_db().await?;
        let tree = create_test_menu(&db).await?;
        let starters = &tree.categories[0];

        let patch: MenuCategoryPatch =
            serde_json::from_str(r#"{"name": "Antipasti", "recommended_count": 2}"#)?;
        let updated = update_menu_category(&db, starters.category.id, patch).await?;
        assert_eq!(updated.name, "Antipasti");
        assert_eq!(updated.recommended_count, Some(2));

        let patch: MenuCategoryPatch = serde_json::from_str(r#"{"recommended_count": null}"#)?;
        let cleared = update_menu_category(&db, starters.category.id, patch).await?;
        assert_eq!(cleared.name, "Antipasti");
        assert_eq!(cleared.recommended_count, None);

        let negative = MenuCategoryPatch {
            recommended_count: Some(Some(-1)),
            ..Default::default()
        };
        let result = update_menu_category(&db, starters.category.id, negative).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        delete_menu_category(&db, starters.category.id).await?;
        let after = get_menu_tree(&db, tree.menu.id).await?;
        assert_eq!(after.categories.len(), 1);
        assert_eq!(after.categories[0].category.name, "Mains");
        assert_eq!(after.categories[0].category.order_index, 1);
        let orphans = MenuItem::find()
            .filter(menu_item::Column::MenuCategoryId.eq(starters.category.id))
            .all(&db)
            .await?;
        assert!(orphans.is_empty());

        let again = delete_menu_category(&db, starters.category.id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));
        Ok(())
    }
}
