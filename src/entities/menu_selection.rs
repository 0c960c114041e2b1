//! Menu selection entity - One item a guest picked for an event menu.
//!
//! Membership only: there is no ordering, and the pair
//! (`event_menu_id`, `menu_item_id`) is unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu selection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_selections")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Event menu the selection belongs to
    pub event_menu_id: i64,
    /// Chosen item
    pub menu_item_id: i64,
}

/// Defines relationships between `MenuSelection` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each selection belongs to one event menu
    #[sea_orm(
        belongs_to = "super::event_menu::Entity",
        from = "Column::EventMenuId",
        to = "super::event_menu::Column::Id",
        on_delete = "Cascade"
    )]
    EventMenu,
    /// Each selection points at one item
    #[sea_orm(
        belongs_to = "super::menu_item::Entity",
        from = "Column::MenuItemId",
        to = "super::menu_item::Column::Id",
        on_delete = "Cascade"
    )]
    MenuItem,
}

impl Related<super::event_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventMenu.def()
    }
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
