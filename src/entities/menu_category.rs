//! Menu category entity - A section of a menu (starters, mains, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_categories")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Menu this category belongs to
    pub menu_id: i64,
    /// Section name
    pub name: String,
    /// Display position within the menu
    pub order_index: i32,
    /// Advisory number of items a guest should pick; never enforced
    pub recommended_count: Option<i32>,
}

/// Defines relationships between `MenuCategory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category belongs to one menu
    #[sea_orm(
        belongs_to = "super::menu::Entity",
        from = "Column::MenuId",
        to = "super::menu::Column::Id",
        on_delete = "Cascade"
    )]
    Menu,
    /// One category has many items
    #[sea_orm(has_many = "super::menu_item::Entity")]
    Items,
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
