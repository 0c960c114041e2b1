//! Menu item entity - A dish a guest can choose.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category this item belongs to
    pub menu_category_id: i64,
    /// Dish name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Display position within the category
    pub order_index: i32,
}

/// Defines relationships between `MenuItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one menu category
    #[sea_orm(
        belongs_to = "super::menu_category::Entity",
        from = "Column::MenuCategoryId",
        to = "super::menu_category::Column::Id",
        on_delete = "Cascade"
    )]
    MenuCategory,
}

impl Related<super::menu_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
