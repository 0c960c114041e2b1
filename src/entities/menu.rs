//! Menu entity - Root of the menu → category → item tree.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menus")]
pub struct Model {
    /// Unique identifier for the menu
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Menu name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Menu and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One menu has many categories
    #[sea_orm(has_many = "super::menu_category::Entity")]
    Categories,
    /// One menu can be linked to many events
    #[sea_orm(has_many = "super::event_menu::Entity")]
    EventMenus,
}

impl Related<super::menu_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::event_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventMenus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
