//! Event menu entity - Links an event to a menu and carries the share token.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event menu database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_menus")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Linked event
    pub event_id: i64,
    /// Linked menu
    pub menu_id: i64,
    /// Unguessable token granting guests access to the selection page
    #[sea_orm(unique)]
    pub share_token: String,
    /// When the link was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `EventMenu` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
    /// Each link points at one menu
    #[sea_orm(
        belongs_to = "super::menu::Entity",
        from = "Column::MenuId",
        to = "super::menu::Column::Id",
        on_delete = "Cascade"
    )]
    Menu,
    /// One link has many selections
    #[sea_orm(has_many = "super::menu_selection::Entity")]
    Selections,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
}

impl Related<super::menu_selection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
