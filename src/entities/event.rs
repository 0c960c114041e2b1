//! Event entity - A scheduled occurrence such as a buffet service.
//!
//! The stored `status` is what was last written; the status shown to users is
//! derived from it and the calendar date by `core::status`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Scheduled for a future day
    #[sea_orm(string_value = "planned")]
    Planned,
    /// Happening today, or manually started
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Done, either manually or because the day has passed
    #[sea_orm(string_value = "finished")]
    Finished,
    /// Called off; never changes automatically
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl EventStatus {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In progress",
            Self::Finished => "Finished",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title (e.g., "Silva wedding buffet")
    pub title: String,
    /// Calendar day the event takes place on
    pub date: Date,
    /// Optional start time
    pub start_time: Option<Time>,
    /// Optional end time
    pub end_time: Option<Time>,
    /// Free-form location
    pub location: Option<String>,
    /// Last stored status
    pub status: EventStatus,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One event has many staff assignments
    #[sea_orm(has_many = "super::event_staff::Entity")]
    Staff,
    /// One event has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    /// One event can be linked to menus
    #[sea_orm(has_many = "super::event_menu::Entity")]
    EventMenus,
}

impl Related<super::event_staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::event_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventMenus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
