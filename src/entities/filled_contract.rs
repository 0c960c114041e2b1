//! Filled contract entity - One event's values for a contract template.

use super::workflow::WorkflowStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Filled contract database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "filled_contracts")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Template being filled
    pub template_id: i64,
    /// Event the values were taken from
    pub event_id: i64,
    /// Field name → value, as a JSON object
    pub field_data: Json,
    /// Public URL of the generated file, once produced
    pub file_url: Option<String>,
    /// Object path of the generated file in storage
    pub storage_path: Option<String>,
    /// Review status
    pub status: WorkflowStatus,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `FilledContract` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each filled instance uses one template
    #[sea_orm(
        belongs_to = "super::contract_template::Entity",
        from = "Column::TemplateId",
        to = "super::contract_template::Column::Id",
        on_delete = "Cascade"
    )]
    Template,
    /// Each filled instance belongs to one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::contract_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
