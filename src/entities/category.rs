//! Category entity - A professional role (waiter, bartender, ...).
//!
//! Categories group people for staffing and group payments in reports.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Role name, unique
    #[sea_orm(unique)]
    pub name: String,
    /// Optional description of the role
    pub description: Option<String>,
    /// Display color as a hex string (e.g., `"#3b82f6"`)
    pub color: String,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many people
    #[sea_orm(has_many = "super::person::Entity")]
    People,
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::People.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
