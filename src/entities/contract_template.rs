//! Contract template entity - An uploaded PDF form and the names of its fields.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract template database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract_templates")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Template name
    pub name: String,
    /// Public URL of the blank form
    pub file_url: String,
    /// Object path of the blank form in storage
    pub storage_path: String,
    /// Form field names as a JSON array of strings
    pub field_names: Json,
    /// When the template was uploaded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `ContractTemplate` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One template has many filled instances
    #[sea_orm(has_many = "super::filled_contract::Entity")]
    Filled,
}

impl Related<super::filled_contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Filled.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
