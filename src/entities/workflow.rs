//! Workflow status shared by filled contracts and filled budgets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a filled template is in its review cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Field data saved, no file produced yet
    #[sea_orm(string_value = "draft")]
    Draft,
    /// A filled file exists
    #[sea_orm(string_value = "generated")]
    Generated,
    /// Sent to the client
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Signed (contracts) or approved (budgets) by the client
    #[sea_orm(string_value = "accepted")]
    Accepted,
}
