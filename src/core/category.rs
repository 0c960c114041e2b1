//! Category business logic - staff roles and their members.

use crate::{
    config::categories::SeedConfig,
    entities::{Category, Person, category, person},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};

const DEFAULT_COLOR: &str = "#64748b";

/// Fields accepted when creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    /// Role name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Display color, a neutral grey when omitted
    #[serde(default)]
    pub color: Option<String>,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New color
    pub color: Option<String>,
}

/// A category with its derived member count.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithCount {
    /// Stored row
    #[serde(flatten)]
    pub category: category::Model,
    /// Number of people in the category
    pub member_count: u64,
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }
    Ok(name.to_string())
}

/// Creates a category; names are unique.
pub async fn create_category(db: &DatabaseConnection, input: NewCategory) -> Result<category::Model> {
    let name = clean_name(&input.name)?;
    category::ActiveModel {
        name: Set(name),
        description: Set(input.description),
        color: Set(input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string())),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a category by id, failing with `NotFound` when absent.
pub async fn require_category(db: &DatabaseConnection, category_id: i64) -> Result<category::Model> {
    Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Category", category_id))
}

/// All categories alphabetically, each with its member count.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<CategoryWithCount>> {
    let categories = Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;

    let counts: HashMap<i64, i64> = Person::find()
        .select_only()
        .column(person::Column::CategoryId)
        .column_as(Expr::col(person::Column::Id).count(), "member_count")
        .group_by(person::Column::CategoryId)
        .into_tuple::<(i64, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(categories
        .into_iter()
        .map(|category| {
            let member_count = counts
                .get(&category.id)
                .copied()
                .map_or(0, |n| u64::try_from(n).unwrap_or(0));
            CategoryWithCount {
                category,
                member_count,
            }
        })
        .collect())
}

/// Applies the provided fields of `patch`.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    patch: CategoryPatch,
) -> Result<category::Model> {
    let mut active: category::ActiveModel = require_category(db, category_id).await?.into();
    if let Some(name) = patch.name {
        active.name = Set(clean_name(&name)?);
    }
    if let Some(description) = patch.description {
        active.description = Set(Some(description));
    }
    if let Some(color) = patch.color {
        active.color = Set(color);
    }
    active.update(db).await.map_err(Into::into)
}

/// Hard-deletes a category; its people cascade.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let result = Category::delete_by_id(category_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Category", category_id));
    }
    Ok(())
}

/// Creates every seeded category whose name is not taken yet.
///
/// Returns how many categories were created.
#[instrument(skip_all)]
pub async fn seed_categories(db: &DatabaseConnection, seed: &SeedConfig) -> Result<usize> {
    let mut created = 0;
    for entry in &seed.categories {
        let exists = Category::find()
            .filter(category::Column::Name.eq(entry.name.trim()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }
        create_category(
            db,
            NewCategory {
                name: entry.name.clone(),
                description: entry.description.clone(),
                color: Some(entry.color.clone()),
            },
        )
        .await?;
        created += 1;
    }
    info!(created, "Seeded categories");
    Ok(created)
}
