//! Person business logic - staff members.

use crate::{
    core::category::require_category,
    entities::{Person, person},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Fields accepted when creating a person.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
    /// Full name
    pub name: String,
    /// Default amount paid per event
    #[serde(default)]
    pub value: Option<f64>,
    /// Category the person belongs to
    pub category_id: i64,
}

/// Partial update for a person.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonPatch {
    /// New name
    pub name: Option<String>,
    /// New default amount
    pub value: Option<f64>,
    /// Move to another category
    pub category_id: Option<i64>,
}

fn validate_value(value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(Error::InvalidAmount { amount: v }),
        _ => Ok(()),
    }
}

/// Creates a person in an existing category.
pub async fn create_person(db: &DatabaseConnection, input: NewPerson) -> Result<person::Model> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Person name cannot be empty"));
    }
    validate_value(input.value)?;
    require_category(db, input.category_id).await?;

    person::ActiveModel {
        name: Set(name.to_string()),
        value: Set(input.value),
        category_id: Set(input.category_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a person by id, failing with `NotFound` when absent.
pub async fn require_person(db: &DatabaseConnection, person_id: i64) -> Result<person::Model> {
    Person::find_by_id(person_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Person", person_id))
}

/// People ordered by name, optionally restricted to one category.
pub async fn list_people(
    db: &DatabaseConnection,
    category_id: Option<i64>,
) -> Result<Vec<person::Model>> {
    let mut query = Person::find().order_by_asc(person::Column::Name);
    if let Some(category_id) = category_id {
        query = query.filter(person::Column::CategoryId.eq(category_id));
    }
    query.all(db).await.map_err(Into::into)
}

/// Applies the provided fields of `patch`.
pub async fn update_person(
    db: &DatabaseConnection,
    person_id: i64,
    patch: PersonPatch,
) -> Result<person::Model> {
    validate_value(patch.value)?;
    let mut active: person::ActiveModel = require_person(db, person_id).await?.into();

    if let Some(name) = patch.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Person name cannot be empty"));
        }
        active.name = Set(name);
    }
    if let Some(value) = patch.value {
        active.value = Set(Some(value));
    }
    if let Some(category_id) = patch.category_id {
        require_category(db, category_id).await?;
        active.category_id = Set(category_id);
    }

    active.update(db).await.map_err(Into::into)
}

/// Hard-deletes a person; their payments cascade.
pub async fn delete_person(db: &DatabaseConnection, person_id: i64) -> Result<()> {
    let result = Person::delete_by_id(person_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Person", person_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_person_requires_category() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_person(
            &db,
            NewPerson {
                name: "Ana".to_string(),
                value: None,
                category_id: 42,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Category", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_value_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_test_category(&db, "Waiter").await?;
        let result = create_person(
            &db,
            NewPerson {
                name: "Ana".to_string(),
                value: Some(-1.0),
                category_id: cat.id,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_move_person() -> Result<()> {
        let db = setup_test_db().await?;
        let waiters = create_test_category(&db, "Waiter").await?;
        let cooks = create_test_category(&db, "Cook").await?;
        let ana = create_test_person(&db, "Ana", waiters.id).await?;

        let moved = update_person(
            &db,
            ana.id,
            PersonPatch {
                category_id: Some(cooks.id),
                value: Some(150.0),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(moved.category_id, cooks.id);
        assert_eq!(moved.value, Some(150.0));

        assert!(list_people(&db, Some(waiters.id)).await?.is_empty());
        assert_eq!(list_people(&db, Some(cooks.id)).await?.len(), 1);
        Ok(())
    }
}
