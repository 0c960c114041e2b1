//! Core business logic, independent of the HTTP layer.

pub mod category;
pub mod document;
pub mod event;
pub mod menu;
pub mod menu_parser;
pub mod payment;
pub mod person;
pub mod selection;
pub mod status;
pub mod template;

use serde::{Deserialize, Deserializer};

/// Reads a nullable patch field: absent stays `None`, `null` becomes
/// `Some(None)` (clear the column), a value becomes `Some(Some(v))`.
///
/// Pair with `#[serde(default)]` so absent fields skip this function.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
