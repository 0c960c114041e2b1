//! Request handlers, one module per resource.

pub mod categories;
pub mod diagnostics;
pub mod documents;
pub mod events;
pub mod menus;
pub mod pages;
pub mod payments;
pub mod people;
pub mod public;
pub mod templates;
