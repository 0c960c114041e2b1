//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget_template;
pub mod category;
pub mod contract_template;
pub mod document;
pub mod event;
pub mod event_menu;
pub mod event_staff;
pub mod filled_budget;
pub mod filled_contract;
pub mod menu;
pub mod menu_category;
pub mod menu_item;
pub mod menu_selection;
pub mod payment;
pub mod person;
pub mod system_state;
pub mod workflow;

// Re-export specific types to avoid conflicts
pub use budget_template::{Entity as BudgetTemplate, Model as BudgetTemplateModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use contract_template::{Entity as ContractTemplate, Model as ContractTemplateModel};
pub use document::{Entity as Document, Model as DocumentModel};
pub use event::{Column as EventColumn, Entity as Event, EventStatus, Model as EventModel};
pub use event_menu::{Column as EventMenuColumn, Entity as EventMenu, Model as EventMenuModel};
pub use event_staff::{Entity as EventStaff, Model as EventStaffModel};
pub use filled_budget::{Entity as FilledBudget, Model as FilledBudgetModel};
pub use filled_contract::{Entity as FilledContract, Model as FilledContractModel};
pub use menu::{Entity as Menu, Model as MenuModel};
pub use menu_category::{Entity as MenuCategory, Model as MenuCategoryModel};
pub use menu_item::{Entity as MenuItem, Model as MenuItemModel};
pub use menu_selection::{Entity as MenuSelection, Model as MenuSelectionModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use person::{Column as PersonColumn, Entity as Person, Model as PersonModel};
pub use system_state::{Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel};
pub use workflow::WorkflowStatus;
