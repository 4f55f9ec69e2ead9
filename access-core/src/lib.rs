//! Role and admin identity data layer.
//!
//! Roles, admin records, users and user-role assignments live in SQLite and
//! are reached through one [`Store`] per process. Every mutation runs in a
//! single immediate transaction, and deletes or key changes of users and
//! roles go through the rules table in [`integrity`].
//!
//! ```no_run
//! use access_core::{RoleStore, Store, StoreConfig};
//! use access_core::models::RoleInput;
//!
//! let store = Store::open(&StoreConfig::from_env()?)?;
//! let roles = RoleStore::new(store.clone());
//! let role = roles.create_role(RoleInput::new("Administrator"))?;
//! assert_eq!(roles.find_by_name("Administrator")?, role);
//! # Ok::<(), access_core::Error>(())
//! ```

pub mod admin_identity;
pub mod assignments;
pub mod config;
pub mod db;
pub mod error;
pub mod integrity;
pub mod models;
pub mod orm;
pub mod role_store;
pub mod schema;
pub mod user_directory;
pub mod validation;

#[cfg(test)]
pub mod generate_types;

pub use admin_identity::AdminIdentity;
pub use assignments::RoleAssignments;
pub use config::{NameMatching, StoreConfig};
pub use db::Store;
pub use error::{Error, Result};
pub use role_store::RoleStore;
pub use user_directory::UserDirectory;
