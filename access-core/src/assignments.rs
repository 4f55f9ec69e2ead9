//! The many-to-many link between users and roles.

use tracing::info;

use crate::db::Store;
use crate::error::Error;
use crate::models::{Role, User};
use crate::orm::user_role as user_role_orm;

#[derive(Clone)]
pub struct RoleAssignments {
    store: Store,
}

impl RoleAssignments {
    pub fn new(store: Store) -> Self {
        RoleAssignments { store }
    }

    /// Gives `user_id` the role `role_id`. Inactive roles cannot be assigned.
    pub fn assign_role(&self, user_id: i32, role_id: i32) -> Result<(), Error> {
        self.store
            .write(|conn| user_role_orm::assign_user_role(conn, user_id, role_id))?;
        info!("Assigned role {} to user {}", role_id, user_id);
        Ok(())
    }

    pub fn remove_role(&self, user_id: i32, role_id: i32) -> Result<(), Error> {
        self.store
            .write(|conn| user_role_orm::remove_user_role(conn, user_id, role_id))?;
        info!("Removed role {} from user {}", role_id, user_id);
        Ok(())
    }

    pub fn roles_for_user(&self, user_id: i32) -> Result<Vec<Role>, Error> {
        self.store
            .read(|conn| Ok(user_role_orm::get_user_roles(conn, user_id)?))
    }

    pub fn users_with_role(&self, role_id: i32) -> Result<Vec<User>, Error> {
        self.store
            .read(|conn| Ok(user_role_orm::get_role_users(conn, role_id)?))
    }

    pub fn user_has_role(&self, user_id: i32, role_name: &str) -> Result<bool, Error> {
        self.store
            .read(|conn| Ok(user_role_orm::user_has_role(conn, user_id, role_name)?))
    }
}
