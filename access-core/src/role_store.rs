//! Named permission roles.
//!
//! Roles are created, renamed and toggled here; `role_id` is never changed
//! through this API. A role that is still assigned to any user cannot be
//! deleted. Deactivate it instead, which keeps every assignment intact but
//! stops new ones.

use tracing::info;

use crate::db::Store;
use crate::error::Error;
use crate::models::{Role, RoleInput, RoleUpdate};
use crate::orm::role as role_orm;

#[derive(Clone)]
pub struct RoleStore {
    store: Store,
}

impl RoleStore {
    pub fn new(store: Store) -> Self {
        RoleStore { store }
    }

    /// Creates a role.
    ///
    /// # Errors
    /// * `Validation` if the name is blank or longer than 50 characters
    /// * `UniqueConstraintViolation` if the name is already taken
    pub fn create_role(&self, input: RoleInput) -> Result<Role, Error> {
        let matching = self.store.name_matching();
        let role = self.store.write(|conn| role_orm::insert_role(conn, input, matching))?;
        info!("Created role {} '{}'", role.role_id, role.role_name);
        Ok(role)
    }

    pub fn get_role(&self, role_id: i32) -> Result<Role, Error> {
        self.store.read(|conn| {
            role_orm::get_role(conn, role_id)?.ok_or_else(|| Error::not_found("role", role_id))
        })
    }

    pub fn find_by_name(&self, name: &str) -> Result<Role, Error> {
        let matching = self.store.name_matching();
        self.store.read(|conn| {
            role_orm::find_role_by_name(conn, name, matching)?
                .ok_or_else(|| Error::not_found("role", name))
        })
    }

    pub fn list_roles(&self) -> Result<Vec<Role>, Error> {
        self.store.read(|conn| Ok(role_orm::get_all_roles(conn)?))
    }

    /// Replaces the name, description and active flag of a role.
    pub fn update_role(&self, role_id: i32, update: RoleUpdate) -> Result<Role, Error> {
        let matching = self.store.name_matching();
        let role = self
            .store
            .write(|conn| role_orm::update_role(conn, role_id, update, matching))?;
        info!("Updated role {} '{}'", role.role_id, role.role_name);
        Ok(role)
    }

    /// Marks a role inactive. Existing assignments are kept.
    pub fn deactivate_role(&self, role_id: i32) -> Result<Role, Error> {
        let role = self
            .store
            .write(|conn| role_orm::set_role_active(conn, role_id, false))?;
        info!("Deactivated role {} '{}'", role.role_id, role.role_name);
        Ok(role)
    }

    pub fn activate_role(&self, role_id: i32) -> Result<Role, Error> {
        let role = self
            .store
            .write(|conn| role_orm::set_role_active(conn, role_id, true))?;
        info!("Activated role {} '{}'", role.role_id, role.role_name);
        Ok(role)
    }

    /// Deletes a role.
    ///
    /// # Errors
    /// * `NotFound` if the role does not exist
    /// * `ReferentialIntegrity` if any user is still assigned the role; no
    ///   row is changed
    pub fn delete_role(&self, role_id: i32) -> Result<(), Error> {
        self.store.write(|conn| role_orm::delete_role(conn, role_id))?;
        info!("Deleted role {}", role_id);
        Ok(())
    }

    pub fn count_assignments(&self, role_id: i32) -> Result<i64, Error> {
        self.store
            .read(|conn| Ok(role_orm::count_role_assignments(conn, role_id)?))
    }
}
