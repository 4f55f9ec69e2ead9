//! Administrative capability records.
//!
//! An admin record belongs to exactly one user and carries an external
//! `admin_code`. Revoking it is an explicit operation here; the record also
//! disappears (or follows a new user id) when the owning user is deleted or
//! re-keyed, which [`crate::integrity`] handles on the user's behalf.

use tracing::info;

use crate::db::Store;
use crate::error::Error;
use crate::models::{Admin, AdminInput, AdminUpdate};
use crate::orm::admin as admin_orm;

#[derive(Clone)]
pub struct AdminIdentity {
    store: Store,
}

impl AdminIdentity {
    pub fn new(store: Store) -> Self {
        AdminIdentity { store }
    }

    /// Grants admin rights to `user_id` under `admin_code`.
    ///
    /// # Errors
    /// * `Validation` for a non-positive id or a blank / oversized code
    /// * `NotFound` if the user does not exist
    /// * `UniqueConstraintViolation` if the user is already an admin or the
    ///   code is taken
    pub fn grant_admin(&self, user_id: i32, admin_code: &str) -> Result<Admin, Error> {
        let matching = self.store.name_matching();
        let input = AdminInput { user_id, admin_code: admin_code.to_string() };
        let admin = self.store.write(|conn| admin_orm::insert_admin(conn, input, matching))?;
        info!("Granted admin {} to user {}", admin.admin_code, admin.user_id);
        Ok(admin)
    }

    pub fn revoke_admin(&self, user_id: i32) -> Result<(), Error> {
        self.store.write(|conn| admin_orm::delete_admin(conn, user_id))?;
        info!("Revoked admin rights of user {}", user_id);
        Ok(())
    }

    pub fn get_admin(&self, user_id: i32) -> Result<Admin, Error> {
        self.store.read(|conn| {
            admin_orm::get_admin(conn, user_id)?.ok_or_else(|| Error::not_found("admin", user_id))
        })
    }

    pub fn find_by_code(&self, admin_code: &str) -> Result<Admin, Error> {
        let matching = self.store.name_matching();
        self.store.read(|conn| {
            admin_orm::find_admin_by_code(conn, admin_code, matching)?
                .ok_or_else(|| Error::not_found("admin", admin_code))
        })
    }

    pub fn is_admin(&self, user_id: i32) -> Result<bool, Error> {
        self.store
            .read(|conn| Ok(admin_orm::get_admin(conn, user_id)?.is_some()))
    }

    pub fn list_admins(&self) -> Result<Vec<Admin>, Error> {
        self.store.read(|conn| Ok(admin_orm::list_admins(conn)?))
    }

    /// Replaces the admin code of an existing record.
    pub fn update_admin(&self, user_id: i32, update: AdminUpdate) -> Result<Admin, Error> {
        let matching = self.store.name_matching();
        let admin = self
            .store
            .write(|conn| admin_orm::update_admin(conn, user_id, update, matching))?;
        info!("Changed admin code of user {} to {}", admin.user_id, admin.admin_code);
        Ok(admin)
    }
}
