//! The user aggregate that admin records and role assignments hang off.
//!
//! Only the lifecycle events the access-control rules depend on live here:
//! creation, deletion and primary-key changes.

use tracing::info;

use crate::db::Store;
use crate::error::Error;
use crate::integrity::{Dependent, IntegrityReport};
use crate::models::{User, UserWithRoles};
use crate::orm::{admin as admin_orm, user as user_orm, user_role as user_role_orm};

#[derive(Clone)]
pub struct UserDirectory {
    store: Store,
}

impl UserDirectory {
    pub fn new(store: Store) -> Self {
        UserDirectory { store }
    }

    pub fn create_user(&self, email: &str) -> Result<User, Error> {
        let user = self.store.write(|conn| user_orm::insert_user(conn, email))?;
        info!("Created user {} <{}>", user.id, user.email);
        Ok(user)
    }

    /// Creates a user with an id assigned by an external directory.
    pub fn create_user_with_id(&self, user_id: i32, email: &str) -> Result<User, Error> {
        let user = self
            .store
            .write(|conn| user_orm::insert_user_with_id(conn, user_id, email))?;
        info!("Created user {} <{}>", user.id, user.email);
        Ok(user)
    }

    pub fn get_user(&self, user_id: i32) -> Result<User, Error> {
        self.store.read(|conn| {
            user_orm::get_user(conn, user_id)?.ok_or_else(|| Error::not_found("user", user_id))
        })
    }

    pub fn find_by_email(&self, email: &str) -> Result<User, Error> {
        self.store.read(|conn| {
            user_orm::get_user_by_email(conn, email)?.ok_or_else(|| Error::not_found("user", email))
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>, Error> {
        self.store.read(|conn| Ok(user_orm::list_all_users(conn)?))
    }

    /// A user together with its roles and admin status.
    pub fn get_user_with_roles(&self, user_id: i32) -> Result<UserWithRoles, Error> {
        self.store.read(|conn| {
            let user =
                user_orm::get_user(conn, user_id)?.ok_or_else(|| Error::not_found("user", user_id))?;
            let roles = user_role_orm::get_user_roles(conn, user_id)?;
            let is_admin = admin_orm::get_admin(conn, user_id)?.is_some();
            Ok(UserWithRoles { id: user.id, email: user.email, is_admin, roles })
        })
    }

    /// Deletes a user. Its admin record and role assignments go with it in
    /// the same transaction.
    pub fn delete_user(&self, user_id: i32) -> Result<IntegrityReport, Error> {
        let report = self.store.write(|conn| user_orm::delete_user(conn, user_id))?;
        info!(
            "Deleted user {} (admin records: {}, role assignments: {})",
            user_id,
            report.rows(Dependent::AdminOfUser),
            report.rows(Dependent::RoleAssignmentOfUser)
        );
        Ok(report)
    }

    /// Moves a user to a new id, updating its admin record and role
    /// assignments in the same transaction.
    pub fn change_user_id(&self, old_id: i32, new_id: i32) -> Result<IntegrityReport, Error> {
        let report = self
            .store
            .write(|conn| user_orm::change_user_id(conn, old_id, new_id))?;
        info!("Moved user {} to id {} ({} dependent row(s))", old_id, new_id, report.total());
        Ok(report)
    }
}
