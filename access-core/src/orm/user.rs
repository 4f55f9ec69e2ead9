use chrono::Utc;
use diesel::prelude::*;

use super::{last_insert_rowid, lower};
use crate::error::Error;
use crate::integrity::{self, Entity, IntegrityReport};
use crate::models::{NewUser, NewUserWithId, User};
use crate::validation::require_id;

const EMAIL_CONSTRAINT: &str = "users.email";

fn require_email(value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation("email is required".to_string()));
    }
    Ok(())
}

/// Inserts a new user with a database-assigned id.
pub fn insert_user(conn: &mut SqliteConnection, user_email: &str) -> Result<User, Error> {
    use crate::schema::users::dsl::*;

    require_email(user_email)?;

    conn.transaction::<_, Error, _>(|conn| {
        if get_user_by_email(conn, user_email)?.is_some() {
            return Err(Error::unique(EMAIL_CONSTRAINT, user_email));
        }

        let now = Utc::now().naive_utc();
        let new_user = NewUser { email: user_email.to_string(), created_at: now, updated_at: now };
        diesel::insert_into(users).values(&new_user).execute(conn)?;
        let last_id = last_insert_rowid(conn)?;

        Ok(users.filter(id.eq(last_id)).first::<User>(conn)?)
    })
}

/// Inserts a user whose id was assigned by an external directory.
pub fn insert_user_with_id(
    conn: &mut SqliteConnection,
    user_id: i32,
    user_email: &str,
) -> Result<User, Error> {
    use crate::schema::users::dsl::*;

    require_id("id", user_id)?;
    require_email(user_email)?;

    conn.transaction::<_, Error, _>(|conn| {
        if get_user(conn, user_id)?.is_some() {
            return Err(Error::unique("users.id", user_id));
        }
        if get_user_by_email(conn, user_email)?.is_some() {
            return Err(Error::unique(EMAIL_CONSTRAINT, user_email));
        }

        let now = Utc::now().naive_utc();
        let new_user = NewUserWithId {
            id: user_id,
            email: user_email.to_string(),
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(users).values(&new_user).execute(conn)?;

        Ok(users.filter(id.eq(user_id)).first::<User>(conn)?)
    })
}

/// Gets a single user by ID.
pub fn get_user(conn: &mut SqliteConnection, user_id: i32) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.filter(id.eq(user_id)).first::<User>(conn).optional()
}

/// Gets a single user by email (case-insensitive).
pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    user_email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users
        .filter(lower(email).eq(lower(user_email)))
        .first::<User>(conn)
        .optional()
}

/// Returns all users in ascending order by id.
pub fn list_all_users(conn: &mut SqliteConnection) -> Result<Vec<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.order(id.asc()).load::<User>(conn)
}

/// Deletes a user together with its admin record and role assignments.
///
/// # Returns
/// * `Ok(IntegrityReport)` - Rows removed from each dependent table
/// * `Err(Error::NotFound)` - No such user
pub fn delete_user(conn: &mut SqliteConnection, user_id: i32) -> Result<IntegrityReport, Error> {
    integrity::enforce_delete(conn, Entity::User, user_id)
}

/// Changes a user's id, carrying its admin record and role assignments
/// along to the new id.
pub fn change_user_id(
    conn: &mut SqliteConnection,
    old_id: i32,
    new_id: i32,
) -> Result<IntegrityReport, Error> {
    integrity::enforce_update_key(conn, Entity::User, old_id, new_id)
}
