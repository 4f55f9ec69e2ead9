use chrono::Utc;
use diesel::prelude::*;

use super::lower;
use crate::config::NameMatching;
use crate::error::Error;
use crate::models::{Admin, AdminInput, AdminUpdate, NewAdmin};
use crate::orm::user::get_user;
use crate::validation::{require_id, require_name};

const CODE_CONSTRAINT: &str = "uq_admins_code";
const USER_CONSTRAINT: &str = "admins.user_id";

/// Grants administrative rights to an existing user.
///
/// # Errors
/// * `Validation` if the user id is not positive or the code is blank or
///   longer than 50 characters
/// * `NotFound` if the user does not exist
/// * `UniqueConstraintViolation` if the user already has an admin record or
///   the code is taken
pub fn insert_admin(
    conn: &mut SqliteConnection,
    input: AdminInput,
    matching: NameMatching,
) -> Result<Admin, Error> {
    use crate::schema::admins::dsl::*;

    require_id("user_id", input.user_id)?;
    require_name("admin_code", &input.admin_code)?;

    conn.transaction::<_, Error, _>(|conn| {
        if get_user(conn, input.user_id)?.is_none() {
            return Err(Error::not_found("user", input.user_id));
        }
        if get_admin(conn, input.user_id)?.is_some() {
            return Err(Error::unique(USER_CONSTRAINT, input.user_id));
        }
        if find_admin_by_code(conn, &input.admin_code, matching)?.is_some() {
            return Err(Error::unique(CODE_CONSTRAINT, &input.admin_code));
        }

        let now = Utc::now().naive_utc();
        let new_admin = NewAdmin {
            user_id: input.user_id,
            admin_code: input.admin_code,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(admins).values(&new_admin).execute(conn)?;

        Ok(admins.filter(user_id.eq(new_admin.user_id)).first::<Admin>(conn)?)
    })
}

/// Gets the admin record of a user, if any.
pub fn get_admin(
    conn: &mut SqliteConnection,
    target_user_id: i32,
) -> Result<Option<Admin>, diesel::result::Error> {
    use crate::schema::admins::dsl::*;
    admins.filter(user_id.eq(target_user_id)).first::<Admin>(conn).optional()
}

pub fn find_admin_by_code(
    conn: &mut SqliteConnection,
    code: &str,
    matching: NameMatching,
) -> Result<Option<Admin>, diesel::result::Error> {
    use crate::schema::admins::dsl::*;

    match matching {
        NameMatching::Exact => admins.filter(admin_code.eq(code)).first::<Admin>(conn).optional(),
        NameMatching::CaseInsensitive => admins
            .filter(lower(admin_code).eq(lower(code)))
            .first::<Admin>(conn)
            .optional(),
    }
}

/// Returns all admin records in ascending order by user id.
pub fn list_admins(conn: &mut SqliteConnection) -> Result<Vec<Admin>, diesel::result::Error> {
    use crate::schema::admins::dsl::*;
    admins.order(user_id.asc()).load::<Admin>(conn)
}

/// Replaces the admin code of a user's record. Last write wins.
pub fn update_admin(
    conn: &mut SqliteConnection,
    target_user_id: i32,
    update: AdminUpdate,
    matching: NameMatching,
) -> Result<Admin, Error> {
    use crate::schema::admins::dsl::*;

    require_name("admin_code", &update.admin_code)?;

    conn.transaction::<_, Error, _>(|conn| {
        if get_admin(conn, target_user_id)?.is_none() {
            return Err(Error::not_found("admin", target_user_id));
        }
        if let Some(existing) = find_admin_by_code(conn, &update.admin_code, matching)? {
            if existing.user_id != target_user_id {
                return Err(Error::unique(CODE_CONSTRAINT, &update.admin_code));
            }
        }

        diesel::update(admins.filter(user_id.eq(target_user_id)))
            .set((admin_code.eq(&update.admin_code), updated_at.eq(Utc::now().naive_utc())))
            .execute(conn)?;

        Ok(admins.filter(user_id.eq(target_user_id)).first::<Admin>(conn)?)
    })
}

/// Removes a user's admin record. The user itself is untouched.
pub fn delete_admin(conn: &mut SqliteConnection, target_user_id: i32) -> Result<(), Error> {
    use crate::schema::admins::dsl::*;

    let removed = diesel::delete(admins.filter(user_id.eq(target_user_id))).execute(conn)?;
    if removed == 0 {
        return Err(Error::not_found("admin", target_user_id));
    }
    Ok(())
}
