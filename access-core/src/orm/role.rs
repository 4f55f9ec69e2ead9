use chrono::Utc;
use diesel::prelude::*;

use super::{last_insert_rowid, lower};
use crate::config::NameMatching;
use crate::error::Error;
use crate::integrity::{self, Entity, IntegrityReport};
use crate::models::{NewRole, Role, RoleChangeset, RoleInput, RoleUpdate};
use crate::validation::require_name;

const NAME_CONSTRAINT: &str = "uq_roles_name";

/// Inserts a new role after validating it and checking that the name is free
/// under `matching`.
pub fn insert_role(
    conn: &mut SqliteConnection,
    input: RoleInput,
    matching: NameMatching,
) -> Result<Role, Error> {
    use crate::schema::roles::dsl::*;

    require_name("role_name", &input.role_name)?;

    conn.transaction::<_, Error, _>(|conn| {
        if find_role_by_name(conn, &input.role_name, matching)?.is_some() {
            return Err(Error::unique(NAME_CONSTRAINT, &input.role_name));
        }

        let now = Utc::now().naive_utc();
        let new_role = NewRole {
            role_name: input.role_name,
            role_description: input.role_description,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(roles).values(&new_role).execute(conn)?;
        let last_id = last_insert_rowid(conn)?;

        Ok(roles.filter(role_id.eq(last_id)).first::<Role>(conn)?)
    })
}

/// Gets a single role by ID.
pub fn get_role(conn: &mut SqliteConnection, id: i32) -> Result<Option<Role>, diesel::result::Error> {
    use crate::schema::roles::dsl::*;
    roles.filter(role_id.eq(id)).first::<Role>(conn).optional()
}

/// Returns all roles in ascending order by id.
pub fn get_all_roles(conn: &mut SqliteConnection) -> Result<Vec<Role>, diesel::result::Error> {
    use crate::schema::roles::dsl::*;
    roles.order(role_id.asc()).load::<Role>(conn)
}

/// Looks a role up by name using the given matching policy.
pub fn find_role_by_name(
    conn: &mut SqliteConnection,
    name: &str,
    matching: NameMatching,
) -> Result<Option<Role>, diesel::result::Error> {
    use crate::schema::roles::dsl::*;

    match matching {
        NameMatching::Exact => roles.filter(role_name.eq(name)).first::<Role>(conn).optional(),
        NameMatching::CaseInsensitive => roles
            .filter(lower(role_name).eq(lower(name)))
            .first::<Role>(conn)
            .optional(),
    }
}

/// Replaces every mutable field of a role. Last write wins.
///
/// # Errors
/// * `NotFound` if the role does not exist
/// * `Validation` if the new name is blank or too long
/// * `UniqueConstraintViolation` if another role already has the new name
pub fn update_role(
    conn: &mut SqliteConnection,
    id: i32,
    update: RoleUpdate,
    matching: NameMatching,
) -> Result<Role, Error> {
    use crate::schema::roles::dsl::*;

    require_name("role_name", &update.role_name)?;

    conn.transaction::<_, Error, _>(|conn| {
        if get_role(conn, id)?.is_none() {
            return Err(Error::not_found("role", id));
        }
        if let Some(existing) = find_role_by_name(conn, &update.role_name, matching)? {
            if existing.role_id != id {
                return Err(Error::unique(NAME_CONSTRAINT, &update.role_name));
            }
        }

        let changes = RoleChangeset {
            role_name: update.role_name,
            role_description: update.role_description,
            is_active: update.is_active,
            updated_at: Utc::now().naive_utc(),
        };
        diesel::update(roles.filter(role_id.eq(id)))
            .set(&changes)
            .execute(conn)?;

        Ok(roles.filter(role_id.eq(id)).first::<Role>(conn)?)
    })
}

/// Flips `is_active` without touching any assignment of the role.
pub fn set_role_active(conn: &mut SqliteConnection, id: i32, active: bool) -> Result<Role, Error> {
    use crate::schema::roles::dsl::*;

    let updated = diesel::update(roles.filter(role_id.eq(id)))
        .set((is_active.eq(active), updated_at.eq(Utc::now().naive_utc())))
        .execute(conn)?;
    if updated == 0 {
        return Err(Error::not_found("role", id));
    }

    Ok(roles.filter(role_id.eq(id)).first::<Role>(conn)?)
}

/// Number of users currently assigned the role.
pub fn count_role_assignments(
    conn: &mut SqliteConnection,
    id: i32,
) -> Result<i64, diesel::result::Error> {
    use crate::schema::user_roles::dsl::*;
    user_roles.filter(role_id.eq(id)).count().get_result(conn)
}

/// Deletes a role. Blocked while any user is assigned the role.
pub fn delete_role(conn: &mut SqliteConnection, id: i32) -> Result<(), Error> {
    integrity::enforce_delete(conn, Entity::Role, id).map(|_| ())
}

/// Rewrites a role's primary key, carrying its assignments along.
pub fn change_role_id(
    conn: &mut SqliteConnection,
    old_id: i32,
    new_id: i32,
) -> Result<IntegrityReport, Error> {
    integrity::enforce_update_key(conn, Entity::Role, old_id, new_id)
}
