use diesel::prelude::*;

use crate::error::Error;
use crate::models::{NewUserRole, Role, User};
use crate::orm::role::get_role;
use crate::orm::user::get_user;

/// Assigns a role to a user.
///
/// # Errors
/// * `NotFound` if the user or the role does not exist
/// * `Validation` if the role is inactive
/// * `UniqueConstraintViolation` if the user already holds the role
pub fn assign_user_role(
    conn: &mut SqliteConnection,
    user_id_param: i32,
    role_id_param: i32,
) -> Result<(), Error> {
    use crate::schema::user_roles::dsl::*;

    conn.transaction::<_, Error, _>(|conn| {
        if get_user(conn, user_id_param)?.is_none() {
            return Err(Error::not_found("user", user_id_param));
        }
        let role = get_role(conn, role_id_param)?
            .ok_or_else(|| Error::not_found("role", role_id_param))?;
        if !role.is_active {
            return Err(Error::Validation(format!(
                "role '{}' is inactive and cannot be assigned",
                role.role_name
            )));
        }
        if user_has_role_id(conn, user_id_param, role_id_param)? {
            return Err(Error::unique(
                "user_roles.user_id, user_roles.role_id",
                format!("{}/{}", user_id_param, role_id_param),
            ));
        }

        let new_user_role = NewUserRole { user_id: user_id_param, role_id: role_id_param };
        diesel::insert_into(user_roles).values(&new_user_role).execute(conn)?;
        Ok(())
    })
}

/// Removes a role from a user
pub fn remove_user_role(
    conn: &mut SqliteConnection,
    user_id_param: i32,
    role_id_param: i32,
) -> Result<(), Error> {
    use crate::schema::user_roles::dsl::*;

    let removed = diesel::delete(
        user_roles
            .filter(user_id.eq(user_id_param))
            .filter(role_id.eq(role_id_param)),
    )
    .execute(conn)?;

    if removed == 0 {
        return Err(Error::not_found(
            "role assignment",
            format!("{}/{}", user_id_param, role_id_param),
        ));
    }
    Ok(())
}

/// Gets all roles for a specific user
pub fn get_user_roles(
    conn: &mut SqliteConnection,
    user_id_param: i32,
) -> Result<Vec<Role>, diesel::result::Error> {
    use crate::schema::{roles, user_roles};

    roles::table
        .inner_join(user_roles::table)
        .filter(user_roles::user_id.eq(user_id_param))
        .select(roles::all_columns)
        .order(roles::role_id.asc())
        .load::<Role>(conn)
}

/// Gets every user assigned a specific role
pub fn get_role_users(
    conn: &mut SqliteConnection,
    role_id_param: i32,
) -> Result<Vec<User>, diesel::result::Error> {
    use crate::schema::{user_roles, users};

    users::table
        .inner_join(user_roles::table)
        .filter(user_roles::role_id.eq(role_id_param))
        .select(users::all_columns)
        .order(users::id.asc())
        .load::<User>(conn)
}

/// Checks if a user has a specific role by role name.
///
/// Names are compared exactly; role names are only ever stored once.
pub fn user_has_role(
    conn: &mut SqliteConnection,
    user_id_param: i32,
    role_name_param: &str,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::{roles, user_roles};

    let count: i64 = roles::table
        .inner_join(user_roles::table)
        .filter(user_roles::user_id.eq(user_id_param))
        .filter(roles::role_name.eq(role_name_param))
        .count()
        .get_result(conn)?;

    Ok(count > 0)
}

fn user_has_role_id(
    conn: &mut SqliteConnection,
    user_id_param: i32,
    role_id_param: i32,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::user_roles::dsl::*;

    let count: i64 = user_roles
        .filter(user_id.eq(user_id_param))
        .filter(role_id.eq(role_id_param))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameMatching;
    use crate::models::RoleInput;
    use crate::orm::role::{insert_role, set_role_active};
    use crate::orm::testing::{create_test_user, setup_test_db};

    fn role(conn: &mut SqliteConnection, name: &str) -> Role {
        insert_role(conn, RoleInput::new(name), NameMatching::Exact).unwrap()
    }

    #[test]
    fn test_assign_and_get_user_roles() {
        let mut conn = setup_test_db();
        let admin_role = role(&mut conn, "site-admin");
        let staff_role = role(&mut conn, "site-staff");
        let user = create_test_user(&mut conn, "test@example.com");

        assign_user_role(&mut conn, user.id, admin_role.role_id).unwrap();
        assign_user_role(&mut conn, user.id, staff_role.role_id).unwrap();

        let assigned = get_user_roles(&mut conn, user.id).unwrap();
        let names: Vec<&str> = assigned.iter().map(|r| r.role_name.as_str()).collect();
        assert_eq!(names, vec!["site-admin", "site-staff"]);

        let holders = get_role_users(&mut conn, admin_role.role_id).unwrap();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].id, user.id);
    }

    #[test]
    fn test_user_has_role() {
        let mut conn = setup_test_db();
        let admin_role = role(&mut conn, "site-admin");
        role(&mut conn, "site-staff");
        let user = create_test_user(&mut conn, "test2@example.com");

        assert!(!user_has_role(&mut conn, user.id, "site-admin").unwrap());
        assign_user_role(&mut conn, user.id, admin_role.role_id).unwrap();
        assert!(user_has_role(&mut conn, user.id, "site-admin").unwrap());
        assert!(!user_has_role(&mut conn, user.id, "site-staff").unwrap());
    }

    #[test]
    fn test_duplicate_assignment_rejected() {
        let mut conn = setup_test_db();
        let r = role(&mut conn, "auditor");
        let user = create_test_user(&mut conn, "test3@example.com");

        assign_user_role(&mut conn, user.id, r.role_id).unwrap();
        let again = assign_user_role(&mut conn, user.id, r.role_id);
        assert!(matches!(again, Err(Error::UniqueConstraintViolation { .. })));
    }

    #[test]
    fn test_inactive_role_cannot_be_assigned() {
        let mut conn = setup_test_db();
        let r = role(&mut conn, "retired");
        set_role_active(&mut conn, r.role_id, false).unwrap();
        let user = create_test_user(&mut conn, "test4@example.com");

        let result = assign_user_role(&mut conn, user.id, r.role_id);
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(get_user_roles(&mut conn, user.id).unwrap().is_empty());
    }

    #[test]
    fn test_assign_unknown_user_or_role() {
        let mut conn = setup_test_db();
        let r = role(&mut conn, "viewer");
        let user = create_test_user(&mut conn, "test5@example.com");

        assert!(matches!(
            assign_user_role(&mut conn, 999, r.role_id),
            Err(Error::NotFound { entity: "user", .. })
        ));
        assert!(matches!(
            assign_user_role(&mut conn, user.id, 999),
            Err(Error::NotFound { entity: "role", .. })
        ));
    }

    #[test]
    fn test_remove_user_role() {
        let mut conn = setup_test_db();
        let r = role(&mut conn, "editor");
        let user = create_test_user(&mut conn, "test6@example.com");
        assign_user_role(&mut conn, user.id, r.role_id).unwrap();

        remove_user_role(&mut conn, user.id, r.role_id).unwrap();
        assert!(get_user_roles(&mut conn, user.id).unwrap().is_empty());
        assert!(matches!(
            remove_user_role(&mut conn, user.id, r.role_id),
            Err(Error::NotFound { .. })
        ));
    }
}
