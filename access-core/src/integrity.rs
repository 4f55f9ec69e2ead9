//! Referential-integrity enforcement.
//!
//! Every foreign key in the schema is listed in [`RULES`] together with what
//! happens to the referencing rows when the referenced row is deleted or has
//! its primary key rewritten. [`enforce_delete`] and [`enforce_update_key`]
//! consult the table before touching the parent row: all `Restrict` rules are
//! checked first, and only when none of them finds a dependent are the
//! `Cascade` rules applied. Both run inside a transaction (a savepoint when
//! the caller already holds one), so a blocked request leaves every row as it
//! was.
//!
//! The schema declares the same rules on its foreign keys (`ON DELETE` /
//! `ON UPDATE CASCADE` where the table says `Cascade`, no action where it
//! says `Restrict`), deferred to commit. A write that bypasses this module
//! gets the same cascades and still cannot commit an orphan.

use std::fmt;

use diesel::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Error;
use crate::schema::{admins, roles, user_roles, users};
use crate::validation::require_id;

/// A table whose primary key other rows refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Entity {
    User,
    Role,
}

impl Entity {
    pub fn name(self) -> &'static str {
        match self {
            Entity::User => "user",
            Entity::Role => "role",
        }
    }

    fn primary_key_constraint(self) -> &'static str {
        match self {
            Entity::User => "users.id",
            Entity::Role => "roles.role_id",
        }
    }

    fn exists(self, conn: &mut SqliteConnection, key: i32) -> QueryResult<bool> {
        let count: i64 = match self {
            Entity::User => users::table.filter(users::id.eq(key)).count().get_result(conn)?,
            Entity::Role => roles::table.filter(roles::role_id.eq(key)).count().get_result(conn)?,
        };
        Ok(count > 0)
    }

    fn delete(self, conn: &mut SqliteConnection, key: i32) -> QueryResult<usize> {
        match self {
            Entity::User => diesel::delete(users::table.filter(users::id.eq(key))).execute(conn),
            Entity::Role => diesel::delete(roles::table.filter(roles::role_id.eq(key))).execute(conn),
        }
    }

    fn rekey(self, conn: &mut SqliteConnection, old: i32, new: i32) -> QueryResult<usize> {
        match self {
            Entity::User => diesel::update(users::table.filter(users::id.eq(old)))
                .set(users::id.eq(new))
                .execute(conn),
            Entity::Role => diesel::update(roles::table.filter(roles::role_id.eq(old)))
                .set(roles::role_id.eq(new))
                .execute(conn),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Delete,
    UpdateKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Policy {
    /// Refuse the change while any dependent row exists.
    Restrict,
    /// Apply the change to every dependent row as well.
    Cascade,
}

/// A foreign-key column that points at an [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dependent {
    /// `admins.user_id`
    AdminOfUser,
    /// `user_roles.user_id`
    RoleAssignmentOfUser,
    /// `user_roles.role_id`
    AssignmentOfRole,
}

impl Dependent {
    pub fn table(self) -> &'static str {
        match self {
            Dependent::AdminOfUser => "admins",
            Dependent::RoleAssignmentOfUser | Dependent::AssignmentOfRole => "user_roles",
        }
    }

    fn count(self, conn: &mut SqliteConnection, key: i32) -> QueryResult<i64> {
        match self {
            Dependent::AdminOfUser => admins::table
                .filter(admins::user_id.eq(key))
                .count()
                .get_result(conn),
            Dependent::RoleAssignmentOfUser => user_roles::table
                .filter(user_roles::user_id.eq(key))
                .count()
                .get_result(conn),
            Dependent::AssignmentOfRole => user_roles::table
                .filter(user_roles::role_id.eq(key))
                .count()
                .get_result(conn),
        }
    }

    fn delete(self, conn: &mut SqliteConnection, key: i32) -> QueryResult<usize> {
        match self {
            Dependent::AdminOfUser => {
                diesel::delete(admins::table.filter(admins::user_id.eq(key))).execute(conn)
            }
            Dependent::RoleAssignmentOfUser => {
                diesel::delete(user_roles::table.filter(user_roles::user_id.eq(key))).execute(conn)
            }
            Dependent::AssignmentOfRole => {
                diesel::delete(user_roles::table.filter(user_roles::role_id.eq(key))).execute(conn)
            }
        }
    }

    fn rekey(self, conn: &mut SqliteConnection, old: i32, new: i32) -> QueryResult<usize> {
        match self {
            Dependent::AdminOfUser => diesel::update(admins::table.filter(admins::user_id.eq(old)))
                .set(admins::user_id.eq(new))
                .execute(conn),
            Dependent::RoleAssignmentOfUser => {
                diesel::update(user_roles::table.filter(user_roles::user_id.eq(old)))
                    .set(user_roles::user_id.eq(new))
                    .execute(conn)
            }
            Dependent::AssignmentOfRole => {
                diesel::update(user_roles::table.filter(user_roles::role_id.eq(old)))
                    .set(user_roles::role_id.eq(new))
                    .execute(conn)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub parent: Entity,
    pub action: Action,
    pub dependent: Dependent,
    pub policy: Policy,
}

pub const RULES: &[Rule] = &[
    Rule {
        parent: Entity::User,
        action: Action::Delete,
        dependent: Dependent::AdminOfUser,
        policy: Policy::Cascade,
    },
    Rule {
        parent: Entity::User,
        action: Action::UpdateKey,
        dependent: Dependent::AdminOfUser,
        policy: Policy::Cascade,
    },
    Rule {
        parent: Entity::User,
        action: Action::Delete,
        dependent: Dependent::RoleAssignmentOfUser,
        policy: Policy::Cascade,
    },
    Rule {
        parent: Entity::User,
        action: Action::UpdateKey,
        dependent: Dependent::RoleAssignmentOfUser,
        policy: Policy::Cascade,
    },
    Rule {
        parent: Entity::Role,
        action: Action::Delete,
        dependent: Dependent::AssignmentOfRole,
        policy: Policy::Restrict,
    },
    Rule {
        parent: Entity::Role,
        action: Action::UpdateKey,
        dependent: Dependent::AssignmentOfRole,
        policy: Policy::Cascade,
    },
];

/// Rules that fire when `action` is requested against `parent`.
pub fn rules_for(parent: Entity, action: Action) -> impl Iterator<Item = &'static Rule> {
    RULES
        .iter()
        .filter(move |rule| rule.parent == parent && rule.action == action)
}

/// Rows touched by cascading rules during one enforced change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub cascaded: Vec<(Dependent, usize)>,
}

impl IntegrityReport {
    /// Rows of `dependent` deleted or re-keyed by the change.
    pub fn rows(&self, dependent: Dependent) -> usize {
        self.cascaded
            .iter()
            .filter(|(d, _)| *d == dependent)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.cascaded.iter().map(|(_, n)| n).sum()
    }
}

fn check_restrictions(
    conn: &mut SqliteConnection,
    parent: Entity,
    action: Action,
    key: i32,
) -> Result<(), Error> {
    for rule in rules_for(parent, action).filter(|r| r.policy == Policy::Restrict) {
        let count = rule.dependent.count(conn, key)?;
        if count > 0 {
            warn!(
                "Refusing {:?} of {} {}: {} {} row(s) depend on it",
                action,
                parent,
                key,
                count,
                rule.dependent.table()
            );
            return Err(Error::ReferentialIntegrity {
                entity: parent.name(),
                key: key.to_string(),
                dependent: rule.dependent.table(),
                count,
            });
        }
    }
    Ok(())
}

/// Deletes the `parent` row identified by `key`, applying every delete rule.
///
/// # Errors
/// * `NotFound` if no such row exists
/// * `ReferentialIntegrity` if a `Restrict` rule finds dependents; nothing is
///   written in that case
pub fn enforce_delete(
    conn: &mut SqliteConnection,
    parent: Entity,
    key: i32,
) -> Result<IntegrityReport, Error> {
    conn.transaction::<_, Error, _>(|conn| {
        if !parent.exists(conn, key)? {
            return Err(Error::not_found(parent.name(), key));
        }
        check_restrictions(conn, parent, Action::Delete, key)?;

        let mut report = IntegrityReport::default();
        for rule in rules_for(parent, Action::Delete).filter(|r| r.policy == Policy::Cascade) {
            let removed = rule.dependent.delete(conn, key)?;
            if removed > 0 {
                debug!(
                    "Cascaded delete of {} {} to {} {} row(s)",
                    parent,
                    key,
                    removed,
                    rule.dependent.table()
                );
            }
            report.cascaded.push((rule.dependent, removed));
        }

        parent.delete(conn, key)?;
        Ok(report)
    })
}

/// Rewrites the primary key of a `parent` row from `old` to `new`, applying
/// every key-update rule.
///
/// # Errors
/// * `Validation` if `new` is not a positive id
/// * `NotFound` if `old` does not exist
/// * `UniqueConstraintViolation` if `new` is already taken
/// * `ReferentialIntegrity` if a `Restrict` rule finds dependents
pub fn enforce_update_key(
    conn: &mut SqliteConnection,
    parent: Entity,
    old: i32,
    new: i32,
) -> Result<IntegrityReport, Error> {
    require_id("new key", new)?;

    conn.transaction::<_, Error, _>(|conn| {
        if !parent.exists(conn, old)? {
            return Err(Error::not_found(parent.name(), old));
        }
        if old == new {
            return Ok(IntegrityReport::default());
        }
        if parent.exists(conn, new)? {
            return Err(Error::unique(parent.primary_key_constraint(), new));
        }
        check_restrictions(conn, parent, Action::UpdateKey, old)?;

        // dependents move before the parent, or ON UPDATE CASCADE moves them unreported
        let mut report = IntegrityReport::default();
        for rule in rules_for(parent, Action::UpdateKey).filter(|r| r.policy == Policy::Cascade) {
            let moved = rule.dependent.rekey(conn, old, new)?;
            if moved > 0 {
                debug!(
                    "Cascaded {} key {} -> {} to {} {} row(s)",
                    parent,
                    old,
                    new,
                    moved,
                    rule.dependent.table()
                );
            }
            report.cascaded.push((rule.dependent, moved));
        }

        parent.rekey(conn, old, new)?;
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_parent_action_pair_has_rules() {
        for parent in [Entity::User, Entity::Role] {
            for action in [Action::Delete, Action::UpdateKey] {
                assert!(
                    rules_for(parent, action).next().is_some(),
                    "no rules for {:?} {:?}",
                    parent,
                    action
                );
            }
        }
    }

    #[test]
    fn test_declared_policies() {
        let policy = |parent, action, dependent| {
            RULES
                .iter()
                .find(|r| r.parent == parent && r.action == action && r.dependent == dependent)
                .map(|r| r.policy)
        };

        assert_eq!(
            policy(Entity::Role, Action::Delete, Dependent::AssignmentOfRole),
            Some(Policy::Restrict)
        );
        assert_eq!(
            policy(Entity::Role, Action::UpdateKey, Dependent::AssignmentOfRole),
            Some(Policy::Cascade)
        );
        assert_eq!(
            policy(Entity::User, Action::Delete, Dependent::AdminOfUser),
            Some(Policy::Cascade)
        );
        assert_eq!(
            policy(Entity::User, Action::UpdateKey, Dependent::AdminOfUser),
            Some(Policy::Cascade)
        );
        // Role changes never reach admin records
        assert!(
            RULES
                .iter()
                .all(|r| !(r.parent == Entity::Role && r.dependent == Dependent::AdminOfUser))
        );
    }

    #[test]
    fn test_report_totals() {
        let report = IntegrityReport {
            cascaded: vec![(Dependent::AdminOfUser, 1), (Dependent::RoleAssignmentOfUser, 3)],
        };
        assert_eq!(report.rows(Dependent::AdminOfUser), 1);
        assert_eq!(report.rows(Dependent::AssignmentOfRole), 0);
        assert_eq!(report.total(), 4);
    }
}
