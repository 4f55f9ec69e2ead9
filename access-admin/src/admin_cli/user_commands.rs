use access_core::models::UserWithRoles;
use access_core::{RoleAssignments, RoleStore, Store, UserDirectory};
use clap::Subcommand;

use super::utils::{
    confirm, describe_error, filter_by, print_cascades, print_json, resolve_role_id,
    resolve_user_id,
};

#[derive(Subcommand)]
pub enum UserAction {
    #[command(about = "List users, optionally filtered by email")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
        #[arg(short, long, help = "Only users holding this role (ID or name)")]
        role: Option<String>,
        #[arg(long, help = "Print users as JSON")]
        json: bool,
    },
    #[command(about = "Add a user")]
    Add {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(long, help = "Use this user ID instead of the next free one")]
        id: Option<i32>,
    },
    #[command(about = "Remove users matching search term, with their admin records and role assignments")]
    Rm {
        #[arg(
            help = "Search term to match user emails for removal (regex by default, use -F for fixed string)"
        )]
        search_term: String,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Change a user's ID, carrying its admin record and role assignments along")]
    Renumber {
        #[arg(help = "Current user ID")]
        old_id: i32,
        #[arg(help = "New user ID")]
        new_id: i32,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Assign a role to a user")]
    AddRole {
        #[arg(help = "User ID or email")]
        user: String,
        #[arg(help = "Role ID or name")]
        role: String,
    },
    #[command(about = "Remove a role from a user")]
    RmRole {
        #[arg(help = "User ID or email")]
        user: String,
        #[arg(help = "Role ID or name")]
        role: String,
    },
}

struct UserCommands {
    users: UserDirectory,
    roles: RoleStore,
    assignments: RoleAssignments,
}

impl UserCommands {
    fn new(store: &Store) -> Self {
        UserCommands {
            users: UserDirectory::new(store.clone()),
            roles: RoleStore::new(store.clone()),
            assignments: RoleAssignments::new(store.clone()),
        }
    }
}

pub fn handle_user_command_with_store(
    store: &Store,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let cmds = UserCommands::new(store);
    match action {
        UserAction::Ls {
            search_term,
            fixed_string,
            role,
            json,
        } => {
            user_ls_impl(&cmds, search_term, fixed_string, role, json)?;
        }
        UserAction::Add { email, id } => {
            user_add_impl(&cmds, email, id)?;
        }
        UserAction::Rm {
            search_term,
            fixed_string,
            yes,
        } => {
            user_rm_impl(&cmds, search_term, fixed_string, yes)?;
        }
        UserAction::Renumber { old_id, new_id, yes } => {
            user_renumber_impl(&cmds, old_id, new_id, yes)?;
        }
        UserAction::AddRole { user, role } => {
            user_add_role_impl(&cmds, &user, &role)?;
        }
        UserAction::RmRole { user, role } => {
            user_rm_role_impl(&cmds, &user, &role)?;
        }
    }
    Ok(())
}

fn print_user(user: &UserWithRoles) {
    let roles: Vec<&str> = user.roles.iter().map(|r| r.role_name.as_str()).collect();
    let roles = if roles.is_empty() { "(none)".to_string() } else { roles.join(", ") };
    println!(
        "  ID: {}, Email: {}, Admin: {}, Roles: {}",
        user.id,
        user.email,
        if user.is_admin { "yes" } else { "no" },
        roles
    );
}

fn user_ls_impl(
    cmds: &UserCommands,
    search_term: Option<String>,
    fixed_string: bool,
    role: Option<String>,
    json: bool,
) -> Result<Vec<UserWithRoles>, Box<dyn std::error::Error>> {
    let candidates = match role {
        Some(role) => {
            let role_id = resolve_role_id(&cmds.roles, &role)?;
            cmds.assignments.users_with_role(role_id)?
        }
        None => cmds.users.list_users()?,
    };
    let filtered = filter_by(candidates, search_term.as_deref(), fixed_string, |user| {
        user.email.as_str()
    })?;

    let detailed = filtered
        .iter()
        .map(|user| cmds.users.get_user_with_roles(user.id))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        print_json(&detailed)?;
    } else if detailed.is_empty() {
        println!("No users found.");
    } else {
        println!("Users:");
        for user in &detailed {
            print_user(user);
        }
    }

    Ok(detailed)
}

fn user_add_impl(
    cmds: &UserCommands,
    email: String,
    id: Option<i32>,
) -> Result<i32, Box<dyn std::error::Error>> {
    let user = match id {
        Some(id) => cmds.users.create_user_with_id(id, &email)?,
        None => cmds.users.create_user(&email)?,
    };

    println!("Successfully added user:");
    println!("  ID: {}", user.id);
    println!("  Email: {}", user.email);

    Ok(user.id)
}

fn user_rm_impl(
    cmds: &UserCommands,
    search_term: String,
    fixed_string: bool,
    yes: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let matching = filter_by(
        cmds.users.list_users()?,
        Some(search_term.as_str()),
        fixed_string,
        |user| user.email.as_str(),
    )?;

    if matching.is_empty() {
        println!("No users found matching '{}'", search_term);
        return Ok(0);
    }

    println!("Users to be removed (admin records and role assignments go with them):");
    for user in &matching {
        println!("  ID: {}, Email: {}", user.id, user.email);
    }

    if !yes && !confirm(&format!("Are you sure you want to remove {} user(s)?", matching.len()))? {
        println!("Cancelled.");
        return Ok(0);
    }

    let mut removed_count = 0;
    for user in matching {
        match cmds.users.delete_user(user.id) {
            Ok(report) => {
                println!("Removed user: {}", user.email);
                print_cascades(&report);
                removed_count += 1;
            }
            Err(e) => {
                eprintln!("Error removing user {}: {}", user.email, describe_error(&e));
            }
        }
    }

    println!("Successfully removed {} user(s).", removed_count);
    Ok(removed_count)
}

fn user_renumber_impl(
    cmds: &UserCommands,
    old_id: i32,
    new_id: i32,
    yes: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let user = cmds.users.get_user(old_id)?;

    if !yes
        && !confirm(&format!(
            "Change the ID of {} from {} to {}?",
            user.email, old_id, new_id
        ))?
    {
        println!("Cancelled.");
        return Ok(false);
    }

    let report = cmds.users.change_user_id(old_id, new_id)?;
    println!("Moved user {} from ID {} to {}.", user.email, old_id, new_id);
    print_cascades(&report);

    Ok(true)
}

fn user_add_role_impl(
    cmds: &UserCommands,
    user: &str,
    role: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user_id = resolve_user_id(&cmds.users, user)?;
    let role_id = resolve_role_id(&cmds.roles, role)?;

    cmds.assignments.assign_role(user_id, role_id)?;
    println!("Assigned role {} to user {}.", role, user);

    Ok(())
}

fn user_rm_role_impl(
    cmds: &UserCommands,
    user: &str,
    role: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user_id = resolve_user_id(&cmds.users, user)?;
    let role_id = resolve_role_id(&cmds.roles, role)?;

    cmds.assignments.remove_role(user_id, role_id)?;
    println!("Removed role {} from user {}.", role, user);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_core::AdminIdentity;
    use access_core::models::RoleInput;
    use access_core::orm::testing::setup_test_store;

    fn setup() -> (Store, UserCommands) {
        let store = setup_test_store();
        let cmds = UserCommands::new(&store);
        (store, cmds)
    }

    #[test]
    fn test_user_add_and_role_assignment() {
        let (_store, cmds) = setup();
        cmds.roles.create_role(RoleInput::new("Viewer")).unwrap();
        let id = user_add_impl(&cmds, "viewer@example.com".to_string(), None).unwrap();

        user_add_role_impl(&cmds, "viewer@example.com", "Viewer").unwrap();

        let listed = user_ls_impl(&cmds, None, false, Some("Viewer".to_string()), true).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].roles[0].role_name, "Viewer");

        user_rm_role_impl(&cmds, &id.to_string(), "Viewer").unwrap();
        assert!(user_ls_impl(&cmds, None, false, Some("Viewer".to_string()), false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_user_rm_cascades() {
        let (store, cmds) = setup();
        let id = user_add_impl(&cmds, "gone@example.com".to_string(), Some(12)).unwrap();
        user_add_impl(&cmds, "kept@example.com".to_string(), None).unwrap();
        let admins = AdminIdentity::new(store);
        admins.grant_admin(id, "ADM-12").unwrap();

        let removed = user_rm_impl(&cmds, "gone@".to_string(), true, true).unwrap();

        assert_eq!(removed, 1);
        assert!(admins.list_admins().unwrap().is_empty());
        assert_eq!(user_ls_impl(&cmds, None, false, None, false).unwrap().len(), 1);
    }

    #[test]
    fn test_user_renumber() {
        let (store, cmds) = setup();
        user_add_impl(&cmds, "mover@example.com".to_string(), Some(3)).unwrap();
        AdminIdentity::new(store.clone()).grant_admin(3, "ADM-3").unwrap();

        assert!(user_renumber_impl(&cmds, 3, 30, true).unwrap());

        let moved = user_ls_impl(&cmds, Some("mover".to_string()), true, None, false).unwrap();
        assert_eq!(moved[0].id, 30);
        assert!(moved[0].is_admin);
        assert!(user_renumber_impl(&cmds, 3, 31, true).is_err());
    }
}
