use access_core::models::{Role, RoleInput, RoleUpdate};
use access_core::{RoleStore, Store};
use clap::Subcommand;

use super::utils::{confirm, describe_error, filter_by, print_json};

#[derive(Subcommand)]
pub enum RoleAction {
    #[command(about = "List roles, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
        #[arg(long, help = "Print roles as JSON")]
        json: bool,
    },
    #[command(about = "Add a new role")]
    Add {
        #[arg(short, long, help = "Role name")]
        name: String,
        #[arg(short, long, help = "Role description")]
        description: Option<String>,
        #[arg(long, help = "Create the role deactivated")]
        inactive: bool,
    },
    #[command(about = "Edit role fields")]
    Edit {
        #[arg(help = "Role ID to edit")]
        role_id: i32,
        #[arg(short, long, help = "New role name")]
        name: Option<String>,
        #[arg(short, long, help = "New role description")]
        description: Option<String>,
        #[arg(long, conflicts_with = "description", help = "Remove the description")]
        clear_description: bool,
    },
    #[command(about = "Allow new assignments of a role")]
    Activate {
        #[arg(help = "Role ID")]
        role_id: i32,
    },
    #[command(about = "Block new assignments of a role, keeping existing ones")]
    Deactivate {
        #[arg(help = "Role ID")]
        role_id: i32,
    },
    #[command(about = "Remove roles matching search term")]
    Rm {
        #[arg(
            help = "Search term to match roles for removal (regex by default, use -F for fixed string)"
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
}

pub fn handle_role_command_with_store(
    store: &Store,
    action: RoleAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let roles = RoleStore::new(store.clone());
    match action {
        RoleAction::Ls {
            search_term,
            fixed_string,
            json,
        } => {
            role_ls_impl(&roles, search_term, fixed_string, json)?;
        }
        RoleAction::Add {
            name,
            description,
            inactive,
        } => {
            role_add_impl(&roles, name, description, inactive)?;
        }
        RoleAction::Edit {
            role_id,
            name,
            description,
            clear_description,
        } => {
            role_edit_impl(&roles, role_id, name, description, clear_description)?;
        }
        RoleAction::Activate { role_id } => {
            role_set_active_impl(&roles, role_id, true)?;
        }
        RoleAction::Deactivate { role_id } => {
            role_set_active_impl(&roles, role_id, false)?;
        }
        RoleAction::Rm {
            search_term,
            fixed_string,
            yes,
        } => {
            role_rm_impl(&roles, search_term, fixed_string, yes)?;
        }
    }
    Ok(())
}

fn print_role(role: &Role) {
    let desc = role.role_description.as_deref().unwrap_or("(no description)");
    let state = if role.is_active { "active" } else { "inactive" };
    println!(
        "  ID: {}, Name: {}, Description: {}, Status: {}",
        role.role_id, role.role_name, desc, state
    );
}

pub fn role_ls_impl(
    roles: &RoleStore,
    search_term: Option<String>,
    fixed_string: bool,
    json: bool,
) -> Result<Vec<Role>, Box<dyn std::error::Error>> {
    let filtered = filter_by(
        roles.list_roles()?,
        search_term.as_deref(),
        fixed_string,
        |role| role.role_name.as_str(),
    )?;

    if json {
        print_json(&filtered)?;
    } else if filtered.is_empty() {
        println!("No roles found.");
    } else {
        println!("Roles:");
        for role in &filtered {
            print_role(role);
        }
    }

    Ok(filtered)
}

pub fn role_add_impl(
    roles: &RoleStore,
    name: String,
    description: Option<String>,
    inactive: bool,
) -> Result<Role, Box<dyn std::error::Error>> {
    let mut input = RoleInput::new(name);
    input.role_description = description;
    if inactive {
        input = input.inactive();
    }
    let created = roles.create_role(input)?;

    println!("Successfully added role:");
    print_role(&created);

    Ok(created)
}

pub fn role_edit_impl(
    roles: &RoleStore,
    role_id: i32,
    new_name: Option<String>,
    new_description: Option<String>,
    clear_description: bool,
) -> Result<Option<Role>, Box<dyn std::error::Error>> {
    let role = roles.get_role(role_id)?;

    if new_name.is_none() && new_description.is_none() && !clear_description {
        println!(
            "No changes specified. Use --name, --description or --clear-description to specify changes."
        );
        return Ok(None);
    }

    let mut update = RoleUpdate::from(&role);
    if let Some(name) = new_name {
        update.role_name = name;
    }
    if new_description.is_some() || clear_description {
        update.role_description = new_description;
    }

    let updated = roles.update_role(role_id, update)?;

    println!("Successfully updated role:");
    print_role(&updated);

    Ok(Some(updated))
}

pub fn role_set_active_impl(
    roles: &RoleStore,
    role_id: i32,
    active: bool,
) -> Result<Role, Box<dyn std::error::Error>> {
    let role = if active {
        roles.activate_role(role_id)?
    } else {
        roles.deactivate_role(role_id)?
    };

    if active {
        println!("Activated role: {}", role.role_name);
    } else {
        let kept = roles.count_assignments(role_id)?;
        println!(
            "Deactivated role: {} ({} existing assignment(s) kept)",
            role.role_name, kept
        );
    }

    Ok(role)
}

pub fn role_rm_impl(
    roles: &RoleStore,
    search_term: String,
    fixed_string: bool,
    yes: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let matching = filter_by(
        roles.list_roles()?,
        Some(search_term.as_str()),
        fixed_string,
        |role| role.role_name.as_str(),
    )?;

    if matching.is_empty() {
        println!("No roles found matching '{}'", search_term);
        return Ok(0);
    }

    println!("Roles to be removed:");
    for role in &matching {
        print_role(role);
    }

    if !yes && !confirm(&format!("Are you sure you want to remove {} role(s)?", matching.len()))? {
        println!("Cancelled.");
        return Ok(0);
    }

    let mut removed_count = 0;
    for role in matching {
        match roles.delete_role(role.role_id) {
            Ok(()) => {
                println!("Removed role: {}", role.role_name);
                removed_count += 1;
            }
            Err(e) => {
                eprintln!("Error removing role {}: {}", role.role_name, describe_error(&e));
            }
        }
    }

    println!("Successfully removed {} role(s).", removed_count);
    Ok(removed_count)
}
