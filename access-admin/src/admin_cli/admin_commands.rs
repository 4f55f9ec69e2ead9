use access_core::models::{Admin, AdminUpdate};
use access_core::{AdminIdentity, Store, UserDirectory};
use clap::Subcommand;

use super::utils::{confirm, filter_by, print_json, resolve_user_id};

#[derive(Subcommand)]
pub enum AdminAction {
    #[command(about = "List admins, optionally filtered by admin code")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
        #[arg(long, help = "Print admins as JSON")]
        json: bool,
    },
    #[command(about = "Grant admin rights to a user")]
    Grant {
        #[arg(short, long, help = "User ID or email")]
        user: String,
        #[arg(short, long, help = "Admin code")]
        code: String,
    },
    #[command(about = "Revoke admin rights, keeping the user")]
    Revoke {
        #[arg(help = "User ID or email")]
        user: String,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Change an admin's code")]
    Edit {
        #[arg(help = "User ID or email")]
        user: String,
        #[arg(short, long, help = "New admin code")]
        code: String,
    },
}

pub fn handle_admin_command_with_store(
    store: &Store,
    action: AdminAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let admins = AdminIdentity::new(store.clone());
    let users = UserDirectory::new(store.clone());
    match action {
        AdminAction::Ls {
            search_term,
            fixed_string,
            json,
        } => {
            admin_ls_impl(&admins, &users, search_term, fixed_string, json)?;
        }
        AdminAction::Grant { user, code } => {
            admin_grant_impl(&admins, &users, &user, code)?;
        }
        AdminAction::Revoke { user, yes } => {
            admin_revoke_impl(&admins, &users, &user, yes)?;
        }
        AdminAction::Edit { user, code } => {
            admin_edit_impl(&admins, &users, &user, code)?;
        }
    }
    Ok(())
}

fn print_admin(users: &UserDirectory, admin: &Admin) {
    let email = users
        .get_user(admin.user_id)
        .map(|u| u.email)
        .unwrap_or_else(|_| "(unknown user)".to_string());
    println!(
        "  User ID: {}, Email: {}, Admin code: {}",
        admin.user_id, email, admin.admin_code
    );
}

pub fn admin_ls_impl(
    admins: &AdminIdentity,
    users: &UserDirectory,
    search_term: Option<String>,
    fixed_string: bool,
    json: bool,
) -> Result<Vec<Admin>, Box<dyn std::error::Error>> {
    let filtered = filter_by(
        admins.list_admins()?,
        search_term.as_deref(),
        fixed_string,
        |admin| admin.admin_code.as_str(),
    )?;

    if json {
        print_json(&filtered)?;
    } else if filtered.is_empty() {
        println!("No admins found.");
    } else {
        println!("Admins:");
        for admin in &filtered {
            print_admin(users, admin);
        }
    }

    Ok(filtered)
}

pub fn admin_grant_impl(
    admins: &AdminIdentity,
    users: &UserDirectory,
    user: &str,
    code: String,
) -> Result<Admin, Box<dyn std::error::Error>> {
    let user_id = resolve_user_id(users, user)?;
    let admin = admins.grant_admin(user_id, &code)?;

    println!("Successfully granted admin rights:");
    print_admin(users, &admin);

    Ok(admin)
}

pub fn admin_revoke_impl(
    admins: &AdminIdentity,
    users: &UserDirectory,
    user: &str,
    yes: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let user_id = resolve_user_id(users, user)?;
    let admin = admins.get_admin(user_id)?;

    println!("Admin record to be revoked:");
    print_admin(users, &admin);

    if !yes && !confirm("Are you sure you want to revoke admin rights?")? {
        println!("Cancelled.");
        return Ok(false);
    }

    admins.revoke_admin(user_id)?;
    println!("Revoked admin rights for user {}.", user_id);

    Ok(true)
}

pub fn admin_edit_impl(
    admins: &AdminIdentity,
    users: &UserDirectory,
    user: &str,
    code: String,
) -> Result<Admin, Box<dyn std::error::Error>> {
    let user_id = resolve_user_id(users, user)?;
    let updated = admins.update_admin(user_id, AdminUpdate { admin_code: code })?;

    println!("Successfully updated admin:");
    print_admin(users, &updated);

    Ok(updated)
}
