use crate::schema::roles;
use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = roles)]
#[diesel(primary_key(role_id))]
#[ts(export)]
pub struct Role {
    pub role_id: i32,
    pub role_name: String,
    pub role_description: Option<String>,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

/// Caller-supplied fields for a new role.
#[derive(Deserialize, Serialize, Debug, Clone, TS)]
#[ts(export)]
pub struct RoleInput {
    pub role_name: String,
    pub role_description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl RoleInput {
    pub fn new(role_name: impl Into<String>) -> Self {
        RoleInput { role_name: role_name.into(), role_description: None, is_active: true }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.role_description = Some(description.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

fn default_active() -> bool {
    true
}

/// Full-record replacement of a role's mutable fields.
#[derive(Deserialize, Serialize, Debug, Clone, TS)]
#[ts(export)]
pub struct RoleUpdate {
    pub role_name: String,
    pub role_description: Option<String>,
    pub is_active: bool,
}

impl From<&Role> for RoleUpdate {
    fn from(role: &Role) -> Self {
        RoleUpdate {
            role_name: role.role_name.clone(),
            role_description: role.role_description.clone(),
            is_active: role.is_active,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = roles)]
pub struct NewRole {
    pub role_name: String,
    pub role_description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// A cleared description must be written as NULL, not skipped.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = roles)]
#[diesel(treat_none_as_null = true)]
pub struct RoleChangeset {
    pub role_name: String,
    pub role_description: Option<String>,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}
