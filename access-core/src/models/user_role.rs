use crate::models::Role;
use crate::models::User;
use crate::schema::user_roles;
use diesel::{Associations, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Queryable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(belongs_to(Role, foreign_key = role_id))]
#[diesel(table_name = crate::schema::user_roles)]
#[diesel(primary_key(user_id, role_id))]
#[ts(export)]
pub struct UserRole {
    pub user_id: i32,
    pub role_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = user_roles)]
pub struct NewUserRole {
    pub user_id: i32,
    pub role_id: i32,
}
