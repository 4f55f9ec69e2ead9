use crate::models::User;
use crate::schema::admins;
use chrono::NaiveDateTime;
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Marks a user as holding administrative rights.
///
/// `user_id` is both the primary key and the foreign key to `users.id`, so a
/// user has at most one admin record.
#[derive(Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = admins)]
#[diesel(primary_key(user_id))]
#[ts(export)]
pub struct Admin {
    pub user_id: i32,
    pub admin_code: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize, Serialize, Debug, Clone, TS)]
#[ts(export)]
pub struct AdminInput {
    pub user_id: i32,
    pub admin_code: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, TS)]
#[ts(export)]
pub struct AdminUpdate {
    pub admin_code: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = admins)]
pub struct NewAdmin {
    pub user_id: i32,
    pub admin_code: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
