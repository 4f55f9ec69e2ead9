use diesel::QueryableByName;
use diesel::define_sql_function;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};

pub mod admin;
pub mod role;
pub mod testing;
pub mod user;
pub mod user_role;

define_sql_function!(fn lower(x: Text) -> Text);

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Rowid of the most recent successful insert on this connection.
///
/// Fails rather than truncating when the rowid does not fit an `i32` key.
fn last_insert_rowid(conn: &mut SqliteConnection) -> Result<i32, diesel::result::Error> {
    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;
    i32::try_from(last_id).map_err(|e| diesel::result::Error::DeserializationError(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::setup_test_db;

    #[test]
    fn test_last_insert_rowid() {
        let mut conn = setup_test_db();
        diesel::sql_query("INSERT INTO roles (role_id, role_name) VALUES (41, 'Small')")
            .execute(&mut conn)
            .unwrap();

        assert_eq!(last_insert_rowid(&mut conn).unwrap(), 41);
    }

    #[test]
    fn test_last_insert_rowid_out_of_range() {
        let mut conn = setup_test_db();
        diesel::sql_query("INSERT INTO roles (role_id, role_name) VALUES (3000000000, 'Huge')")
            .execute(&mut conn)
            .unwrap();

        assert!(matches!(
            last_insert_rowid(&mut conn),
            Err(diesel::result::Error::DeserializationError(_))
        ));
    }
}
