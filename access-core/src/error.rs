//! Error taxonomy for the access-control data layer.
//!
//! Every store operation returns [`Error`]. The first four variants are
//! business-rule failures that callers are expected to surface (and map to
//! 4xx-class responses if they speak HTTP); the remaining ones are
//! infrastructure failures. Nothing in this crate retries.

use diesel::result::{DatabaseErrorKind, Error as DieselError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unique constraint {constraint} violated by '{value}'")]
    UniqueConstraintViolation { constraint: String, value: String },

    #[error("Cannot remove {entity} {key}: referenced by {count} {dependent} row(s)")]
    ReferentialIntegrity {
        entity: &'static str,
        key: String,
        dependent: &'static str,
        count: i64,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Database error: {0}")]
    Database(DieselError),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Error::NotFound { entity, key: key.to_string() }
    }

    pub fn unique(constraint: &str, value: impl ToString) -> Self {
        Error::UniqueConstraintViolation {
            constraint: constraint.to_string(),
            value: value.to_string(),
        }
    }

    /// True for the four caller-facing failures; false for infrastructure
    /// faults.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::UniqueConstraintViolation { .. }
                | Error::ReferentialIntegrity { .. }
                | Error::NotFound { .. }
        )
    }
}

/// Constraint failures raised by SQLite itself are folded into the same
/// taxonomy the pre-checks use, so a caller sees one error shape whichever
/// layer caught the problem.
impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Error::NotFound { entity: "row", key: String::new() },
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => Error::UniqueConstraintViolation {
                        constraint: message
                            .trim_start_matches("UNIQUE constraint failed: ")
                            .to_string(),
                        value: String::new(),
                    },
                    DatabaseErrorKind::ForeignKeyViolation => Error::ReferentialIntegrity {
                        entity: "row",
                        key: message,
                        dependent: "foreign key",
                        count: 0,
                    },
                    DatabaseErrorKind::CheckViolation | DatabaseErrorKind::NotNullViolation => {
                        Error::Validation(message)
                    }
                    other => Error::Database(DieselError::DatabaseError(other, info)),
                }
            }
            other => Error::Database(other),
        }
    }
}
