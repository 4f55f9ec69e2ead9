use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

use crate::error::Error;

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// How `role_name` and `admin_code` values are compared for uniqueness and
/// lookup.
///
/// `Exact` mirrors the plain unique indexes (SQLite's BINARY collation).
/// `CaseInsensitive` folds ASCII case with SQLite's `lower()` on both sides,
/// so "Administrator" and "administrator" collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameMatching {
    #[default]
    Exact,
    CaseInsensitive,
}

impl FromStr for NameMatching {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "case-sensitive" => Ok(NameMatching::Exact),
            "case-insensitive" | "nocase" => Ok(NameMatching::CaseInsensitive),
            other => Err(Error::Config(format!(
                "unknown name matching policy '{}' (expected 'exact' or 'case-insensitive')",
                other
            ))),
        }
    }
}

/// Settings for opening a [`crate::Store`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub pool_size: u32,
    pub busy_timeout: Duration,
    pub name_matching: NameMatching,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        StoreConfig {
            database_url: database_url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            name_matching: NameMatching::default(),
        }
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_name_matching(mut self, name_matching: NameMatching) -> Self {
        self.name_matching = name_matching;
        self
    }

    /// Builds a configuration from the process environment, loading `.env`
    /// first if one exists.
    ///
    /// * `DATABASE_URL` (required)
    /// * `ACCESS_DB_POOL_SIZE` (default 8)
    /// * `ACCESS_DB_BUSY_TIMEOUT_MS` (default 5000)
    /// * `ACCESS_NAME_MATCHING` (`exact` or `case-insensitive`, default `exact`)
    pub fn from_env() -> Result<Self, Error> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL must be set".to_string()))?;
        let mut config = StoreConfig::new(database_url);

        if let Ok(raw) = env::var("ACCESS_DB_POOL_SIZE") {
            config.pool_size = parse_number("ACCESS_DB_POOL_SIZE", &raw)?;
        }
        if let Ok(raw) = env::var("ACCESS_DB_BUSY_TIMEOUT_MS") {
            config.busy_timeout = Duration::from_millis(parse_number("ACCESS_DB_BUSY_TIMEOUT_MS", &raw)?);
        }
        if let Ok(raw) = env::var("ACCESS_NAME_MATCHING") {
            config.name_matching = raw.parse()?;
        }

        Ok(config)
    }
}

fn parse_number<T: FromStr>(var: &str, raw: &str) -> Result<T, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a positive number, got '{}'", var, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matching_parse() {
        assert_eq!("exact".parse::<NameMatching>().unwrap(), NameMatching::Exact);
        assert_eq!(
            "Case-Insensitive".parse::<NameMatching>().unwrap(),
            NameMatching::CaseInsensitive
        );
        assert!(matches!("fuzzy".parse::<NameMatching>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let config = StoreConfig::new("access.db");
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.busy_timeout, Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS));
        assert_eq!(config.name_matching, NameMatching::Exact);

        let config = config.with_pool_size(2).with_name_matching(NameMatching::CaseInsensitive);
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.name_matching, NameMatching::CaseInsensitive);
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number::<u32>("X", " 12 ").unwrap(), 12);
        assert!(parse_number::<u32>("X", "twelve").is_err());
    }
}
