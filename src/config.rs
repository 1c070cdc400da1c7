use std::env;
use std::str::FromStr;

use anyhow::{Context, bail};
use strum_macros::{Display, EnumString};

use crate::workflow::DEFAULT_MAX_LEAVE_DAYS;

const DEFAULT_LEAVE_TYPES: &str = "Vacation,Sick,Personal,Maternity,Bereavement";

/// Where leave requests are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveStore {
    Memory,
    Mysql,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub leave_store: LeaveStore,
    /// Required when `leave_store` is `mysql`.
    pub database_url: Option<String>,
    pub leave_types: Vec<String>,
    /// Longest leave accepted on submission, in calendar days.
    pub max_leave_days: u32,

    // Rate limiting
    pub rate_api_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let leave_store = LeaveStore::from_str(&var("LEAVE_STORE", "memory"))
            .context("LEAVE_STORE must be `memory` or `mysql`")?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if leave_store == LeaveStore::Mysql && database_url.is_none() {
            bail!("DATABASE_URL must be set when LEAVE_STORE=mysql");
        }

        let leave_types: Vec<String> = var("LEAVE_TYPES", DEFAULT_LEAVE_TYPES)
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        if leave_types.is_empty() {
            bail!("LEAVE_TYPES must name at least one leave type");
        }

        let max_leave_days: u32 = match lookup("MAX_LEAVE_DAYS") {
            Some(value) => value
                .trim()
                .parse()
                .context("MAX_LEAVE_DAYS must be a positive integer")?,
            None => DEFAULT_MAX_LEAVE_DAYS,
        };
        if max_leave_days == 0 {
            bail!("MAX_LEAVE_DAYS must be at least 1");
        }

        Ok(Self {
            server_addr: var("SERVER_ADDR", "127.0.0.1:8080"),
            leave_store,
            database_url,
            leave_types,
            max_leave_days,
            rate_api_per_min: var("RATE_API_PER_MIN", "1000")
                .parse()
                .context("RATE_API_PER_MIN must be a non-negative integer")?,
            api_prefix: var("API_PREFIX", "/api"),
            log_dir: var("LOG_DIR", "logs"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.leave_store, LeaveStore::Memory);
        assert_eq!(cfg.server_addr, "127.0.0.1:8080");
        assert_eq!(cfg.api_prefix, "/api");
        assert_eq!(cfg.rate_api_per_min, 1000);
        assert_eq!(cfg.leave_types.len(), 5);
        assert_eq!(cfg.leave_types[0], "Vacation");
        assert_eq!(cfg.max_leave_days, 365);
    }

    #[test]
    fn mysql_needs_database_url() {
        assert!(config(&[("LEAVE_STORE", "mysql")]).is_err());
        let cfg = config(&[("LEAVE_STORE", "MySQL"), ("DATABASE_URL", "mysql://localhost/hr")]).unwrap();
        assert_eq!(cfg.leave_store, LeaveStore::Mysql);
    }

    #[test]
    fn leave_types_are_trimmed() {
        let cfg = config(&[("LEAVE_TYPES", " Annual , Sick,, ")]).unwrap();
        assert_eq!(cfg.leave_types, ["Annual", "Sick"]);
        assert!(config(&[("LEAVE_TYPES", " , ")]).is_err());
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(config(&[("LEAVE_STORE", "redis")]).is_err());
        assert!(config(&[("RATE_API_PER_MIN", "lots")]).is_err());
        assert!(config(&[("MAX_LEAVE_DAYS", "0")]).is_err());
        assert!(config(&[("MAX_LEAVE_DAYS", "-5")]).is_err());
        assert_eq!(config(&[("MAX_LEAVE_DAYS", " 90 ")]).unwrap().max_leave_days, 90);
    }
}
