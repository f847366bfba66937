use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Unset keeps history in process memory only.
    pub db_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("PARLOR_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("PARLOR_PORT")
            .or_else(|| lookup("PORT"))
            .unwrap_or_else(|| "5000".into());
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid port: {}", port))?;
        let db_path = lookup("PARLOR_DB_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self { host, port, db_path })
    }
}
