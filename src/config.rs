use anyhow::{Context, Result};
use std::env;

/// Runtime settings, read once at startup. `.env` is loaded by the caller
/// before this runs.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:fittrack.db".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a valid port number")?,
            Err(_) => 8080,
        };

        Ok(Self { database_url, port })
    }
}
