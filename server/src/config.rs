// foodgram_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use foodgram::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_IDENTITY_HEADER: &str = "X-User-ID";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  /// Absolute prefix used for pagination links.
  pub app_base_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,

  // Optional: for seeding DB on startup
  pub seed_db: bool,
  pub seed_ingredients_path: Option<PathBuf>,

  /// Header carrying the user id resolved by the auth gateway.
  pub identity_header: String,
  /// TTF font for the shopping-list document; built-in Helvetica when unset.
  pub pdf_font_path: Option<PathBuf>,
  pub default_page_size: u32,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    let config = Self::from_lookup(|name| env::var(name).ok())?;
    tracing::info!("Application configuration loaded successfully.");
    Ok(config)
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port: u16 = parse_or(&lookup, "SERVER_PORT", 8080)?;
    let database_url = get_env("DATABASE_URL")?;
    let app_base_url = get_env("APP_BASE_URL")
      .unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port))
      .trim_end_matches('/')
      .to_string();

    let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
    let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", true)?;
    let seed_db = parse_or(&lookup, "SEED_DB", false)?;
    let seed_ingredients_path = lookup("SEED_INGREDIENTS_PATH").filter(|s| !s.is_empty()).map(PathBuf::from);

    let identity_header = lookup("IDENTITY_HEADER")
      .filter(|s| !s.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_IDENTITY_HEADER.to_string());
    let pdf_font_path = lookup("PDF_FONT_PATH").filter(|s| !s.is_empty()).map(PathBuf::from);

    let default_page_size: u32 = parse_or(&lookup, "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
    if default_page_size == 0 || default_page_size > MAX_PAGE_SIZE {
      return Err(AppError::Config(format!(
        "Invalid DEFAULT_PAGE_SIZE: must be between 1 and {}",
        MAX_PAGE_SIZE
      )));
    }

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      database_max_connections,
      run_migrations,
      seed_db,
      seed_ingredients_path,
      identity_header,
      pdf_font_path,
      default_page_size,
    })
  }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(var_name) {
    None => Ok(default),
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value: {}", var_name, e))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_only_database_url_is_set() {
    let cfg = config_from(&[("DATABASE_URL", "postgres://localhost/foodgram")]).unwrap();
    assert_eq!(cfg.server_host, "127.0.0.1");
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.app_base_url, "http://127.0.0.1:8080");
    assert_eq!(cfg.database_max_connections, 10);
    assert!(cfg.run_migrations);
    assert!(!cfg.seed_db);
    assert_eq!(cfg.identity_header, "X-User-ID");
    assert!(cfg.pdf_font_path.is_none());
    assert_eq!(cfg.default_page_size, 6);
  }

  #[test]
  fn missing_database_url_is_a_config_error() {
    assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
  }

  #[test]
  fn invalid_numbers_are_rejected() {
    let err = config_from(&[("DATABASE_URL", "postgres://x"), ("SERVER_PORT", "eighty")]).unwrap_err();
    assert!(err.to_string().contains("SERVER_PORT"));

    let err = config_from(&[("DATABASE_URL", "postgres://x"), ("DEFAULT_PAGE_SIZE", "0")]).unwrap_err();
    assert!(err.to_string().contains("DEFAULT_PAGE_SIZE"));
  }

  #[test]
  fn overrides_are_honored() {
    let cfg = config_from(&[
      ("DATABASE_URL", "postgres://x"),
      ("APP_BASE_URL", "https://foodgram.example/"),
      ("IDENTITY_HEADER", "X-Auth-User"),
      ("RUN_MIGRATIONS", "false"),
      ("PDF_FONT_PATH", "/fonts/DejaVuSans.ttf"),
    ])
    .unwrap();
    assert_eq!(cfg.app_base_url, "https://foodgram.example");
    assert_eq!(cfg.identity_header, "X-Auth-User");
    assert!(!cfg.run_migrations);
    assert_eq!(cfg.pdf_font_path, Some(PathBuf::from("/fonts/DejaVuSans.ttf")));
  }
}
