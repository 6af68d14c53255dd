use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Upper bound for `per_page` on task reads.
    pub max_items_per_page: i64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Task board API with Kanban buckets")]
pub struct Args {
    /// Host to bind to (overrides TASKBOARD_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides TASKBOARD_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides TASKBOARD_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum page size for task reads (overrides TASKBOARD_MAX_ITEMS_PER_PAGE)
    #[arg(long)]
    pub max_items_per_page: Option<i64>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::merge(args, |key| env::var(key).ok())?;
        Ok((cfg, migrate))
    }

    /// CLI values win over `env`; `env` wins over the defaults.
    pub fn merge(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_host = env("TASKBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = parse_var(&env, "TASKBOARD_PORT", 3000)?;
        let env_db = env("TASKBOARD_DATABASE_URL")
            .unwrap_or_else(|| "sqlite://./data/taskboard.db".into());
        let env_max = parse_var(&env, "TASKBOARD_MAX_ITEMS_PER_PAGE", 50)?;

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_items_per_page: args.max_items_per_page.unwrap_or(env_max),
        };
        if cfg.max_items_per_page < 1 {
            anyhow::bail!(
                "max items per page must be at least 1, got {}",
                cfg.max_items_per_page
            );
        }
        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(env: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env(key) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env_or_args() {
        let cfg = AppConfig::merge(Args::default(), env_of(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.database_url, "sqlite://./data/taskboard.db");
        assert_eq!(cfg.max_items_per_page, 50);
    }

    #[test]
    fn args_override_env() {
        let args = Args {
            port: Some(9000),
            ..Default::default()
        };
        let env = env_of(&[
            ("TASKBOARD_PORT", "8080"),
            ("TASKBOARD_HOST", "127.0.0.1"),
            ("TASKBOARD_MAX_ITEMS_PER_PAGE", "20"),
        ]);
        let cfg = AppConfig::merge(args, env).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:9000");
        assert_eq!(cfg.max_items_per_page, 20);
    }

    #[test]
    fn bad_values_are_reported() {
        let err = AppConfig::merge(Args::default(), env_of(&[("TASKBOARD_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("TASKBOARD_PORT"));

        let args = Args {
            max_items_per_page: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::merge(args, env_of(&[])).is_err());
    }
}
