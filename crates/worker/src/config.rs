use anyhow::Context;
use maintai_core::security::DEFAULT_STATUS_WINDOW;

/// Worker configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development, where the
/// ephemeral store is seeded with demo data.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// SQLite URL or file path. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Seed demo data into a store that has no admin account (default: `true`).
    pub seed_demo_data: bool,
    /// How many recent security events feed the security summary (default:
    /// `10`). `0` reads every event.
    pub security_event_limit: usize,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `DATABASE_URL`         | unset   |
    /// | `SEED_DEMO_DATA`       | `true`  |
    /// | `SECURITY_EVENT_LIMIT` | `10`    |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let seed_demo_data = match lookup("SEED_DEMO_DATA") {
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("SEED_DEMO_DATA must be true or false, got '{raw}'"))?,
            None => true,
        };

        let security_event_limit: usize = match lookup("SECURITY_EVENT_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("SECURITY_EVENT_LIMIT must be a valid usize, got '{raw}'"))?,
            None => DEFAULT_STATUS_WINDOW,
        };

        Ok(Self {
            database_url,
            seed_demo_data,
            security_event_limit,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<WorkerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(
            config,
            WorkerConfig {
                database_url: None,
                seed_demo_data: true,
                security_event_limit: 10,
            }
        );
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("DATABASE_URL", "sqlite:data/fleet.db"),
            ("SEED_DEMO_DATA", "off"),
            ("SECURITY_EVENT_LIMIT", "25"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("sqlite:data/fleet.db"));
        assert!(!config.seed_demo_data);
        assert_eq!(config.security_event_limit, 25);
    }

    #[test]
    fn blank_database_url_means_memory() {
        let config = load(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(load(&[("SEED_DEMO_DATA", "maybe")]).is_err());
        assert!(load(&[("SECURITY_EVENT_LIMIT", "-3")]).is_err());
    }
}
