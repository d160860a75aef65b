use anyhow::Context;

use crate::credential::Secret;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "osc_db";
pub const DEFAULT_USER: &str = "zwc";
pub const DEFAULT_ROLES: &str = "dbOwner";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: Secret, // may embed admin credentials
    pub database: String,
    pub user: String,
    pub password: Option<Secret>,
    pub roles: String,
    pub collections: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let password = match (lookup("OSC_DB_PASSWORD"), lookup("OSC_DB_PASSWORD_FILE")) {
            (Some(p), _) if !p.is_empty() => Some(Secret::new(p)),
            (_, Some(path)) if !path.trim().is_empty() => {
                let raw = std::fs::read_to_string(path.trim())
                    .with_context(|| format!("read password file {}", path.trim()))?;
                Some(Secret::new(raw.trim_end_matches(|c: char| c == '\n' || c == '\r')))
            }
            _ => None,
        };

        let collections = lookup("OSC_COLLECTIONS")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        Ok(Self {
            mongodb_uri: Secret::new(var("MONGODB_URI", DEFAULT_MONGODB_URI)),
            database: var("OSC_DB_NAME", DEFAULT_DATABASE),
            user: var("OSC_DB_USER", DEFAULT_USER),
            password,
            roles: var("OSC_DB_ROLES", DEFAULT_ROLES),
            collections,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_osc_setup() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.mongodb_uri.expose(), DEFAULT_MONGODB_URI);
        assert_eq!(cfg.database, "osc_db");
        assert_eq!(cfg.user, "zwc");
        assert_eq!(cfg.roles, "dbOwner");
        assert!(cfg.password.is_none());
        assert!(cfg.collections.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config_from(&[
            ("MONGODB_URI", "mongodb://root:pw@db:27017"),
            ("OSC_DB_NAME", "osc_test"),
            ("OSC_DB_USER", "svc"),
            ("OSC_DB_PASSWORD", "hunter2"),
            ("OSC_COLLECTIONS", "events, ,orders"),
        ])
        .unwrap();
        assert_eq!(cfg.database, "osc_test");
        assert_eq!(cfg.user, "svc");
        assert_eq!(cfg.password.unwrap().expose(), "hunter2");
        assert_eq!(cfg.collections, vec!["events", "orders"]);
        assert!(!format!("{:?}", cfg.mongodb_uri).contains("root:pw"));
    }

    #[test]
    fn trims_padded_values() {
        let cfg = config_from(&[
            ("OSC_DB_USER", " zwc "),
            ("OSC_DB_NAME", "\tosc_db\n"),
            ("OSC_DB_ROLES", "  "),
        ])
        .unwrap();
        assert_eq!(cfg.user, "zwc");
        assert_eq!(cfg.database, "osc_db");
        assert_eq!(cfg.roles, DEFAULT_ROLES);
    }

    #[test]
    fn reads_password_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let cfg = config_from(&[("OSC_DB_PASSWORD_FILE", path.as_str())]).unwrap();
        assert_eq!(cfg.password.unwrap().expose(), "from-file");
    }

    #[test]
    fn inline_password_wins_over_file() {
        let cfg = config_from(&[
            ("OSC_DB_PASSWORD", "inline"),
            ("OSC_DB_PASSWORD_FILE", "/does/not/exist"),
        ])
        .unwrap();
        assert_eq!(cfg.password.unwrap().expose(), "inline");
    }

    #[test]
    fn missing_password_file_is_an_error() {
        let err = config_from(&[("OSC_DB_PASSWORD_FILE", "/does/not/exist")]).unwrap_err();
        assert!(err.to_string().contains("read password file"));
    }
}
