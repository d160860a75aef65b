use std::fmt;

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use serde::{Serialize, Serializer};

use crate::error::ProvisionError;

pub const GENERATED_LEN: usize = 24;

/// A password that never shows up in `Debug` output or serialized plans.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate(len: usize) -> Self {
        let value: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        Self(value)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Configured,
    Generated,
}

/// Pick the configured secret, or mint one when the caller allows it.
pub fn resolve(
    configured: Option<&Secret>,
    generate: bool,
) -> Result<(Secret, SecretSource), ProvisionError> {
    match configured {
        Some(secret) if !secret.is_empty() => Ok((secret.clone(), SecretSource::Configured)),
        _ if generate => Ok((Secret::generate(GENERATED_LEN), SecretSource::Generated)),
        _ => Err(ProvisionError::MissingSecret),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_serialize_are_redacted() {
        let secret = Secret::new("123456");
        assert_eq!(format!("{:?}", secret), "Secret(***)");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"***\"");
        assert_eq!(secret.expose(), "123456");
    }

    #[test]
    fn generated_secret_is_alphanumeric() {
        let secret = Secret::generate(GENERATED_LEN);
        assert_eq!(secret.expose().len(), GENERATED_LEN);
        assert!(secret.expose().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, Secret::generate(GENERATED_LEN));
    }

    #[test]
    fn resolve_prefers_configured_secret() {
        let configured = Secret::new("from-env");
        let (secret, source) = resolve(Some(&configured), true).unwrap();
        assert_eq!(secret.expose(), "from-env");
        assert_eq!(source, SecretSource::Configured);
    }

    #[test]
    fn resolve_without_secret() {
        assert!(matches!(resolve(None, false), Err(ProvisionError::MissingSecret)));
        let empty = Secret::new("");
        assert!(matches!(
            resolve(Some(&empty), false),
            Err(ProvisionError::MissingSecret)
        ));
        let (_, source) = resolve(None, true).unwrap();
        assert_eq!(source, SecretSource::Generated);
    }
}
