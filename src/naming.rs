use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ProvisionError;

/// Database names must stay below this many bytes.
const MAX_DATABASE_NAME_BYTES: usize = 64;

pub fn validate_database_name(name: &str) -> Result<(), ProvisionError> {
    lazy_static! {
        static ref FORBIDDEN_RE: Regex = Regex::new(r#"[/\\. "$*<>:|?\x00]"#).unwrap();
    }
    let reject = |reason| ProvisionError::InvalidDatabaseName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(reject("must not be empty"));
    }
    if name.len() >= MAX_DATABASE_NAME_BYTES {
        return Err(reject("must be shorter than 64 bytes"));
    }
    if FORBIDDEN_RE.is_match(name) {
        return Err(reject("contains a forbidden character"));
    }
    Ok(())
}

pub fn validate_collection_name(name: &str) -> Result<(), ProvisionError> {
    let reject = |reason| ProvisionError::InvalidCollectionName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(reject("must not be empty"));
    }
    if name.contains('$') || name.contains('\0') {
        return Err(reject("contains a forbidden character"));
    }
    if name.starts_with("system.") {
        return Err(reject("the system. prefix is reserved"));
    }
    Ok(())
}
