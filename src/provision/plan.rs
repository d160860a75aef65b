use serde::Serialize;

use crate::config::AppConfig;
use crate::credential::{parse_roles, Principal, RoleAssignment};
use crate::error::ProvisionError;
use crate::naming::{validate_collection_name, validate_database_name};

/// Collection kept in every plan as a disabled step unless explicitly requested.
pub const PLACEHOLDER_COLLECTION: &str = "newCollection";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    SelectDatabase {
        db: String,
    },
    CreateUser {
        db: String,
        user: String,
        roles: Vec<RoleAssignment>,
    },
    CreateCollection {
        db: String,
        name: String,
        enabled: bool,
    },
}

/// Ordered provisioning steps for one target database.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub database: String,
    pub principal: Principal,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn build(config: &AppConfig, extra_collections: &[String]) -> Result<Self, ProvisionError> {
        validate_database_name(&config.database)?;
        let roles = parse_roles(&config.roles, &config.database)?;
        let principal = Principal::new(config.user.clone(), roles)?;

        let mut wanted: Vec<String> = Vec::new();
        for name in config.collections.iter().chain(extra_collections) {
            validate_collection_name(name)?;
            if !wanted.contains(name) {
                wanted.push(name.clone());
            }
        }

        let db = config.database.clone();
        let mut steps = vec![
            Step::SelectDatabase { db: db.clone() },
            Step::CreateUser {
                db: db.clone(),
                user: principal.user.clone(),
                roles: principal.roles.clone(),
            },
        ];
        if !wanted.iter().any(|n| n == PLACEHOLDER_COLLECTION) {
            steps.push(Step::CreateCollection {
                db: db.clone(),
                name: PLACEHOLDER_COLLECTION.to_string(),
                enabled: false,
            });
        }
        steps.extend(wanted.into_iter().map(|name| Step::CreateCollection {
            db: db.clone(),
            name,
            enabled: true,
        }));

        Ok(Self {
            database: db,
            principal,
            steps,
        })
    }

    pub fn collections(&self) -> impl Iterator<Item = (&str, bool)> {
        self.steps.iter().filter_map(|step| match step {
            Step::CreateCollection { name, enabled, .. } => Some((name.as_str(), *enabled)),
            _ => None,
        })
    }
}
