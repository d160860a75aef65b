use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::credential::secret::Secret;
use crate::error::ProvisionError;
use crate::naming::validate_database_name;

/// One `{ role, db }` grant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: String, // built-in or custom role name, e.g. dbOwner
    pub db: String,   // database the role applies to
}

impl RoleAssignment {
    pub fn new(role: impl Into<String>, db: impl Into<String>) -> Result<Self, ProvisionError> {
        let role = role.into();
        let db = db.into();
        if role.trim().is_empty() {
            return Err(ProvisionError::InvalidRole(format!("{}@{}", role, db)));
        }
        validate_database_name(&db)?;
        Ok(Self { role, db })
    }
}

/// The user to create, without its password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user: String,
    pub roles: Vec<RoleAssignment>,
}

impl Principal {
    pub fn new(
        user: impl Into<String>,
        roles: Vec<RoleAssignment>,
    ) -> Result<Self, ProvisionError> {
        let user = user.into().trim().to_string();
        if user.is_empty() {
            return Err(ProvisionError::EmptyUser);
        }
        if roles.is_empty() {
            return Err(ProvisionError::EmptyRoles);
        }
        Ok(Self { user, roles })
    }
}

/// Everything `createUser` needs: identifier, secret and ordered role grants.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialDescriptor {
    pub user: String,
    #[serde(skip_serializing)]
    pub pwd: Secret, // only ever leaves the process inside the command document
    pub roles: Vec<RoleAssignment>,
}

impl CredentialDescriptor {
    pub fn new(principal: &Principal, pwd: Secret) -> Result<Self, ProvisionError> {
        if pwd.is_empty() {
            return Err(ProvisionError::MissingSecret);
        }
        Ok(Self {
            user: principal.user.clone(),
            pwd,
            roles: principal.roles.clone(),
        })
    }

    pub fn create_user_command(&self) -> Document {
        let roles: Vec<Document> = self
            .roles
            .iter()
            .map(|r| doc! { "role": r.role.as_str(), "db": r.db.as_str() })
            .collect();
        doc! {
            "createUser": self.user.as_str(),
            "pwd": self.pwd.expose(),
            "roles": roles,
        }
    }
}

/// A user record as reported by `usersInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub user: String,
    pub db: String,
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersInfoReply {
    #[serde(default)]
    pub users: Vec<UserInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Principal {
        Principal::new("zwc", vec![RoleAssignment::new("dbOwner", "osc_db").unwrap()]).unwrap()
    }

    #[test]
    fn principal_requires_user_and_roles() {
        assert!(matches!(
            Principal::new("", vec![RoleAssignment::new("dbOwner", "osc_db").unwrap()]),
            Err(ProvisionError::EmptyUser)
        ));
        assert!(matches!(
            Principal::new("zwc", vec![]),
            Err(ProvisionError::EmptyRoles)
        ));
    }

    #[test]
    fn principal_stores_trimmed_user() {
        let principal = Principal::new(
            " zwc ",
            vec![RoleAssignment::new("dbOwner", "osc_db").unwrap()],
        )
        .unwrap();
        assert_eq!(principal.user, "zwc");
        let cmd = CredentialDescriptor::new(&principal, Secret::new("pw"))
            .unwrap()
            .create_user_command();
        assert_eq!(cmd.get_str("createUser").unwrap(), "zwc");
    }

    #[test]
    fn role_assignment_rejects_blank_role_and_bad_db() {
        assert!(matches!(
            RoleAssignment::new(" ", "osc_db"),
            Err(ProvisionError::InvalidRole(_))
        ));
        assert!(matches!(
            RoleAssignment::new("read", "osc.db"),
            Err(ProvisionError::InvalidDatabaseName { .. })
        ));
    }

    #[test]
    fn create_user_command_shape() {
        let descriptor = CredentialDescriptor::new(&owner(), Secret::new("s3cret")).unwrap();
        let cmd = descriptor.create_user_command();
        assert_eq!(cmd.get_str("createUser").unwrap(), "zwc");
        assert_eq!(cmd.get_str("pwd").unwrap(), "s3cret");
        let roles = cmd.get_array("roles").unwrap();
        assert_eq!(roles.len(), 1);
        let first = roles[0].as_document().unwrap();
        assert_eq!(first.get_str("role").unwrap(), "dbOwner");
        assert_eq!(first.get_str("db").unwrap(), "osc_db");
        // command name must come first for the server to dispatch it
        assert_eq!(cmd.keys().next().map(String::as_str), Some("createUser"));
    }

    #[test]
    fn command_keeps_role_order() {
        let principal = Principal::new(
            "zwc",
            vec![
                RoleAssignment::new("dbOwner", "osc_db").unwrap(),
                RoleAssignment::new("read", "reporting").unwrap(),
            ],
        )
        .unwrap();
        let cmd = CredentialDescriptor::new(&principal, Secret::new("x"))
            .unwrap()
            .create_user_command();
        let roles = cmd.get_array("roles").unwrap();
        assert_eq!(roles[1].as_document().unwrap().get_str("db").unwrap(), "reporting");
    }

    #[test]
    fn descriptor_json_omits_password() {
        let descriptor = CredentialDescriptor::new(&owner(), Secret::new("s3cret")).unwrap();
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(!json.contains("pwd"));
        assert!(!format!("{:?}", descriptor).contains("s3cret"));
    }

    #[test]
    fn descriptor_rejects_empty_password() {
        assert!(matches!(
            CredentialDescriptor::new(&owner(), Secret::new("")),
            Err(ProvisionError::MissingSecret)
        ));
    }

    #[test]
    fn decodes_users_info_reply() {
        let reply = doc! {
            "users": [{
                "_id": "osc_db.zwc",
                "user": "zwc",
                "db": "osc_db",
                "roles": [{ "role": "dbOwner", "db": "osc_db" }],
                "mechanisms": ["SCRAM-SHA-1", "SCRAM-SHA-256"],
            }],
            "ok": 1.0,
        };
        let parsed: UsersInfoReply = mongodb::bson::from_document(reply).unwrap();
        assert_eq!(parsed.users.len(), 1);
        assert_eq!(parsed.users[0].roles[0].role, "dbOwner");
    }
}
