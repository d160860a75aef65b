use thiserror::Error;

/// Failures of a provisioning run.
///
/// Validation variants are raised before anything reaches the server; the
/// remaining ones carry what the server answered.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("invalid database name {name:?}: {reason}")]
    InvalidDatabaseName { name: String, reason: &'static str },

    #[error("invalid collection name {name:?}: {reason}")]
    InvalidCollectionName { name: String, reason: &'static str },

    #[error("user name must not be empty")]
    EmptyUser,

    #[error("at least one role assignment is required")]
    EmptyRoles,

    #[error("invalid role assignment {0:?}")]
    InvalidRole(String),

    #[error("no password configured; set OSC_DB_PASSWORD or OSC_DB_PASSWORD_FILE")]
    MissingSecret,

    #[error("user {user:?} already exists in database {db:?}")]
    UserExists { user: String, db: String },

    #[error("collection {name:?} already exists in database {db:?}")]
    CollectionExists { db: String, name: String },

    #[error("mongodb: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("decode server reply: {0}")]
    Decode(#[from] mongodb::bson::de::Error),
}
