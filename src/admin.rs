use anyhow::Context;
use async_trait::async_trait;
use mongodb::{
    bson::doc,
    error::{Error as DriverError, ErrorKind},
    options::ClientOptions,
    Client,
};
use tracing::debug;

use crate::credential::{CredentialDescriptor, UserInfo, UsersInfoReply};
use crate::error::ProvisionError;

/// `Location51003`: user already exists.
const USER_EXISTS: i32 = 51003;
/// Legacy servers report a duplicate user as a duplicate key on `system.users`.
const DUPLICATE_KEY: i32 = 11000;
const NAMESPACE_EXISTS: i32 = 48;

/// Administrative commands issued against the document database.
#[async_trait]
pub trait AdminClient: Send + Sync {
    async fn ping(&self) -> Result<(), ProvisionError>;
    async fn create_user(
        &self,
        db: &str,
        credential: &CredentialDescriptor,
    ) -> Result<(), ProvisionError>;
    async fn user_info(&self, db: &str, user: &str) -> Result<Option<UserInfo>, ProvisionError>;
    async fn create_collection(&self, db: &str, name: &str) -> Result<(), ProvisionError>;
    async fn collection_names(&self, db: &str) -> Result<Vec<String>, ProvisionError>;
}

#[derive(Clone)]
pub struct MongoAdmin {
    client: Client,
}

impl MongoAdmin {
    pub async fn connect(uri: &str) -> anyhow::Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .context("parse mongodb connection string")?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        let client = Client::with_options(options).context("build mongodb client")?;
        Ok(Self { client })
    }
}

fn command_code(err: &DriverError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        _ => None,
    }
}

fn map_create_user_error(db: &str, user: &str, err: DriverError) -> ProvisionError {
    match command_code(&err) {
        Some(USER_EXISTS | DUPLICATE_KEY) => {
            debug!(error = %err, "createUser rejected as duplicate");
            ProvisionError::UserExists {
                user: user.to_string(),
                db: db.to_string(),
            }
        }
        _ => err.into(),
    }
}

fn map_create_collection_error(db: &str, name: &str, err: DriverError) -> ProvisionError {
    match command_code(&err) {
        Some(NAMESPACE_EXISTS) => ProvisionError::CollectionExists {
            db: db.to_string(),
            name: name.to_string(),
        },
        _ => err.into(),
    }
}

#[async_trait]
impl AdminClient for MongoAdmin {
    async fn ping(&self) -> Result<(), ProvisionError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn create_user(
        &self,
        db: &str,
        credential: &CredentialDescriptor,
    ) -> Result<(), ProvisionError> {
        self.client
            .database(db)
            .run_command(credential.create_user_command())
            .await
            .map_err(|e| map_create_user_error(db, &credential.user, e))?;
        Ok(())
    }

    async fn user_info(&self, db: &str, user: &str) -> Result<Option<UserInfo>, ProvisionError> {
        let reply = self
            .client
            .database(db)
            .run_command(doc! { "usersInfo": user })
            .await?;
        let reply: UsersInfoReply = mongodb::bson::from_document(reply)?;
        Ok(reply
            .users
            .into_iter()
            .find(|u| u.user == user && u.db == db))
    }

    async fn create_collection(&self, db: &str, name: &str) -> Result<(), ProvisionError> {
        self.client
            .database(db)
            .create_collection(name)
            .await
            .map_err(|e| map_create_collection_error(db, name, e))
    }

    async fn collection_names(&self, db: &str) -> Result<Vec<String>, ProvisionError> {
        Ok(self.client.database(db).list_collection_names().await?)
    }
}
