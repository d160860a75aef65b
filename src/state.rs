use crate::admin::{AdminClient, MongoAdmin};
use crate::config::AppConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub admin: Arc<dyn AdminClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let admin = MongoAdmin::connect(config.mongodb_uri.expose()).await?;
        let admin = Arc::new(admin) as Arc<dyn AdminClient>;
        Ok(Self { admin, config })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::credential::{CredentialDescriptor, UserInfo};
        use crate::error::ProvisionError;
        use async_trait::async_trait;
        use std::collections::HashMap;
        use std::sync::Mutex;

        #[derive(Default)]
        struct FakeAdmin {
            users: Mutex<HashMap<(String, String), UserInfo>>,
            collections: Mutex<HashMap<String, Vec<String>>>,
        }

        #[async_trait]
        impl AdminClient for FakeAdmin {
            async fn ping(&self) -> Result<(), ProvisionError> {
                Ok(())
            }

            async fn create_user(
                &self,
                db: &str,
                credential: &CredentialDescriptor,
            ) -> Result<(), ProvisionError> {
                let mut users = self.users.lock().unwrap();
                let key = (db.to_string(), credential.user.clone());
                if users.contains_key(&key) {
                    return Err(ProvisionError::UserExists {
                        user: credential.user.clone(),
                        db: db.to_string(),
                    });
                }
                users.insert(
                    key,
                    UserInfo {
                        user: credential.user.clone(),
                        db: db.to_string(),
                        roles: credential.roles.clone(),
                    },
                );
                Ok(())
            }

            async fn user_info(
                &self,
                db: &str,
                user: &str,
            ) -> Result<Option<UserInfo>, ProvisionError> {
                let users = self.users.lock().unwrap();
                Ok(users.get(&(db.to_string(), user.to_string())).cloned())
            }

            async fn create_collection(&self, db: &str, name: &str) -> Result<(), ProvisionError> {
                let mut collections = self.collections.lock().unwrap();
                let names = collections.entry(db.to_string()).or_default();
                if names.iter().any(|n| n == name) {
                    return Err(ProvisionError::CollectionExists {
                        db: db.to_string(),
                        name: name.to_string(),
                    });
                }
                names.push(name.to_string());
                Ok(())
            }

            async fn collection_names(&self, db: &str) -> Result<Vec<String>, ProvisionError> {
                let collections = self.collections.lock().unwrap();
                Ok(collections.get(db).cloned().unwrap_or_default())
            }
        }

        let config = Arc::new(AppConfig {
            mongodb_uri: crate::credential::Secret::new("mongodb://localhost:27017"),
            database: "osc_db".into(),
            user: "zwc".into(),
            password: Some(crate::credential::Secret::new("test")),
            roles: "dbOwner".into(),
            collections: Vec::new(),
        });

        let admin = Arc::new(FakeAdmin::default()) as Arc<dyn AdminClient>;
        Self { admin, config }
    }
}
