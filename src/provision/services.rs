use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::credential::{CredentialDescriptor, Secret};
use crate::error::ProvisionError;
use crate::provision::plan::{Plan, Step};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Report an existing user as skipped instead of failing the run.
    pub skip_existing_user: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Skipped,
    Disabled,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    /// Set only when the password was generated for this run and the user was created with it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_password: Option<String>,
}

impl Report {
    pub fn user_created(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s.step, Step::CreateUser { .. }) && s.outcome == Outcome::Applied)
    }

    /// Record a generated password in the report. Dropped when no user was created with it.
    pub fn reveal_generated_password(&mut self, secret: &Secret) {
        if self.user_created() {
            self.generated_password = Some(secret.expose().to_string());
        }
    }
}

/// Run the plan top to bottom, stopping at the first failing step.
pub async fn apply(
    st: &AppState,
    plan: &Plan,
    secret: Secret,
    options: ApplyOptions,
) -> Result<Report, ProvisionError> {
    let credential = CredentialDescriptor::new(&plan.principal, secret)?;
    st.admin.ping().await?;
    debug!("server reachable");

    let mut report = Report::default();
    for step in &plan.steps {
        let outcome = match step {
            Step::SelectDatabase { db } => {
                // the server creates the database lazily on first write
                info!(db = %db, outcome = "applied", "target database selected");
                Outcome::Applied
            }
            Step::CreateUser { db, user, .. } => {
                match st.admin.create_user(db, &credential).await {
                    Ok(()) => {
                        info!(db = %db, user = %user, outcome = "applied", "user created");
                        Outcome::Applied
                    }
                    Err(ProvisionError::UserExists { .. }) if options.skip_existing_user => {
                        warn!(db = %db, user = %user, outcome = "skipped", "user already exists");
                        Outcome::Skipped
                    }
                    Err(e) => {
                        error!(db = %db, user = %user, error = %e, "create user failed");
                        return Err(e);
                    }
                }
            }
            Step::CreateCollection {
                db,
                name,
                enabled: false,
            } => {
                debug!(
                    db = %db,
                    collection = %name,
                    outcome = "disabled",
                    "collection step disabled"
                );
                Outcome::Disabled
            }
            Step::CreateCollection {
                db,
                name,
                enabled: true,
            } => match st.admin.create_collection(db, name).await {
                Ok(()) => {
                    info!(db = %db, collection = %name, outcome = "applied", "collection created");
                    Outcome::Applied
                }
                Err(ProvisionError::CollectionExists { .. }) => {
                    warn!(
                        db = %db,
                        collection = %name,
                        outcome = "skipped",
                        "collection already exists"
                    );
                    Outcome::Skipped
                }
                Err(e) => {
                    error!(db = %db, collection = %name, error = %e, "create collection failed");
                    return Err(e);
                }
            },
        };
        report.steps.push(StepReport {
            step: step.clone(),
            outcome,
        });
    }
    Ok(report)
}
