use serde::Serialize;
use tracing::{info, warn};

use crate::error::ProvisionError;
use crate::provision::plan::Plan;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Verification {
    pub checks: Vec<Check>,
}

impl Verification {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    fn push(&mut self, name: String, passed: bool, detail: String) {
        if passed {
            info!(check = %name, "check passed");
        } else {
            warn!(check = %name, detail = %detail, "check failed");
        }
        self.checks.push(Check {
            name,
            passed,
            detail,
        });
    }
}

/// Compare the live server against what `plan` would have produced.
pub async fn verify(st: &AppState, plan: &Plan) -> Result<Verification, ProvisionError> {
    let mut out = Verification::default();
    let db = plan.database.as_str();
    let user = plan.principal.user.as_str();

    let info = st.admin.user_info(db, user).await?;
    out.push(
        format!("user {} exists in {}", user, db),
        info.is_some(),
        match &info {
            Some(_) => "found".to_string(),
            None => "usersInfo returned no matching user".to_string(),
        },
    );

    let mut expected = plan.principal.roles.clone();
    expected.sort();
    let (roles_ok, detail) = match info {
        Some(info) => {
            let mut actual = info.roles;
            actual.sort();
            let detail = format!("expected {:?}, found {:?}", expected, actual);
            (actual == expected, detail)
        }
        None => (false, "user missing".to_string()),
    };
    out.push(format!("user {} has the planned roles", user), roles_ok, detail);

    let names = st.admin.collection_names(db).await?;
    for (name, enabled) in plan.collections() {
        let present = names.iter().any(|n| n == name);
        let (label, detail) = if enabled {
            ("exists", if present { "found" } else { "not found" })
        } else {
            ("is absent", if present { "found" } else { "not found" })
        };
        out.push(
            format!("collection {} {}", name, label),
            present == enabled,
            detail.to_string(),
        );
    }

    Ok(out)
}
