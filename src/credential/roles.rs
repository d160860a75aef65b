use crate::credential::dto::RoleAssignment;
use crate::error::ProvisionError;

/// Parse `"dbOwner"` or `"dbOwner@osc_db,read@reporting"` into ordered grants.
/// A role without `@db` is scoped to `default_db`.
pub fn parse_roles(spec: &str, default_db: &str) -> Result<Vec<RoleAssignment>, ProvisionError> {
    let mut roles = Vec::new();
    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let assignment = match item.split_once('@') {
            Some((role, db)) => {
                if db.trim().is_empty() {
                    return Err(ProvisionError::InvalidRole(item.to_string()));
                }
                RoleAssignment::new(role.trim(), db.trim())?
            }
            None => RoleAssignment::new(item, default_db)?,
        };
        if !roles.contains(&assignment) {
            roles.push(assignment);
        }
    }
    if roles.is_empty() {
        return Err(ProvisionError::EmptyRoles);
    }
    Ok(roles)
}
