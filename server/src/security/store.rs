use std::sync::Arc;

use crate::security::Role;
use crate::server::{self, SimpleResult};

/// Synchronous membership queries against the user/role relation.
///
/// The relation is owned elsewhere; callers only read it.
pub trait RoleStore: Send + Sync {
    /// Does the user hold the role? Existence check only.
    fn has_role(&self, user_id: u32, role: Role) -> SimpleResult<bool>;
}

// ROWNUM stops the scan at the first matching membership row
const MEMBERSHIP_SQL: &str =
    "SELECT 1 FROM USER_ROLES WHERE USER_ID = :1 AND ROLE_ID = :2 AND ROWNUM <= 1";

pub struct OracleRoleStore;

impl OracleRoleStore {
    pub fn shared() -> Arc<dyn RoleStore> {
        Arc::new(OracleRoleStore)
    }
}

impl RoleStore for OracleRoleStore {
    fn has_role(&self, user_id: u32, role: Role) -> SimpleResult<bool> {
        let conn = server::get_connection()?;
        match conn.query_row_as::<u32>(MEMBERSHIP_SQL, &[&user_id, &role.id()]) {
            Ok(_) => Ok(true),
            Err(oracle::Error::NoDataFound) => Ok(false),
            Err(err) => Err(format!("query role membership err: {:?}", err)),
        }
    }
}
