use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Role catalog of the academic program.
///
/// Memberships live in the USER_ROLES relation; this enumeration only fixes
/// the identifiers a route scope can require.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Advisor,
    Student,
}

pub const ALL_ROLES: [Role; 3] = [Role::Administrator, Role::Advisor, Role::Student];

impl Role {
    /// numeric identifier in the membership relation
    pub fn id(self) -> u32 {
        match self {
            Role::Administrator => 1,
            Role::Advisor => 2,
            Role::Student => 3,
        }
    }

    pub fn from_id(id: u32) -> Option<Role> {
        ALL_ROLES.iter().copied().find(|role| role.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Advisor => "advisor",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    // Accepts the numeric identifier or the role name.
    // Anything else is a registration-time error, it never maps to a role.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = value.parse::<u32>() {
            return Role::from_id(id).ok_or_else(|| UnknownRole(value.to_string()));
        }
        ALL_ROLES
            .iter()
            .copied()
            .find(|role| role.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownRole(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn identifiers_parse_to_their_roles() {
        assert_eq!("1".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("2".parse::<Role>().unwrap(), Role::Advisor);
        assert_eq!("3".parse::<Role>().unwrap(), Role::Student);
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("advisor".parse::<Role>().unwrap(), Role::Advisor);
        assert_eq!("Administrator".parse::<Role>().unwrap(), Role::Administrator);
    }

    #[test]
    fn malformed_values_do_not_coerce_to_a_role() {
        // there is no role id 0, and non-numeric input must not fall back to one
        assert!("0".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!("x".parse::<Role>().is_err());
        assert!("4".parse::<Role>().is_err());
        assert!("-1".parse::<Role>().is_err());
    }

    #[test]
    fn ids_roundtrip() {
        assert_eq!(Role::from_id(Role::Advisor.id()), Some(Role::Advisor));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(99), None);
    }
}
