use serde::{Deserialize, Serialize};

/// Account role as stored on the user document (`role` field).
///
/// Anything other than the three known values, including a missing field, is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Role {
    None,
    Surveyor,
    Admin,
    #[serde(rename = "Pro-User")]
    ProUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Surveyor => "Surveyor",
            Role::Admin => "Admin",
            Role::ProUser => "Pro-User",
        }
    }

    /// Parses the stored representation. Unknown strings map to `Role::None`.
    pub fn parse(value: &str) -> Self {
        match value {
            "Surveyor" => Role::Surveyor,
            "Admin" => Role::Admin,
            "Pro-User" => Role::ProUser,
            _ => Role::None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles admitted by a guarded route.
pub type RoleSet = &'static [Role];

pub const ADMIN: RoleSet = &[Role::Admin];
pub const SURVEYOR: RoleSet = &[Role::Surveyor];
pub const SURVEYOR_OR_ADMIN: RoleSet = &[Role::Surveyor, Role::Admin];
pub const PRO_USER: RoleSet = &[Role::ProUser];

pub fn is_admitted(role: Role, allowed: RoleSet) -> bool {
    role != Role::None && allowed.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_roles() {
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse("Surveyor"), Role::Surveyor);
        assert_eq!(Role::parse("Pro-User"), Role::ProUser);
        assert_eq!(Role::parse("admin"), Role::None);
        assert_eq!(Role::parse(""), Role::None);
    }

    #[test]
    fn test_role_sets() {
        assert!(is_admitted(Role::Admin, SURVEYOR_OR_ADMIN));
        assert!(is_admitted(Role::Surveyor, SURVEYOR_OR_ADMIN));
        assert!(!is_admitted(Role::ProUser, SURVEYOR_OR_ADMIN));
        assert!(!is_admitted(Role::Surveyor, ADMIN));
        assert!(is_admitted(Role::ProUser, PRO_USER));
        assert!(!is_admitted(Role::None, &[Role::None]));
    }

    #[test]
    fn test_pro_user_wire_name() {
        assert_eq!(serde_json::to_string(&Role::ProUser).unwrap(), "\"Pro-User\"");
    }
}
