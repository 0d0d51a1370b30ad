//! Session identity
//!
//! The authentication provider hands the shell a set of decoded claims.
//! The shell only needs two of them: the numeric user id that keys the
//! versioned configuration, and the role list that gates admin features.

use serde::{Deserialize, Serialize};

/// Numeric user identifier keying the versioned configuration
pub type UserId = i64;

/// Role granting access to global settings
pub const ADMIN_ROLE: &str = "admin";

/// Decoded claims supplied by the authentication provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The user a shell session acts for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub roles: Vec<String>,
}

impl SessionUser {
    /// Resolve the session user from claims
    ///
    /// Claims without a user id fall back to `fallback_id`.
    pub fn from_claims(claims: SessionClaims, fallback_id: UserId) -> Self {
        let id = match claims.user_id {
            Some(id) => id,
            None => {
                tracing::warn!(
                    fallback_id,
                    "Session claims carry no user id, using fallback user"
                );
                fallback_id
            }
        };

        Self {
            id,
            roles: claims.roles,
        }
    }

    /// Whether the user holds `role`
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_user_id_wins() {
        let user = SessionUser::from_claims(
            SessionClaims {
                user_id: Some(7),
                roles: vec!["admin".to_string()],
            },
            1,
        );
        assert_eq!(user.id, 7);
        assert!(user.is_admin());
    }

    #[test]
    fn test_missing_user_id_uses_fallback() {
        let user = SessionUser::from_claims(SessionClaims::default(), 1);
        assert_eq!(user.id, 1);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_claims_deserialize_camel_case() {
        let claims: SessionClaims =
            serde_json::from_str(r#"{"userId": 3, "roles": ["viewer"]}"#).unwrap();
        assert_eq!(claims.user_id, Some(3));
        assert_eq!(claims.roles, vec!["viewer"]);

        let claims: SessionClaims = serde_json::from_str("{}").unwrap();
        assert_eq!(claims, SessionClaims::default());
    }
}
