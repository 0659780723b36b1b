// common/src/models/session.rs
use serde::{Deserialize, Serialize};

/// The identity derived from the current access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Raw role claim, uppercased. Backend role strings vary ("ADMIN",
    /// "ROLE_ADMIN", ...), so keep the original text and classify on demand.
    pub role: String,
    /// Principal name taken from the token claims
    pub username: String,
}

/// Coarse role used for routing decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Student,
    User,
}

impl Role {
    /// Widening match: the backend reports roles as "ADMIN", "ROLE_ADMIN"
    /// and similar, so this is a substring test, not an exact comparison.
    pub fn classify(raw: &str) -> Self {
        let normalized = raw.to_uppercase();
        if normalized.contains("ADMIN") {
            Role::Admin
        } else if normalized.contains("STUDENT") {
            Role::Student
        } else {
            Role::User
        }
    }

    pub fn is_admin(raw: &str) -> bool {
        Self::classify(raw) == Role::Admin
    }
}

/// Persisted session pair as read back from storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub identity: Option<Identity>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.token.is_none()
    }
}

/// One login submission as sent to the authentication endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username_or_email: String,
    pub password: String,
    /// Role hint carried with demo logins; a decode fallback, never an
    /// authorization input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Raw payload returned by the authentication endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    pub access_token: String,
    pub must_change_password: bool,
    pub role: Option<String>,
    pub roles: Vec<String>,
}

/// Body for the forced password change endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_admin_substring_in_any_case() {
        assert_eq!(Role::classify("ADMIN"), Role::Admin);
        assert_eq!(Role::classify("role_admin"), Role::Admin);
        assert_eq!(Role::classify("Administrator"), Role::Admin);
    }

    #[test]
    fn classify_falls_through_to_student_then_user() {
        assert_eq!(Role::classify("STUDENT"), Role::Student);
        assert_eq!(Role::classify("ROLE_STUDENT"), Role::Student);
        assert_eq!(Role::classify("USER"), Role::User);
        assert_eq!(Role::classify(""), Role::User);
        assert_eq!(Role::classify("accountant"), Role::User);
    }

    #[test]
    fn login_response_tolerates_missing_optional_fields() {
        let response: LoginResponse = serde_json::from_str(r#"{"accessToken":"t"}"#)
            .expect("minimal payload deserializes");
        assert_eq!(response.access_token, "t");
        assert!(!response.must_change_password);
        assert!(response.role.is_none());
        assert!(response.roles.is_empty());
    }

    #[test]
    fn credentials_omit_absent_role_hint_on_the_wire() {
        let credentials = Credentials {
            username_or_email: "admin@example.com".to_string(),
            password: "Admin@123".to_string(),
            role: None,
        };
        let wire = serde_json::to_value(&credentials).expect("serializes");
        assert!(wire.get("role").is_none());
        assert_eq!(
            wire.get("usernameOrEmail").and_then(|v| v.as_str()),
            Some("admin@example.com")
        );
    }
}
