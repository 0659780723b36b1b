// common/src/utils.rs
use serde_json::Value;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::models::session::Identity;

/// Setup tracing for consistent logging across the portal core
pub fn setup_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

// Claim names consulted when deriving the identity, in priority order
const ROLE_CLAIMS: [&str; 4] = ["role", "roles", "authorities", "scope"];
const PRINCIPAL_CLAIMS: [&str; 3] = ["sub", "username", "email"];

/// Decode the claims segment of an access token without verifying the
/// signature. The token is opaque to the client; verification is the
/// backend's job.
pub fn decode_claims(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::decode_config(payload, base64::URL_SAFE_NO_PAD).ok()?;
    serde_json::from_slice(&bytes).ok()
}

// First usable string from a claim value; collections contribute their
// first element.
fn claim_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.first().and_then(claim_string),
        _ => None,
    }
}

fn first_claim(claims: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| claims.get(*name).and_then(claim_string))
}

/// Derive {role, principal} from an access token, falling back to the
/// caller-supplied hints when the token is malformed or claims are absent.
/// Never fails; a decode problem degrades to the conservative `USER` role
/// and is logged for operators, not surfaced to the end user.
pub fn extract_identity(
    token: &str,
    fallback_role: Option<&str>,
    fallback_username: &str,
) -> Identity {
    let fallback_role = fallback_role.filter(|role| !role.is_empty());

    let claims = match decode_claims(token) {
        Some(claims) => claims,
        None => {
            if !token.is_empty() {
                tracing::warn!("Unable to decode access token claims; using fallback identity");
            }
            return Identity {
                role: fallback_role.unwrap_or("USER").to_uppercase(),
                username: fallback_username.to_string(),
            };
        }
    };

    let role = first_claim(&claims, &ROLE_CLAIMS)
        .or_else(|| fallback_role.map(str::to_string))
        .unwrap_or_else(|| "USER".to_string());

    let username = first_claim(&claims, &PRINCIPAL_CLAIMS)
        .unwrap_or_else(|| fallback_username.to_string());

    Identity {
        role: role.to_uppercase(),
        username,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn mint(claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("token encodes")
    }

    #[test]
    fn role_claim_takes_priority_over_collections() {
        let token = mint(json!({
            "sub": "aditi.sharma@example.com",
            "role": "student",
            "roles": ["ROLE_ADMIN"],
        }));
        let identity = extract_identity(&token, None, "");
        assert_eq!(identity.role, "STUDENT");
        assert_eq!(identity.username, "aditi.sharma@example.com");
    }

    #[test]
    fn collection_claims_contribute_their_first_element() {
        let token = mint(json!({
            "sub": "admin@example.com",
            "roles": ["ROLE_ADMIN", "ROLE_USER"],
        }));
        assert_eq!(extract_identity(&token, None, "").role, "ROLE_ADMIN");

        let token = mint(json!({
            "sub": "admin@example.com",
            "authorities": ["admin"],
        }));
        assert_eq!(extract_identity(&token, None, "").role, "ADMIN");
    }

    #[test]
    fn scope_claim_is_the_last_resort_before_fallbacks() {
        let token = mint(json!({
            "sub": "someone@example.com",
            "scope": "student",
        }));
        assert_eq!(extract_identity(&token, None, "").role, "STUDENT");
    }

    #[test]
    fn token_without_role_claims_degrades_to_user() {
        let token = mint(json!({ "sub": "someone@example.com" }));
        let identity = extract_identity(&token, None, "");
        assert_eq!(identity.role, "USER");
        assert_eq!(identity.username, "someone@example.com");
    }

    #[test]
    fn malformed_token_uses_caller_fallbacks() {
        let identity = extract_identity("not-a-token", Some("student"), "rahul.desai@example.com");
        assert_eq!(identity.role, "STUDENT");
        assert_eq!(identity.username, "rahul.desai@example.com");
    }

    #[test]
    fn empty_fallback_role_still_degrades_to_user() {
        let identity = extract_identity("", Some(""), "");
        assert_eq!(identity.role, "USER");
        assert_eq!(identity.username, "");
    }

    #[test]
    fn principal_prefers_sub_then_username_then_email() {
        let token = mint(json!({
            "username": "aditi",
            "email": "aditi.sharma@example.com",
        }));
        assert_eq!(extract_identity(&token, None, "").username, "aditi");

        let token = mint(json!({ "email": "aditi.sharma@example.com" }));
        assert_eq!(
            extract_identity(&token, None, "").username,
            "aditi.sharma@example.com"
        );
    }

    #[test]
    fn decode_claims_rejects_garbage() {
        assert!(decode_claims("").is_none());
        assert!(decode_claims("header-only").is_none());
        assert!(decode_claims("a.%%%.c").is_none());
    }
}
