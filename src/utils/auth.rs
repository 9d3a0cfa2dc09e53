use crate::services::auth_service::Principal;
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT session payload: standard claims plus the principal union flattened
/// beside them. The token carries nothing else, in particular no password
/// hash and no secret material.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
    pub jti: String,
    #[serde(flatten)]
    pub principal: Principal,
}

pub fn issue_session(principal: &Principal, secret: &str, max_age_hours: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(max_age_hours))
        .expect("valid timestamp")
        .timestamp();

    let claims = SessionClaims {
        sub: principal.id().to_string(),
        exp: expiration as usize,
        jti: uuid::Uuid::new_v4().to_string(),
        principal: principal.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

/// Inverse projection; expiry is enforced here by the JWT validation, not by
/// any bookkeeping of our own.
pub fn decode_session(token: &str, secret: &str) -> Result<SessionClaims> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Pull a cookie value out of a Cookie header line
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth_service::{AdminPrincipal, AdminRole, Principal};

    fn sample_admin() -> Principal {
        Principal::Admin(AdminPrincipal {
            id: "admin_123".into(),
            email: "ops@example.com".into(),
            username: "ops".into(),
            full_name: "Ops Admin".into(),
            avatar: None,
            role: AdminRole::SuperAdmin,
            permissions: vec!["files:manage".into(), "posts:publish".into()],
            is_active: true,
        })
    }

    #[test]
    fn test_session_cycle() {
        let secret = "test_secret";
        let principal = sample_admin();
        let token = issue_session(&principal, secret, 1).unwrap();
        let claims = decode_session(&token, secret).unwrap();

        assert_eq!(claims.sub, "admin_123");
        match claims.principal {
            Principal::Admin(p) => {
                assert_eq!(p.role, AdminRole::SuperAdmin);
                assert_eq!(p.permissions.len(), 2);
                assert!(p.is_active);
            }
            Principal::User(_) => panic!("expected admin principal"),
        }
    }

    #[test]
    fn test_session_rejects_wrong_secret() {
        let token = issue_session(&sample_admin(), "secret_a", 1).unwrap();
        assert!(decode_session(&token, "secret_b").is_err());
    }

    #[test]
    fn test_token_payload_shape() {
        // Payload carries kind/role/permissions verbatim and nothing secret.
        let token = issue_session(&sample_admin(), "s", 1).unwrap();
        let data = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"s"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims["kind"], "admin");
        assert_eq!(data.claims["role"], "SUPER_ADMIN");
        assert!(data.claims.get("passwordHash").is_none());
        assert!(data.claims.get("password_hash").is_none());
    }

    #[test]
    fn test_cookie_value() {
        let header = "theme=dark; session_token=abc.def.ghi; other=1";
        assert_eq!(cookie_value(header, "session_token"), Some("abc.def.ghi"));
        assert_eq!(cookie_value(header, "missing"), None);
    }
}
