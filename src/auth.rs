use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Issues and checks HS256 bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// `ttl_days` is clamped to `1..=MAX_TOKEN_TTL_DAYS`.
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days.clamp(1, MAX_TOKEN_TTL_DAYS)),
        }
    }

    pub fn issue(&self, user_id: &str, email: &str) -> jsonwebtoken::errors::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            exp: (now + self.ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// `None` for expired, tampered or malformed tokens.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                log::debug!("Rejected token: {}", e);
                None
            }
        }
    }
}

/// The token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .and_then(|rest| rest.split(' ').next())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let tokens = TokenService::new("test-secret", 7);
        let token = tokens.issue("demo_user", "demo@example.com").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id, "demo_user");
        assert_eq!(claims.email, "demo@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("one", 7).issue("u", "u@example.com").unwrap();
        assert!(TokenService::new("two", 7).verify(&token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("test-secret", 7);
        let past = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let claims = Claims {
            user_id: "u".to_string(),
            email: "u@example.com".to_string(),
            exp: past,
            iat: past - 60,
        };
        let token = encode(&Header::default(), &claims, &tokens.encoding).unwrap();
        assert!(tokens.verify(&token).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = TokenService::new("test-secret", 7);
        assert!(tokens.verify("not.a.token").is_none());
        assert!(tokens.verify("").is_none());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let tokens = TokenService::new("test-secret", i64::MAX);
        let token = tokens.issue("u", "u@example.com").unwrap();
        let claims = tokens.verify(&token).unwrap();

        let max = Duration::days(MAX_TOKEN_TTL_DAYS).num_seconds() as usize;
        assert!(claims.exp - claims.iat <= max);
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("bearer abc"), None);
    }
}
