//! Verification of the ID tokens sent by signed-in users.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header, jwk::JwkSet};
use log::debug;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::FunctionError;

/// Signing keys are rotated by the identity provider, a cached key set is refetched after an hour.
const KEYS_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub uid: String,
    pub email: Option<String>,
}

impl Caller {
    #[must_use]
    pub fn is_admin(&self, admin_email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|email| email.trim().eq_ignore_ascii_case(admin_email.trim()))
    }
}

pub trait TokenVerifier: Send + Sync + 'static {
    fn verify(&self, token: &str) -> impl Future<Output = Result<Caller, FunctionError>> + Send;
}

#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    email: Option<String>,
}

struct CachedKeys {
    fetched_at: Instant,
    keys: JwkSet,
}

/// Verifies RS256 ID tokens against the public keys of the secure token service.
pub struct JwkVerifier {
    client: reqwest::Client,
    jwk_url: String,
    project_id: String,
    keys: RwLock<Option<CachedKeys>>,
}

impl JwkVerifier {
    #[must_use]
    pub fn new(client: reqwest::Client, jwk_url: &str, project_id: &str) -> Self {
        Self {
            client,
            jwk_url: jwk_url.to_string(),
            project_id: project_id.to_string(),
            keys: RwLock::new(None),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.project_id
        )]);
        validation
    }

    async fn keys(&self) -> Result<JwkSet, FunctionError> {
        if let Some(cached) = self.keys.read().await.as_ref() {
            if cached.fetched_at.elapsed() < KEYS_TTL {
                return Ok(cached.keys.clone());
            }
        }

        debug!("fetching signing keys from {}", self.jwk_url);
        let keys: JwkSet = self
            .client
            .get(&self.jwk_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| FunctionError::internal("key retrieval", err))?
            .json()
            .await
            .map_err(|err| FunctionError::internal("key retrieval", err))?;

        *self.keys.write().await = Some(CachedKeys {
            fetched_at: Instant::now(),
            keys: keys.clone(),
        });

        Ok(keys)
    }
}

fn unauthenticated(reason: impl std::fmt::Display) -> FunctionError {
    debug!("rejected ID token: {reason}");
    FunctionError::Unauthenticated("Invalid ID token".to_string())
}

impl TokenVerifier for JwkVerifier {
    async fn verify(&self, token: &str) -> Result<Caller, FunctionError> {
        let header = decode_header(token).map_err(unauthenticated)?;
        let kid = header.kid.ok_or_else(|| unauthenticated("missing key id"))?;
        let keys = self.keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| unauthenticated(format!("unknown key id {kid}")))?;
        let key = DecodingKey::from_jwk(jwk).map_err(unauthenticated)?;
        let data = decode::<Claims>(token, &key, &self.validation()).map_err(unauthenticated)?;

        Ok(Caller {
            uid: data.claims.sub,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("Bearer abc.def.ghi"), Some("abc.def.ghi"))]
    #[case(Some("Bearer  abc "), Some("abc"))]
    #[case(Some("Bearer "), None)]
    #[case(Some("Basic abc"), None)]
    #[case(None, None)]
    fn test_bearer_token(#[case] value: Option<&str>, #[case] expected: Option<&str>) {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }

        assert_eq!(bearer_token(&headers), expected);
    }

    #[rstest]
    #[case(Some("admin@ironlog.app"), true)]
    #[case(Some("Admin@IronLog.app"), true)]
    #[case(Some("member@ironlog.app"), false)]
    #[case(None, false)]
    fn test_caller_is_admin(#[case] email: Option<&str>, #[case] expected: bool) {
        let caller = Caller {
            uid: "u1".to_string(),
            email: email.map(str::to_string),
        };

        assert_eq!(caller.is_admin("admin@ironlog.app"), expected);
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_token() {
        let verifier = JwkVerifier::new(reqwest::Client::new(), "http://127.0.0.1:9/keys", "demo");

        assert_eq!(
            verifier.verify("not a token").await,
            Err(FunctionError::Unauthenticated("Invalid ID token".to_string()))
        );
    }
}
