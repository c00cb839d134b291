//! Sessions backed by the Identity Toolkit REST API.
//!
//! The ID token and the refresh token are kept in local storage. The ID token is refreshed
//! shortly before it expires, a rejected refresh token ends the session.

use chrono::{DateTime, TimeDelta, Utc};
use gloo_net::http::Request;
use ironlog_domain as domain;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    firebase::Firebase,
    http::{HttpError, SendRequest, fetch},
    local_storage::LocalStorage,
};

const REFRESH_MARGIN_SECONDS: i64 = 60;
const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3600;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(REFRESH_MARGIN_SECONDS) >= self.expires_at
    }

    fn to_session(&self) -> Result<domain::Session, domain::ReadError> {
        Ok(domain::Session {
            user_id: domain::UserID::from(self.user_id.as_str()),
            email: domain::Email::new(&self.email)
                .map_err(|err| domain::ReadError::Other(Box::new(err)))?,
            id_token: self.id_token.clone(),
        })
    }
}

#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Expiry time for an `expiresIn` value given in seconds as a string.
#[must_use]
pub fn expires_at(now: DateTime<Utc>, expires_in: &str) -> DateTime<Utc> {
    now + TimeDelta::seconds(expires_in.parse().unwrap_or(DEFAULT_EXPIRES_IN_SECONDS))
}

/// Wrong email and wrong password are reported alike.
#[must_use]
pub fn sign_in_error(error: HttpError) -> domain::ReadError {
    match error.code() {
        Some(
            "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_EMAIL"
            | "USER_DISABLED",
        ) => domain::ReadError::NotFound,
        _ => error.into(),
    }
}

#[must_use]
pub fn sign_up_error(error: HttpError) -> domain::CreateError {
    match error.code() {
        Some("EMAIL_EXISTS") => domain::CreateError::Conflict,
        _ => error.into(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

impl<S: SendRequest> Firebase<S> {
    fn accounts_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{method}?key={}",
            self.config.identity_toolkit_url, self.config.api_key
        )
    }

    /// The stored session, with an ID token that is valid for at least another minute.
    pub async fn current_session(&self) -> Result<StoredSession, HttpError> {
        let session = match LocalStorage.read_session() {
            Ok(Some(session)) => session,
            Ok(None) => return Err(HttpError::NoSession),
            Err(err) => {
                warn!("failed to read session: {err}");
                return Err(HttpError::NoSession);
            }
        };

        let now = Utc::now();
        if !session.needs_refresh(now) {
            return Ok(session);
        }

        debug!("refreshing ID token");
        let response: RefreshResponse = match fetch(
            &self.sender,
            Request::post(&format!(
                "{}/token?key={}",
                self.config.secure_token_url, self.config.api_key
            ))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!(
                "grant_type=refresh_token&refresh_token={}",
                urlencoding::encode(&session.refresh_token)
            )),
        )
        .await
        {
            Ok(response) => response,
            Err(HttpError::Status {
                status: 400..=403, ..
            }) => {
                if let Err(err) = LocalStorage.remove_session() {
                    warn!("failed to remove session: {err}");
                }
                return Err(HttpError::NoSession);
            }
            Err(err) => return Err(err),
        };

        let session = StoredSession {
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: expires_at(now, &response.expires_in),
            ..session
        };
        if let Err(err) = LocalStorage.write_session(&session) {
            warn!("failed to write session: {err}");
        }

        Ok(session)
    }

    pub async fn id_token(&self) -> Result<String, HttpError> {
        Ok(self.current_session().await?.id_token)
    }
}

impl<S: SendRequest> domain::SessionRepository for Firebase<S> {
    async fn sign_in(
        &self,
        email: domain::Email,
        password: domain::Password,
    ) -> Result<domain::Session, domain::ReadError> {
        let response: SignInResponse = fetch(
            &self.sender,
            Request::post(&self.accounts_url("signInWithPassword")).json(&json!({
                "email": email.as_str(),
                "password": password.as_str(),
                "returnSecureToken": true,
            })),
        )
        .await
        .map_err(sign_in_error)?;

        let session = StoredSession {
            user_id: response.local_id,
            email: response.email,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: expires_at(Utc::now(), &response.expires_in),
        };
        LocalStorage
            .write_session(&session)
            .map_err(|err| domain::ReadError::Other(err.into()))?;

        session.to_session()
    }

    async fn initialize_session(&self) -> Result<domain::Session, domain::ReadError> {
        self.current_session().await?.to_session()
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        LocalStorage
            .remove_session()
            .map_err(|err| domain::DeleteError::Other(err.into()))
    }

    async fn send_password_reset(&self, email: domain::Email) -> Result<(), domain::UpdateError> {
        fetch::<_, serde_json::Value>(
            &self.sender,
            Request::post(&self.accounts_url("sendOobCode")).json(&json!({
                "requestType": "PASSWORD_RESET",
                "email": email.as_str(),
            })),
        )
        .await
        .map_err(|err| match err.code() {
            Some("EMAIL_NOT_FOUND") => domain::UpdateError::NotFound,
            _ => err.into(),
        })?;
        Ok(())
    }

    async fn create_account(
        &self,
        email: domain::Email,
        password: domain::Password,
    ) -> Result<domain::UserID, domain::CreateError> {
        let response: SignUpResponse = fetch(
            &self.sender,
            Request::post(&self.accounts_url("signUp")).json(&json!({
                "email": email.as_str(),
                "password": password.as_str(),
                "returnSecureToken": false,
            })),
        )
        .await
        .map_err(sign_up_error)?;
        Ok(domain::UserID::from(response.local_id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn session(expires_at: DateTime<Utc>) -> StoredSession {
        StoredSession {
            user_id: "u1".to_string(),
            email: "alice@example.com".to_string(),
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    #[rstest]
    #[case(0, true)]
    #[case(59, true)]
    #[case(60, true)]
    #[case(61, false)]
    #[case(3600, false)]
    fn test_needs_refresh(#[case] remaining: i64, #[case] expected: bool) {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            session(now + TimeDelta::seconds(remaining)).needs_refresh(now),
            expected
        );
    }

    #[rstest]
    #[case("3600", 3600)]
    #[case("120", 120)]
    #[case("", 3600)]
    fn test_expires_at(#[case] expires_in: &str, #[case] expected: i64) {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            expires_at(now, expires_in),
            now + TimeDelta::seconds(expected)
        );
    }

    #[rstest]
    #[case("INVALID_LOGIN_CREDENTIALS")]
    #[case("EMAIL_NOT_FOUND")]
    #[case("INVALID_PASSWORD")]
    fn test_sign_in_error_credentials(#[case] code: &str) {
        assert!(matches!(
            sign_in_error(HttpError::Status {
                status: 400,
                message: code.to_string()
            }),
            domain::ReadError::NotFound
        ));
    }

    #[test]
    fn test_sign_in_error_other() {
        assert!(matches!(
            sign_in_error(HttpError::NoConnection),
            domain::ReadError::Storage(domain::StorageError::NoConnection)
        ));
        assert!(matches!(
            sign_in_error(HttpError::Status {
                status: 400,
                message: "TOO_MANY_ATTEMPTS_TRY_LATER : Try again later".to_string()
            }),
            domain::ReadError::Storage(domain::StorageError::Other(_))
        ));
    }

    #[test]
    fn test_sign_up_error() {
        assert!(matches!(
            sign_up_error(HttpError::Status {
                status: 400,
                message: "EMAIL_EXISTS".to_string()
            }),
            domain::CreateError::Conflict
        ));
        assert!(matches!(
            sign_up_error(HttpError::NoConnection),
            domain::CreateError::Storage(domain::StorageError::NoConnection)
        ));
    }

    #[test]
    fn test_to_session() {
        let stored = session(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        let session = stored.to_session().unwrap();

        assert_eq!(session.user_id, domain::UserID::from("u1"));
        assert_eq!(session.email.as_str(), "alice@example.com");
        assert_eq!(session.id_token, "id");
    }
}
