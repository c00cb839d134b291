//! HTTP interface: callables use the `{"data": ...}` / `{"result": ...}` protocol.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    auth::{TokenVerifier, bearer_token},
    callable::{CallResult, Functions},
    error::FunctionError,
    identity::IdentityProvider,
    mail::Mailer,
    triggers::DocumentEvent,
};

#[derive(Deserialize)]
struct CallableRequest<T> {
    #[serde(default)]
    data: T,
}

#[derive(Serialize)]
struct CallableResponse<T> {
    result: T,
}

/// Unreadable data is treated as empty, so that the checks of the function report what is missing.
fn callable_data<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    if body.is_empty() {
        return T::default();
    }
    match serde_json::from_slice::<CallableRequest<T>>(body) {
        Ok(request) => request.data,
        Err(err) => {
            warn!("invalid callable request: {err}");
            T::default()
        }
    }
}

pub fn router<V, I, M>(functions: Arc<Functions<V, I, M>>) -> Router
where
    V: TokenVerifier,
    I: IdentityProvider,
    M: Mailer,
{
    Router::new()
        .route("/health", get(health))
        .route("/resetUserPassword", post(reset_user_password::<V, I, M>))
        .route("/sendWelcomeEmail", post(send_welcome_email::<V, I, M>))
        .route(
            "/triggers/notifications",
            post(notification_created::<V, I, M>),
        )
        .route("/triggers/suggestions", post(suggestion_created::<V, I, M>))
        .with_state(functions)
}

async fn health() -> &'static str {
    "OK"
}

async fn reset_user_password<V, I, M>(
    State(functions): State<Arc<Functions<V, I, M>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallableResponse<CallResult>>, FunctionError>
where
    V: TokenVerifier,
    I: IdentityProvider,
    M: Mailer,
{
    let caller = functions.caller(&headers).await?;
    let result = functions
        .reset_user_password(caller.as_ref(), callable_data(&body))
        .await?;
    Ok(Json(CallableResponse { result }))
}

async fn send_welcome_email<V, I, M>(
    State(functions): State<Arc<Functions<V, I, M>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallableResponse<CallResult>>, FunctionError>
where
    V: TokenVerifier,
    I: IdentityProvider,
    M: Mailer,
{
    let caller = functions.caller(&headers).await?;
    let result = functions
        .send_welcome_email(caller.as_ref(), callable_data(&body))
        .await?;
    Ok(Json(CallableResponse { result }))
}

fn document_event<V, I, M>(
    functions: &Functions<V, I, M>,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<DocumentEvent, FunctionError> {
    let expected = functions.settings.trigger_token.as_str();
    if expected.is_empty() || bearer_token(headers) != Some(expected) {
        return Err(FunctionError::Unauthenticated(
            "Invalid trigger token".to_string(),
        ));
    }
    serde_json::from_slice(body)
        .map_err(|err| FunctionError::InvalidArgument(format!("Invalid event: {err}")))
}

async fn notification_created<V, I, M>(
    State(functions): State<Arc<Functions<V, I, M>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, FunctionError>
where
    V: TokenVerifier,
    I: IdentityProvider,
    M: Mailer,
{
    let event = document_event(&functions, &headers, &body)?;
    functions.on_notification_created(event).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn suggestion_created<V, I, M>(
    State(functions): State<Arc<Functions<V, I, M>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, FunctionError>
where
    V: TokenVerifier,
    I: IdentityProvider,
    M: Mailer,
{
    let event = document_event(&functions, &headers, &body)?;
    functions.on_suggestion_created(event).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        Settings,
        tests::fakes::{
            FakeIdentity, FakeMailer, FakeVerifier, TRIGGER_TOKEN, UNVERIFIABLE_TOKEN, functions,
            settings,
        },
    };

    type TestFunctions = Arc<Functions<FakeVerifier, FakeIdentity, FakeMailer>>;

    async fn post_json(
        functions: &TestFunctions,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json");
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let response = router(functions.clone())
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(json!(null));
        (status, json)
    }

    fn trigger_event() -> serde_json::Value {
        json!({"value": {
            "name": "projects/demo/databases/(default)/documents/notifications/n1",
            "fields": {
                "userName": {"stringValue": "Alice"},
                "message": {"stringValue": "Treadmill 3 is broken"},
                "text": {"stringValue": "More plates"}
            }
        }})
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(Arc::new(functions()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reset_user_password() {
        let functions = Arc::new(functions());

        assert_eq!(
            post_json(
                &functions,
                "/resetUserPassword",
                Some("admin"),
                json!({"data": {"email": "alice@example.com", "newPassword": "newpass"}}),
            )
            .await,
            (
                StatusCode::OK,
                json!({"result": {
                    "success": true,
                    "message": "Password of alice@example.com has been updated"
                }})
            )
        );
        assert_eq!(functions.identity.updates().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_user_password_unauthenticated() {
        let functions = Arc::new(functions());

        assert_eq!(
            post_json(
                &functions,
                "/resetUserPassword",
                Some("forged"),
                json!({"data": {"email": "alice@example.com", "newPassword": "newpass"}}),
            )
            .await,
            (
                StatusCode::UNAUTHORIZED,
                json!({"error": {
                    "status": "UNAUTHENTICATED",
                    "message": "The function must be called while authenticated"
                }})
            )
        );
    }

    #[tokio::test]
    async fn test_caller_verification_failure() {
        let functions = Arc::new(functions());

        let (status, body) = post_json(
            &functions,
            "/resetUserPassword",
            Some(UNVERIFIABLE_TOKEN),
            json!({"data": {"email": "alice@example.com", "newPassword": "newpass"}}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["status"], "INTERNAL");
        assert!(functions.identity.updates().is_empty());
    }

    #[tokio::test]
    async fn test_send_welcome_email_not_admin() {
        let functions = Arc::new(functions());

        let (status, body) = post_json(
            &functions,
            "/sendWelcomeEmail",
            Some("member"),
            json!({"data": {"email": "bob@example.com", "name": "Bob"}}),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["status"], "PERMISSION_DENIED");
        assert!(functions.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_welcome_email_invalid_body() {
        let functions = Arc::new(functions());

        let (status, body) = post_json(
            &functions,
            "/sendWelcomeEmail",
            Some("admin"),
            json!({"data": "bob@example.com"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "E-mail address is required");
    }

    #[tokio::test]
    async fn test_suggestion_trigger() {
        let functions = Arc::new(functions());

        let (status, _) = post_json(
            &functions,
            "/triggers/suggestions",
            Some(TRIGGER_TOKEN),
            json!({"value": {
                "name": "projects/demo/databases/(default)/documents/suggestions/s1",
                "fields": {
                    "userName": {"stringValue": "Alice"},
                    "text": {"stringValue": "More plates"}
                }
            }}),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(functions.mailer.sent()[0].to, "gym@example.com");
    }

    #[rstest]
    #[case::missing("/triggers/notifications", None)]
    #[case::wrong("/triggers/notifications", Some("forged"))]
    #[case::missing_suggestion("/triggers/suggestions", None)]
    #[case::id_token("/triggers/suggestions", Some("admin"))]
    #[tokio::test]
    async fn test_trigger_unauthorized(#[case] uri: &str, #[case] token: Option<&str>) {
        let functions = Arc::new(functions());

        let (status, body) = post_json(&functions, uri, token, trigger_event()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["status"], "UNAUTHENTICATED");
        assert!(functions.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_trigger_without_configured_token() {
        let functions = Arc::new(Functions {
            settings: Settings {
                trigger_token: String::new(),
                ..settings()
            },
            ..functions()
        });

        let (status, _) =
            post_json(&functions, "/triggers/notifications", Some(""), trigger_event()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(functions.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_trigger_token() {
        let functions = Arc::new(functions());

        let (status, _) = post_json(
            &functions,
            "/triggers/notifications",
            Some(TRIGGER_TOKEN),
            trigger_event(),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(functions.mailer.sent().len(), 1);
    }
}
