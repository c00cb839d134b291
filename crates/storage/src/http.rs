use gloo_net::http::{Request, Response};
use ironlog_domain as domain;
use serde::{Deserialize, de::DeserializeOwned};

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        request.send().await
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("no connection")]
    NoConnection,
    #[error("no session")]
    NoSession,
    #[error("{status} {message}")]
    Status { status: u16, message: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl HttpError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The error code reported by the service, e.g. `EMAIL_EXISTS`.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            HttpError::Status { message, .. } => message
                .split([' ', ':'])
                .next()
                .filter(|code| !code.is_empty()),
            _ => None,
        }
    }
}

impl From<HttpError> for domain::StorageError {
    fn from(value: HttpError) -> Self {
        match value {
            HttpError::NoConnection => domain::StorageError::NoConnection,
            HttpError::NoSession | HttpError::Status { status: 401, .. } => {
                domain::StorageError::NoSession
            }
            HttpError::Status { status: 403, .. } => domain::StorageError::PermissionDenied,
            HttpError::Status { .. }
            | HttpError::InvalidRequest(_)
            | HttpError::InvalidResponse(_) => domain::StorageError::Other(Box::new(value)),
        }
    }
}

impl From<HttpError> for domain::ReadError {
    fn from(value: HttpError) -> Self {
        match value.status() {
            Some(404) => domain::ReadError::NotFound,
            _ => domain::ReadError::Storage(value.into()),
        }
    }
}

impl From<HttpError> for domain::CreateError {
    fn from(value: HttpError) -> Self {
        match value.status() {
            Some(409) => domain::CreateError::Conflict,
            _ => domain::CreateError::Storage(value.into()),
        }
    }
}

impl From<HttpError> for domain::UpdateError {
    fn from(value: HttpError) -> Self {
        match value.status() {
            Some(404) => domain::UpdateError::NotFound,
            Some(409) => domain::UpdateError::Conflict,
            _ => domain::UpdateError::Storage(value.into()),
        }
    }
}

impl From<HttpError> for domain::DeleteError {
    fn from(value: HttpError) -> Self {
        domain::DeleteError::Storage(value.into())
    }
}

/// Error body of Google APIs and of callable functions.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub async fn fetch<S, T>(
    sender: &S,
    request: Result<Request, gloo_net::Error>,
) -> Result<T, HttpError>
where
    S: SendRequest,
    T: DeserializeOwned,
{
    let response = send(sender, request).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| HttpError::InvalidResponse(err.to_string()))
}

pub async fn fetch_no_content<S: SendRequest>(
    sender: &S,
    request: Result<Request, gloo_net::Error>,
) -> Result<(), HttpError> {
    send(sender, request).await.map(|_| ())
}

async fn send<S: SendRequest>(
    sender: &S,
    request: Result<Request, gloo_net::Error>,
) -> Result<Response, HttpError> {
    let request = request.map_err(|err| HttpError::InvalidRequest(err.to_string()))?;
    let Ok(response) = sender.send_request(request).await else {
        return Err(HttpError::NoConnection);
    };

    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let status_text = response.status_text();
    let message = match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => status_text,
    };

    Err(HttpError::Status { status, message })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn status(status: u16, message: &str) -> HttpError {
        HttpError::Status {
            status,
            message: message.to_string(),
        }
    }

    #[rstest]
    #[case(HttpError::NoConnection, "no connection")]
    #[case(HttpError::NoSession, "no session")]
    #[case(status(401, "Unauthorized"), "no session")]
    #[case(status(403, "Missing or insufficient permissions."), "permission denied")]
    #[case(status(500, "Internal"), "500 Internal")]
    fn test_storage_error_from_http_error(#[case] error: HttpError, #[case] expected: &str) {
        assert_eq!(domain::StorageError::from(error).to_string(), expected);
    }

    #[test]
    fn test_read_error_from_http_error() {
        assert!(matches!(
            domain::ReadError::from(status(404, "NOT_FOUND")),
            domain::ReadError::NotFound
        ));
        assert!(matches!(
            domain::ReadError::from(HttpError::NoConnection),
            domain::ReadError::Storage(domain::StorageError::NoConnection)
        ));
    }

    #[test]
    fn test_create_error_from_http_error() {
        assert!(matches!(
            domain::CreateError::from(status(409, "ALREADY_EXISTS")),
            domain::CreateError::Conflict
        ));
        assert!(matches!(
            domain::CreateError::from(status(403, "PERMISSION_DENIED")),
            domain::CreateError::Storage(domain::StorageError::PermissionDenied)
        ));
    }

    #[test]
    fn test_update_error_from_http_error() {
        assert!(matches!(
            domain::UpdateError::from(status(404, "NOT_FOUND")),
            domain::UpdateError::NotFound
        ));
        assert!(matches!(
            domain::UpdateError::from(HttpError::NoSession),
            domain::UpdateError::Storage(domain::StorageError::NoSession)
        ));
    }

    #[rstest]
    #[case(status(400, "EMAIL_EXISTS"), Some("EMAIL_EXISTS"))]
    #[case(
        status(400, "WEAK_PASSWORD : Password should be at least 6 characters"),
        Some("WEAK_PASSWORD")
    )]
    #[case(status(400, ""), None)]
    #[case(HttpError::NoConnection, None)]
    fn test_code(#[case] error: HttpError, #[case] expected: Option<&str>) {
        assert_eq!(error.code(), expected);
    }
}
