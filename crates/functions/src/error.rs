use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failure of a callable function, reported to the client in the callable error envelope.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Internal(String),
}

impl FunctionError {
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            FunctionError::Unauthenticated(_) => "UNAUTHENTICATED",
            FunctionError::PermissionDenied(_) => "PERMISSION_DENIED",
            FunctionError::InvalidArgument(_) => "INVALID_ARGUMENT",
            FunctionError::Internal(_) => "INTERNAL",
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            FunctionError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            FunctionError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            FunctionError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            FunctionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal details are logged, the client only learns that the call failed.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        log::error!("{context}: {err}");
        FunctionError::Internal(format!("{context} failed"))
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({
                "error": {
                    "status": self.status(),
                    "message": self.to_string(),
                }
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(FunctionError::Unauthenticated(String::new()), "UNAUTHENTICATED", StatusCode::UNAUTHORIZED)]
    #[case(FunctionError::PermissionDenied(String::new()), "PERMISSION_DENIED", StatusCode::FORBIDDEN)]
    #[case(FunctionError::InvalidArgument(String::new()), "INVALID_ARGUMENT", StatusCode::BAD_REQUEST)]
    #[case(FunctionError::Internal(String::new()), "INTERNAL", StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status(
        #[case] error: FunctionError,
        #[case] status: &str,
        #[case] status_code: StatusCode,
    ) {
        assert_eq!(error.status(), status);
        assert_eq!(error.status_code(), status_code);
    }

    #[test]
    fn test_internal_hides_details() {
        assert_eq!(
            FunctionError::internal("password update", "token expired"),
            FunctionError::Internal("password update failed".to_string())
        );
    }
}
