//! Client of the callable functions, using the `{"data": ...}` request envelope.

use gloo_net::http::Request;
use ironlog_domain as domain;
use serde_json::json;

use crate::{
    auth::bearer,
    firebase::Firebase,
    http::{HttpError, SendRequest, fetch},
};

#[must_use]
pub fn welcome_email_request(email: &domain::WelcomeEmail) -> serde_json::Value {
    let mut data = json!({
        "email": email.email.as_str(),
        "name": email.name,
    });
    if let Some(password) = &email.password {
        data["password"] = json!(password);
    }
    json!({ "data": data })
}

impl<S: SendRequest> Firebase<S> {
    async fn call(&self, function: &str, request: &serde_json::Value) -> Result<(), HttpError> {
        let token = self.id_token().await?;
        fetch::<_, serde_json::Value>(
            &self.sender,
            Request::post(&format!("{}/{function}", self.config.functions_url))
                .header("Authorization", &bearer(&token))
                .json(request),
        )
        .await
        .map(|_| ())
    }
}

impl<S: SendRequest> domain::FunctionsRepository for Firebase<S> {
    async fn reset_user_password(
        &self,
        email: &domain::Email,
        new_password: &domain::Password,
    ) -> Result<(), domain::StorageError> {
        Ok(self
            .call(
                "resetUserPassword",
                &json!({
                    "data": {
                        "email": email.as_str(),
                        "newPassword": new_password.as_str(),
                    }
                }),
            )
            .await?)
    }

    async fn send_welcome_email(
        &self,
        email: domain::WelcomeEmail,
    ) -> Result<(), domain::StorageError> {
        Ok(self
            .call("sendWelcomeEmail", &welcome_email_request(&email))
            .await?)
    }
}
