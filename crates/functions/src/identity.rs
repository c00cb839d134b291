use std::future::Future;

use serde::Deserialize;
use serde_json::json;

use crate::error::FunctionError;

/// Privileged account management of the identity provider.
pub trait IdentityProvider: Send + Sync + 'static {
    fn find_uid_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<String>, FunctionError>> + Send;
    fn update_password(
        &self,
        uid: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), FunctionError>> + Send;
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    local_id: String,
}

/// Admin endpoints of the Identity Toolkit API, authorized by a service account access token.
pub struct IdentityToolkitAdmin {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    access_token: String,
}

impl IdentityToolkitAdmin {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        project_id: &str,
        access_token: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/projects/{}/accounts:{method}",
            self.base_url, self.project_id
        )
    }

    async fn post(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(self.url(method))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()
    }
}

impl IdentityProvider for IdentityToolkitAdmin {
    async fn find_uid_by_email(&self, email: &str) -> Result<Option<String>, FunctionError> {
        let response: LookupResponse = self
            .post("lookup", json!({ "email": [email] }))
            .await
            .map_err(|err| FunctionError::internal("user lookup", err))?
            .json()
            .await
            .map_err(|err| FunctionError::internal("user lookup", err))?;
        Ok(response.users.into_iter().next().map(|user| user.local_id))
    }

    async fn update_password(&self, uid: &str, password: &str) -> Result<(), FunctionError> {
        self.post("update", json!({ "localId": uid, "password": password }))
            .await
            .map_err(|err| FunctionError::internal("password update", err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_url() {
        let admin = IdentityToolkitAdmin::new(
            reqwest::Client::new(),
            "https://identitytoolkit.test/v1/",
            "demo-ironlog",
            "token",
        );

        assert_eq!(
            admin.url("lookup"),
            "https://identitytoolkit.test/v1/projects/demo-ironlog/accounts:lookup"
        );
    }
}
