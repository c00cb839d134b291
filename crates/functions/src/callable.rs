//! Callable functions restricted to the admin account.

use axum::http::HeaderMap;
use ironlog_domain as domain;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{Caller, TokenVerifier, bearer_token},
    error::FunctionError,
    identity::IdentityProvider,
    mail::Mailer,
    templates,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub admin_email: String,
    pub feedback_recipient: String,
    pub app_url: String,
    pub trigger_token: String,
}

pub struct Functions<V, I, M> {
    pub verifier: V,
    pub identity: I,
    pub mailer: M,
    pub settings: Settings,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WelcomeEmailRequest {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    pub success: bool,
    pub message: String,
}

fn required(value: &str, message: &str) -> Result<(), FunctionError> {
    if value.trim().is_empty() {
        Err(FunctionError::InvalidArgument(message.to_string()))
    } else {
        Ok(())
    }
}

impl<V: TokenVerifier, I: IdentityProvider, M: Mailer> Functions<V, I, M> {
    /// The verified caller, if the request carries a valid ID token.
    ///
    /// Failures to verify a token at all, such as an unreachable key endpoint, are passed on.
    pub async fn caller(&self, headers: &HeaderMap) -> Result<Option<Caller>, FunctionError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(None);
        };
        match self.verifier.verify(token).await {
            Ok(caller) => Ok(Some(caller)),
            Err(err @ FunctionError::Unauthenticated(_)) => {
                debug!("unauthenticated call: {err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn require_admin<'a>(
        &self,
        caller: Option<&'a Caller>,
        action: &str,
    ) -> Result<&'a Caller, FunctionError> {
        let caller = caller.ok_or_else(|| {
            FunctionError::Unauthenticated(
                "The function must be called while authenticated".to_string(),
            )
        })?;
        if !caller.is_admin(&self.settings.admin_email) {
            return Err(FunctionError::PermissionDenied(format!(
                "Only the admin can {action}"
            )));
        }
        Ok(caller)
    }

    pub async fn reset_user_password(
        &self,
        caller: Option<&Caller>,
        request: ResetPasswordRequest,
    ) -> Result<CallResult, FunctionError> {
        let caller = self.require_admin(caller, "reset passwords")?;
        required(&request.email, "E-mail address is required")?;
        let email = domain::Email::new(&request.email)
            .map_err(|err| FunctionError::InvalidArgument(err.to_string()))?;
        let password = domain::Password::new(&request.new_password)
            .map_err(|err| FunctionError::InvalidArgument(err.to_string()))?;

        let uid = self
            .identity
            .find_uid_by_email(email.as_str())
            .await?
            .ok_or_else(|| {
                FunctionError::InvalidArgument(format!("No account exists for {email}"))
            })?;
        self.identity
            .update_password(&uid, password.as_str())
            .await?;

        info!("password of {uid} reset by {}", caller.uid);
        Ok(CallResult {
            success: true,
            message: format!("Password of {email} has been updated"),
        })
    }

    pub async fn send_welcome_email(
        &self,
        caller: Option<&Caller>,
        request: WelcomeEmailRequest,
    ) -> Result<CallResult, FunctionError> {
        self.require_admin(caller, "send welcome e-mails")?;
        required(&request.email, "E-mail address is required")?;
        required(&request.name, "Name is required")?;
        let email = domain::Email::new(&request.email)
            .map_err(|err| FunctionError::InvalidArgument(err.to_string()))?;

        self.mailer
            .send(templates::welcome(
                email.as_str(),
                request.name.trim(),
                request.password.as_deref().filter(|p| !p.is_empty()),
                &self.settings.app_url,
            ))
            .await?;

        Ok(CallResult {
            success: true,
            message: format!("Welcome e-mail sent to {email}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::tests::fakes::{ADMIN, MEMBER, functions};

    fn reset(email: &str, new_password: &str) -> ResetPasswordRequest {
        ResetPasswordRequest {
            email: email.to_string(),
            new_password: new_password.to_string(),
        }
    }

    fn welcome(email: &str, name: &str) -> WelcomeEmailRequest {
        WelcomeEmailRequest {
            email: email.to_string(),
            name: name.to_string(),
            password: Some("secret1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_reset_user_password() {
        let functions = functions();

        assert_eq!(
            functions
                .reset_user_password(Some(&*ADMIN), reset("Alice@Example.com", "newpass"))
                .await,
            Ok(CallResult {
                success: true,
                message: "Password of alice@example.com has been updated".to_string()
            })
        );
        assert_eq!(
            functions.identity.updates(),
            vec![("uid-alice".to_string(), "newpass".to_string())]
        );
    }

    #[rstest]
    #[case::unauthenticated(
        None,
        reset("alice@example.com", "newpass"),
        FunctionError::Unauthenticated("The function must be called while authenticated".to_string())
    )]
    #[case::not_admin(
        Some(&*MEMBER),
        reset("alice@example.com", "newpass"),
        FunctionError::PermissionDenied("Only the admin can reset passwords".to_string())
    )]
    #[case::missing_email(
        Some(&*ADMIN),
        reset(" ", "newpass"),
        FunctionError::InvalidArgument("E-mail address is required".to_string())
    )]
    #[case::short_password(
        Some(&*ADMIN),
        reset("alice@example.com", "12345"),
        FunctionError::InvalidArgument("Password must be at least 6 characters (5 < 6)".to_string())
    )]
    #[case::unknown_account(
        Some(&*ADMIN),
        reset("carol@example.com", "newpass"),
        FunctionError::InvalidArgument("No account exists for carol@example.com".to_string())
    )]
    #[tokio::test]
    async fn test_reset_user_password_rejected(
        #[case] caller: Option<&Caller>,
        #[case] request: ResetPasswordRequest,
        #[case] expected: FunctionError,
    ) {
        let functions = functions();

        assert_eq!(
            functions.reset_user_password(caller, request).await,
            Err(expected)
        );
        assert!(functions.identity.updates().is_empty());
    }

    #[tokio::test]
    async fn test_reset_user_password_checks_password_before_lookup() {
        let functions = functions();

        let _ = functions
            .reset_user_password(Some(&*ADMIN), reset("alice@example.com", "123"))
            .await;

        assert!(functions.identity.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_send_welcome_email() {
        let functions = functions();

        assert_eq!(
            functions
                .send_welcome_email(Some(&*ADMIN), welcome("bob@example.com", " Bob "))
                .await,
            Ok(CallResult {
                success: true,
                message: "Welcome e-mail sent to bob@example.com".to_string()
            })
        );

        let sent = functions.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "bob@example.com");
        assert!(sent[0].html.contains("Hello Bob,"));
        assert!(sent[0].html.contains("secret1"));
    }

    #[rstest]
    #[case::unauthenticated(None, welcome("bob@example.com", "Bob"), "UNAUTHENTICATED")]
    #[case::not_admin(Some(&*MEMBER), welcome("bob@example.com", "Bob"), "PERMISSION_DENIED")]
    #[case::missing_email(Some(&*ADMIN), welcome("", "Bob"), "INVALID_ARGUMENT")]
    #[case::missing_name(Some(&*ADMIN), welcome("bob@example.com", ""), "INVALID_ARGUMENT")]
    #[tokio::test]
    async fn test_send_welcome_email_rejected(
        #[case] caller: Option<&Caller>,
        #[case] request: WelcomeEmailRequest,
        #[case] expected: &str,
    ) {
        let functions = functions();

        assert_eq!(
            functions
                .send_welcome_email(caller, request)
                .await
                .map_err(|err| err.status()),
            Err(expected)
        );
        assert!(functions.mailer.sent().is_empty());
    }
}
