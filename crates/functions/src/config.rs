use std::net::SocketAddr;

use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::callable::Settings;

pub const DEFAULT_JWK_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Functions service for the IronLog web application.
///
/// Every option can also be set by an environment variable or a `.env` file.
#[derive(Parser, Clone)]
#[command(version, about)]
pub struct Config {
    #[arg(long, env = "IRONLOG_LISTEN", default_value = "127.0.0.1:8081")]
    pub listen: SocketAddr,

    #[arg(long, env = "IRONLOG_FIREBASE_PROJECT_ID")]
    pub project_id: String,

    /// Only this account may call the admin functions
    #[arg(long, env = "IRONLOG_ADMIN_EMAIL", default_value = ironlog_domain::ADMIN_EMAIL)]
    pub admin_email: String,

    /// Receives the e-mails about new notifications and suggestions
    #[arg(long, env = "IRONLOG_FEEDBACK_RECIPIENT")]
    pub feedback_recipient: String,

    /// Linked from the welcome e-mail
    #[arg(long, env = "IRONLOG_APP_URL", default_value = "http://localhost:8080")]
    pub app_url: String,

    #[arg(long, env = "IRONLOG_SMTP_HOST")]
    pub smtp_host: String,

    #[arg(long, env = "IRONLOG_SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    #[arg(long, env = "IRONLOG_SMTP_USER")]
    pub smtp_user: String,

    #[arg(long, env = "IRONLOG_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: String,

    /// Sender of all e-mails, e.g. `IronLog <noreply@example.com>`
    #[arg(long, env = "IRONLOG_MAIL_FROM")]
    pub mail_from: String,

    #[arg(long, env = "IRONLOG_IDENTITY_TOOLKIT_URL", default_value = DEFAULT_IDENTITY_TOOLKIT_URL)]
    pub identity_toolkit_url: String,

    /// OAuth access token of a service account allowed to manage users
    #[arg(long, env = "IRONLOG_ADMIN_ACCESS_TOKEN", hide_env_values = true)]
    pub admin_access_token: String,

    #[arg(long, env = "IRONLOG_JWK_URL", default_value = DEFAULT_JWK_URL)]
    pub jwk_url: String,

    /// Bearer token expected on trigger requests
    #[arg(long, env = "IRONLOG_TRIGGER_TOKEN", hide_env_values = true)]
    pub trigger_token: String,

    /// Allowed origins of callable requests, any origin if unset
    #[arg(long, env = "IRONLOG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl Config {
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            admin_email: self.admin_email.clone(),
            feedback_recipient: self.feedback_recipient.clone(),
            app_url: self.app_url.clone(),
            trigger_token: self.trigger_token.clone(),
        }
    }

    #[must_use]
    pub fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
        let origins = self
            .cors_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
            .collect::<Vec<_>>();
        if origins.is_empty() {
            layer.allow_origin(Any)
        } else {
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const REQUIRED: [&str; 15] = [
        "ironlog-functions",
        "--project-id",
        "demo-ironlog",
        "--feedback-recipient",
        "gym@example.com",
        "--smtp-host",
        "smtp.example.com",
        "--smtp-user",
        "mailer",
        "--smtp-password",
        "secret",
        "--mail-from",
        "noreply@example.com",
        "--trigger-token",
        "trigger-secret",
    ];

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(
            REQUIRED
                .iter()
                .copied()
                .chain(["--admin-access-token", "token"]),
        )
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:8081".parse().unwrap());
        assert_eq!(config.admin_email, ironlog_domain::ADMIN_EMAIL);
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.jwk_url, DEFAULT_JWK_URL);
        assert_eq!(config.trigger_token, "trigger-secret");
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_trigger_token_required() {
        assert!(
            Config::try_parse_from(
                REQUIRED[..13]
                    .iter()
                    .copied()
                    .chain(["--admin-access-token", "token"]),
            )
            .is_err()
        );
    }

    #[test]
    fn test_settings() {
        let config = Config::try_parse_from(REQUIRED.iter().copied().chain([
            "--admin-access-token",
            "token",
            "--admin-email",
            "coach@example.com",
            "--cors-origins",
            "https://a.example,https://b.example",
        ]))
        .unwrap();

        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(
            config.settings(),
            Settings {
                admin_email: "coach@example.com".to_string(),
                feedback_recipient: "gym@example.com".to_string(),
                app_url: "http://localhost:8080".to_string(),
                trigger_token: "trigger-secret".to_string(),
            }
        );
    }
}
