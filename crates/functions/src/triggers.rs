//! Document triggers: every new notification or suggestion is forwarded by e-mail.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    auth::TokenVerifier, callable::Functions, error::FunctionError, identity::IdentityProvider,
    mail::Mailer, templates,
};

const UNKNOWN_USER: &str = "Unknown user";

/// Delivery of a document creation event, `{"value": {"name", "fields", "createTime"}}`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DocumentEvent {
    pub value: EventDocument,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    pub create_time: Option<DateTime<Utc>>,
}

impl EventDocument {
    #[must_use]
    pub fn string(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)?
            .get("stringValue")?
            .as_str()
            .filter(|value| !value.trim().is_empty())
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.fields
            .get("createdAt")
            .and_then(|value| value.get("timestampValue"))
            .and_then(serde_json::Value::as_str)
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|time| time.with_timezone(&Utc))
            .or(self.create_time)
    }

    fn required(&self, key: &str) -> Result<&str, FunctionError> {
        self.string(key).ok_or_else(|| {
            FunctionError::InvalidArgument(format!("{} has no {key}", self.name))
        })
    }
}

impl<V: TokenVerifier, I: IdentityProvider, M: Mailer> Functions<V, I, M> {
    pub async fn on_notification_created(&self, event: DocumentEvent) -> Result<(), FunctionError> {
        let document = event.value;
        let message = document.required("message")?;
        self.mailer
            .send(templates::notification(
                &self.settings.feedback_recipient,
                document.string("userName").unwrap_or(UNKNOWN_USER),
                message,
                document.created_at(),
            ))
            .await
    }

    pub async fn on_suggestion_created(&self, event: DocumentEvent) -> Result<(), FunctionError> {
        let document = event.value;
        let text = document.required("text")?;
        self.mailer
            .send(templates::suggestion(
                &self.settings.feedback_recipient,
                document.string("userName").unwrap_or(UNKNOWN_USER),
                text,
                document.created_at(),
            ))
            .await
    }
}
