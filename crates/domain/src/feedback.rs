use chrono::{DateTime, Utc};

use crate::{CreateError, DeleteError, ReadError, UpdateError, UserID, ValidationError};

pub const MAX_FEEDBACK_LENGTH: usize = 2000;

#[allow(async_fn_in_trait)]
pub trait FeedbackService {
    async fn send_notification(&self, message: FeedbackText) -> Result<Notification, CreateError>;
    async fn send_suggestion(&self, text: FeedbackText) -> Result<Suggestion, CreateError>;
    /// All notifications, newest first.
    async fn get_notifications(&self) -> Result<Vec<Notification>, ReadError>;
    /// All suggestions, newest first.
    async fn get_suggestions(&self) -> Result<Vec<Suggestion>, ReadError>;
    async fn mark_notification_read(
        &self,
        id: &NotificationID,
    ) -> Result<NotificationID, UpdateError>;
    async fn mark_suggestion_reviewed(
        &self,
        id: &SuggestionID,
    ) -> Result<SuggestionID, UpdateError>;
    async fn delete_notification(&self, id: &NotificationID)
    -> Result<NotificationID, DeleteError>;
    async fn delete_suggestion(&self, id: &SuggestionID) -> Result<SuggestionID, DeleteError>;

    fn validate_feedback_text(&self, text: &str) -> Result<FeedbackText, ValidationError> {
        FeedbackText::new(text).map_err(|err| ValidationError::Other(err.into()))
    }

    #[must_use]
    fn unread_count(&self, notifications: &[Notification]) -> usize {
        notifications.iter().filter(|n| !n.read).count()
    }
}

#[allow(async_fn_in_trait)]
pub trait FeedbackRepository {
    async fn read_notifications(&self) -> Result<Vec<Notification>, ReadError>;
    async fn create_notification(
        &self,
        notification: Notification,
    ) -> Result<Notification, CreateError>;
    async fn mark_notification_read(
        &self,
        id: &NotificationID,
    ) -> Result<NotificationID, UpdateError>;
    async fn delete_notification(&self, id: &NotificationID)
    -> Result<NotificationID, DeleteError>;
    async fn read_suggestions(&self) -> Result<Vec<Suggestion>, ReadError>;
    async fn create_suggestion(&self, suggestion: Suggestion) -> Result<Suggestion, CreateError>;
    async fn mark_suggestion_reviewed(
        &self,
        id: &SuggestionID,
    ) -> Result<SuggestionID, UpdateError>;
    async fn delete_suggestion(&self, id: &SuggestionID) -> Result<SuggestionID, DeleteError>;
}

document_id!(NotificationID);
document_id!(SuggestionID);

#[derive(derive_more::Deref, derive_more::Display, Debug, Clone, PartialEq, Eq)]
pub struct FeedbackText(String);

impl FeedbackText {
    pub fn new(text: &str) -> Result<Self, FeedbackTextError> {
        let text = text.trim();

        if text.is_empty() {
            return Err(FeedbackTextError::Empty);
        }

        let len = text.chars().count();

        if len > MAX_FEEDBACK_LENGTH {
            return Err(FeedbackTextError::TooLong(len));
        }

        Ok(Self(text.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FeedbackTextError {
    #[error("Message must not be empty")]
    Empty,
    #[error("Message must be 2000 characters or fewer ({0} > 2000)")]
    TooLong(usize),
}

/// A message from a member to the gym, e.g. a broken machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationID,
    pub user_id: UserID,
    pub user_name: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStatus {
    Pending,
    Reviewed,
}

impl SuggestionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Reviewed => "reviewed",
        }
    }
}

impl TryFrom<&str> for SuggestionStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(SuggestionStatus::Pending),
            "reviewed" => Ok(SuggestionStatus::Reviewed),
            _ => Err(format!("unknown suggestion status: {value}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub id: SuggestionID,
    pub user_id: UserID,
    pub user_name: String,
    pub text: String,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("  Treadmill 3 is broken ", Ok(FeedbackText("Treadmill 3 is broken".to_string())))]
    #[case("   ", Err(FeedbackTextError::Empty))]
    fn test_feedback_text_new(
        #[case] text: &str,
        #[case] expected: Result<FeedbackText, FeedbackTextError>,
    ) {
        assert_eq!(FeedbackText::new(text), expected);
    }

    #[test]
    fn test_feedback_text_too_long() {
        assert_eq!(
            FeedbackText::new(&"x".repeat(2001)),
            Err(FeedbackTextError::TooLong(2001))
        );
    }

    #[rstest]
    #[case("pending", Ok(SuggestionStatus::Pending))]
    #[case("reviewed", Ok(SuggestionStatus::Reviewed))]
    #[case("done", Err("unknown suggestion status: done".to_string()))]
    fn test_suggestion_status_try_from(
        #[case] value: &str,
        #[case] expected: Result<SuggestionStatus, String>,
    ) {
        assert_eq!(SuggestionStatus::try_from(value), expected);
    }
}
