use crate::{Email, Password, StorageError};

/// Privileged operations executed by the functions service.
#[allow(async_fn_in_trait)]
pub trait FunctionsRepository {
    async fn reset_user_password(
        &self,
        email: &Email,
        new_password: &Password,
    ) -> Result<(), StorageError>;
    async fn send_welcome_email(&self, email: WelcomeEmail) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WelcomeEmail {
    pub email: Email,
    pub name: String,
    pub password: Option<String>,
}
