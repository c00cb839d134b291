use chrono::{DateTime, Utc};

use crate::{
    CreateError, Email, Name, Password, ReadError, Upload, UpdateError, ValidationError,
};

#[allow(async_fn_in_trait)]
pub trait UserService {
    async fn get_users(&self) -> Result<Vec<User>, ReadError>;
    async fn get_user(&self, id: &UserID) -> Result<User, ReadError>;
    async fn get_or_create_profile(&self) -> Result<User, ReadError>;
    async fn replace_user(&self, user: User) -> Result<User, UpdateError>;
    async fn create_member(&self, member: NewMember) -> Result<User, CreateError>;
    async fn reset_member_password(&self, email: Email, password: &str)
    -> Result<(), UpdateError>;
    async fn set_profile_photo(&self, upload: Upload) -> Result<User, UpdateError>;

    fn validate_user_name(&self, name: &str) -> Result<Name, ValidationError> {
        Name::new(name).map_err(|err| ValidationError::Other(err.into()))
    }

    async fn validate_user_email(
        &self,
        email: &str,
        id: &UserID,
    ) -> Result<Email, ValidationError> {
        let email = Email::new(email).map_err(|err| ValidationError::Other(err.into()))?;
        let users = self.get_users().await?;
        if users.iter().all(|u| u.id == *id || u.email != email) {
            Ok(email)
        } else {
            Err(ValidationError::Conflict("e-mail".to_string()))
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_users(&self) -> Result<Vec<User>, ReadError>;
    async fn read_user(&self, id: &UserID) -> Result<User, ReadError>;
    async fn create_user(&self, user: User) -> Result<User, CreateError>;
    async fn replace_user(&self, user: User) -> Result<User, UpdateError>;
}

document_id!(
    /// The uid assigned by the authentication provider.
    UserID
);

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserID,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.to_string()
        } else {
            name.to_string()
        }
    }
}

/// A gym member created by the admin.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub first_name: Name,
    pub last_name: Name,
    pub email: Email,
    pub password: Password,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Alice", "Smith", "Alice Smith")]
    #[case("Alice", "", "Alice")]
    #[case("", "", "alice@example.com")]
    fn test_display_name(#[case] first_name: &str, #[case] last_name: &str, #[case] expected: &str) {
        let user = User {
            id: UserID::from("u1"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: Email::new("alice@example.com").unwrap(),
            photo_url: None,
            created_at: DateTime::default(),
        };
        assert_eq!(user.display_name(), expected);
    }

    #[test]
    fn test_user_id_nil() {
        assert!(UserID::nil().is_nil());
        assert_eq!(UserID::nil(), UserID::default());
        assert!(!UserID::generate().is_nil());
    }
}
