use crate::{
    CreateError, DeleteError, Email, Password, ReadError, StorageError, UpdateError, UserID,
};

/// The single operator account of the gym.
///
/// Access control is tied to this address both in the application and in the functions service.
pub const ADMIN_EMAIL: &str = "admin@ironlog.app";

#[must_use]
pub fn is_admin_email(email: &str) -> bool {
    email.trim().eq_ignore_ascii_case(ADMIN_EMAIL)
}

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn sign_in(&self, email: Email, password: Password) -> Result<Session, ReadError>;
    async fn get_session(&self) -> Result<Session, ReadError>;
    async fn sign_out(&self) -> Result<(), DeleteError>;
    async fn reset_password(&self, email: Email) -> Result<(), UpdateError>;

    async fn require_admin(&self) -> Result<Session, StorageError> {
        match self.get_session().await {
            Ok(session) if session.is_admin() => Ok(session),
            Ok(_) => Err(StorageError::PermissionDenied),
            Err(ReadError::Storage(err)) => Err(err),
            Err(_) => Err(StorageError::NoSession),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn sign_in(&self, email: Email, password: Password) -> Result<Session, ReadError>;
    async fn initialize_session(&self) -> Result<Session, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
    async fn send_password_reset(&self, email: Email) -> Result<(), UpdateError>;
    async fn create_account(&self, email: Email, password: Password)
    -> Result<UserID, CreateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserID,
    pub email: Email,
    pub id_token: String,
}

impl Session {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        is_admin_email(self.email.as_str())
    }

    /// Personal entities may be changed by their owner, everything may be changed by the admin.
    #[must_use]
    pub fn may_modify(&self, owner: Option<&UserID>) -> bool {
        self.is_admin() || owner.is_some_and(|owner| *owner == self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("admin@ironlog.app", true)]
    #[case(" Admin@IronLog.app ", true)]
    #[case("member@ironlog.app", false)]
    #[case("", false)]
    fn test_is_admin_email(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_admin_email(email), expected);
    }

    #[test]
    fn test_session_may_modify() {
        let member = Session {
            user_id: UserID::from("u1"),
            email: Email::new("member@ironlog.app").unwrap(),
            id_token: String::new(),
        };
        let admin = Session {
            user_id: UserID::from("a1"),
            email: Email::new(ADMIN_EMAIL).unwrap(),
            id_token: String::new(),
        };

        assert!(member.may_modify(Some(&UserID::from("u1"))));
        assert!(!member.may_modify(Some(&UserID::from("u2"))));
        assert!(!member.may_modify(None));
        assert!(admin.may_modify(Some(&UserID::from("u2"))));
        assert!(admin.may_modify(None));
    }
}
