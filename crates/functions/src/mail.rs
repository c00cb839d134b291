use std::future::Future;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use log::info;

use crate::error::FunctionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub trait Mailer: Send + Sync + 'static {
    fn send(&self, mail: Mail) -> impl Future<Output = Result<(), FunctionError>> + Send;
}

#[derive(thiserror::Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("invalid message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends HTML mail through an SMTP relay using STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        password: &str,
        from: &str,
    ) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();
        Ok(Self {
            transport,
            from: from.parse()?,
        })
    }

    fn message(&self, mail: &Mail) -> Result<Message, MailError> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(mail.to.parse()?)
            .subject(&mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html.clone())?)
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, mail: Mail) -> Result<(), FunctionError> {
        let message = self
            .message(&mail)
            .map_err(|err| FunctionError::internal("mail composition", err))?;
        self.transport
            .send(message)
            .await
            .map_err(|err| FunctionError::internal("mail delivery", MailError::from(err)))?;
        info!("sent \"{}\" to {}", mail.subject, mail.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // The transport must be dropped inside a runtime.
    #[tokio::test]
    async fn test_message() {
        let mailer = SmtpMailer::new(
            "smtp.example.com",
            587,
            "user",
            "secret",
            "IronLog <noreply@example.com>",
        )
        .unwrap();

        let message = mailer
            .message(&Mail {
                to: "gym@example.com".to_string(),
                subject: "Hello".to_string(),
                html: "<p>Hi</p>".to_string(),
            })
            .unwrap();
        let envelope = message.envelope();

        assert_eq!(
            envelope.from().map(ToString::to_string),
            Some("noreply@example.com".to_string())
        );
        assert_eq!(
            envelope.to().iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["gym@example.com"]
        );
    }

    #[tokio::test]
    async fn test_invalid_sender() {
        assert!(matches!(
            SmtpMailer::new("smtp.example.com", 587, "user", "secret", "not an address"),
            Err(MailError::Address(_))
        ));
    }
}
