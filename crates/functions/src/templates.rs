//! HTML e-mails. All user-provided text is escaped.

use chrono::{DateTime, Utc};

use crate::mail::Mail;

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn paragraphs(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

fn layout(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\
         <html><body style=\"font-family: sans-serif; color: #222;\">\
         <h2>{}</h2>{content}\
         <p style=\"color: #888; font-size: small;\">IronLog</p>\
         </body></html>",
        escape_html(title)
    )
}

fn timestamp(created_at: Option<DateTime<Utc>>) -> String {
    created_at.map_or_else(String::new, |time| {
        format!(
            "<p style=\"color: #888;\">{}</p>",
            time.format("%Y-%m-%d %H:%M UTC")
        )
    })
}

#[must_use]
pub fn welcome(to: &str, name: &str, password: Option<&str>, app_url: &str) -> Mail {
    let credentials = match password {
        Some(password) => format!(
            "<p>E-mail: <b>{}</b><br>Password: <b>{}</b></p>\
             <p>Please change your password after the first sign-in.</p>",
            escape_html(to),
            escape_html(password)
        ),
        None => format!("<p>Sign in with your e-mail address <b>{}</b>.</p>", escape_html(to)),
    };
    Mail {
        to: to.to_string(),
        subject: "Welcome to IronLog".to_string(),
        html: layout(
            "Welcome to IronLog",
            &format!(
                "<p>Hello {},</p>\
                 <p>an account has been created for you.</p>\
                 {credentials}\
                 <p><a href=\"{}\">Open IronLog</a></p>",
                escape_html(name),
                escape_html(app_url)
            ),
        ),
    }
}

#[must_use]
pub fn notification(
    to: &str,
    user_name: &str,
    message: &str,
    created_at: Option<DateTime<Utc>>,
) -> Mail {
    Mail {
        to: to.to_string(),
        subject: format!("New notification from {user_name}"),
        html: layout(
            "New notification",
            &format!(
                "<p><b>{}</b> wrote:</p><blockquote>{}</blockquote>{}",
                escape_html(user_name),
                paragraphs(message),
                timestamp(created_at)
            ),
        ),
    }
}

#[must_use]
pub fn suggestion(
    to: &str,
    user_name: &str,
    text: &str,
    created_at: Option<DateTime<Utc>>,
) -> Mail {
    Mail {
        to: to.to_string(),
        subject: format!("New suggestion from {user_name}"),
        html: layout(
            "New suggestion",
            &format!(
                "<p><b>{}</b> suggests:</p><blockquote>{}</blockquote>{}",
                escape_html(user_name),
                paragraphs(text),
                timestamp(created_at)
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("plain", "plain")]
    #[case("<script>alert('x')</script>", "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;")]
    #[case("Tom & \"Jerry\"", "Tom &amp; &quot;Jerry&quot;")]
    fn test_escape_html(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(escape_html(text), expected);
    }

    #[test]
    fn test_welcome_with_password() {
        let mail = welcome("bob@example.com", "Bob <b>", Some("secret1"), "https://ironlog.app");

        assert_eq!(mail.to, "bob@example.com");
        assert_eq!(mail.subject, "Welcome to IronLog");
        assert!(mail.html.contains("Hello Bob &lt;b&gt;,"));
        assert!(mail.html.contains("Password: <b>secret1</b>"));
        assert!(mail.html.contains("href=\"https://ironlog.app\""));
    }

    #[test]
    fn test_welcome_without_password() {
        let mail = welcome("bob@example.com", "Bob", None, "https://ironlog.app");

        assert!(!mail.html.contains("Password"));
        assert!(mail.html.contains("<b>bob@example.com</b>"));
    }

    #[test]
    fn test_notification() {
        let mail = notification(
            "gym@example.com",
            "Alice",
            "Treadmill 3 is broken\nPlease fix",
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap()),
        );

        assert_eq!(mail.to, "gym@example.com");
        assert_eq!(mail.subject, "New notification from Alice");
        assert!(mail.html.contains("Treadmill 3 is broken<br>Please fix"));
        assert!(mail.html.contains("2024-03-01 18:30 UTC"));
    }

    #[test]
    fn test_suggestion() {
        let mail = suggestion("gym@example.com", "Alice", "More <kettlebells>", None);

        assert_eq!(mail.subject, "New suggestion from Alice");
        assert!(mail.html.contains("More &lt;kettlebells&gt;"));
    }
}
