use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::{FeedbackService, SessionService};

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route,
    component::{
        element::{Color, Icon, LoadingPage, Message, Title, read_failure},
        form::{FieldValue, FieldValueState, TextAreaField},
    },
    ensure_session, notify,
};

#[derive(Clone, Copy, PartialEq)]
enum FeedbackKind {
    Notification,
    Suggestion,
}

#[component]
pub fn Feedback() -> Element {
    let session = ensure_session!();

    match &*session.read() {
        Some(Ok(_)) => rsx! {
            FeedbackForm {
                kind: FeedbackKind::Notification,
                title: "Report a problem",
                description: "Let the gym staff know about a broken machine or anything else that needs attention.",
            }
            FeedbackForm {
                kind: FeedbackKind::Suggestion,
                title: "Make a suggestion",
                description: "Ideas for new machines, classes or improvements of the app are welcome.",
            }
        },
        Some(Err(err)) => read_failure(err),
        None => rsx! { LoadingPage {} },
    }
}

#[component]
fn FeedbackForm(kind: FeedbackKind, title: String, description: String) -> Element {
    let mut text = use_signal(FieldValue::<domain::FeedbackText>::default);
    let mut is_loading = use_signal(|| false);
    let mut sent = use_signal(|| false);

    let send = move |_| async move {
        let Ok(feedback) = text.read().validated.clone() else {
            return;
        };
        *is_loading.write() = true;
        let result = match kind {
            FeedbackKind::Notification => DOMAIN_SERVICE
                .read()
                .send_notification(feedback)
                .await
                .map(|_| ()),
            FeedbackKind::Suggestion => DOMAIN_SERVICE
                .read()
                .send_suggestion(feedback)
                .await
                .map(|_| ()),
        };
        *is_loading.write() = false;
        match result {
            Ok(()) => {
                *text.write() = FieldValue::default();
                *sent.write() = true;
            }
            Err(err) => notify(format!("Failed to send message: {err}")),
        }
    };

    rsx! {
        Title { title }
        div {
            class: "box mx-3",
            p { class: "mb-3", "{description}" }
            TextAreaField {
                label: "Message".to_string(),
                value: text.read().input.clone(),
                error: if let Err(err) = &text.read().validated { err.clone() },
                has_changed: false,
                oninput: move |event: FormEvent| {
                    *sent.write() = false;
                    text.write().update(event.value(), |v| DOMAIN_SERVICE.read().validate_feedback_text(v));
                }
            }
            if sent() {
                Message { color: Color::Success, "Thank you! Your message has been sent." }
            }
            div {
                class: "field is-grouped is-grouped-centered",
                div {
                    class: "control",
                    button {
                        class: "button is-primary",
                        class: if is_loading() { "is-loading" },
                        disabled: !text.read().valid(),
                        onclick: send,
                        Icon { name: "paper-plane" }
                        span { "Send" }
                    }
                }
            }
        }
    }
}
