use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::SessionService;

use crate::{
    DOMAIN_SERVICE, NO_CONNECTION, Route,
    component::{
        element::{Color, Icon, Message},
        form::{FieldValue, FieldValueState, InputField},
    },
    signal_changed_data,
};

#[component]
pub fn Login() -> Element {
    let mut email = use_signal(FieldValue::<domain::Email>::default);
    let mut password = use_signal(FieldValue::<domain::Password>::default);
    let mut is_loading = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut info = use_signal(|| None::<String>);
    let navigator = use_navigator();

    let sign_in = move |_| async move {
        let (Ok(e), Ok(p)) = (email.read().validated.clone(), password.read().validated.clone())
        else {
            return;
        };
        *is_loading.write() = true;
        *info.write() = None;
        match DOMAIN_SERVICE.read().sign_in(e, p).await {
            Ok(_) => {
                *error.write() = None;
                signal_changed_data();
                navigator.push(Route::Home {});
            }
            Err(domain::ReadError::NotFound) => {
                *error.write() = Some("Invalid e-mail address or password".to_string());
            }
            Err(domain::ReadError::Storage(domain::StorageError::NoConnection)) => {
                *NO_CONNECTION.write() = true;
                *error.write() = Some("No connection to server".to_string());
            }
            Err(err) => {
                *error.write() = Some(format!("Sign in failed: {err}"));
            }
        }
        *is_loading.write() = false;
    };

    let reset_password = move |_| async move {
        let Ok(e) = email.read().validated.clone() else {
            *error.write() = Some("Enter your e-mail address to reset your password".to_string());
            return;
        };
        match DOMAIN_SERVICE.read().reset_password(e.clone()).await {
            Ok(()) | Err(domain::UpdateError::NotFound) => {
                *error.write() = None;
                *info.write() = Some(format!("A password reset e-mail has been sent to {e}"));
            }
            Err(err) => {
                *error.write() = Some(format!("Password reset failed: {err}"));
            }
        }
    };

    let can_sign_in = FieldValue::all_valid(&[&*email.read() as &dyn FieldValueState, &*password.read()]);

    rsx! {
        div {
            class: "container px-3 is-max-tablet",
            div {
                class: "block has-text-centered",
                h1 { class: "title is-3", "IronLog" }
                p { class: "subtitle is-6", "Sign in to log your workouts" }
            }
            form {
                onsubmit: move |event: FormEvent| {
                    event.prevent_default();
                    sign_in(())
                },
                InputField {
                    label: "E-mail".to_string(),
                    r#type: "email".to_string(),
                    autocomplete: "username".to_string(),
                    left_icon: rsx! { Icon { name: "envelope" } },
                    value: email.read().input.clone(),
                    error: if let Err(err) = &email.read().validated { err.clone() },
                    has_changed: false,
                    oninput: move |event: FormEvent| {
                        email.write().update(event.value(), domain::Email::new);
                    }
                }
                InputField {
                    label: "Password".to_string(),
                    r#type: "password".to_string(),
                    autocomplete: "current-password".to_string(),
                    left_icon: rsx! { Icon { name: "lock" } },
                    value: password.read().input.clone(),
                    error: if let Err(err) = &password.read().validated { err.clone() },
                    has_changed: false,
                    oninput: move |event: FormEvent| {
                        password.write().update(event.value(), domain::Password::new);
                    }
                }
                if let Some(err) = error() {
                    Message { color: Color::Danger, "{err}" }
                }
                if let Some(text) = info() {
                    Message { color: Color::Success, "{text}" }
                }
                div {
                    class: "field is-grouped is-grouped-centered mt-5",
                    div {
                        class: "control",
                        button {
                            class: "button is-primary",
                            class: if is_loading() { "is-loading" },
                            r#type: "submit",
                            disabled: !can_sign_in,
                            "Sign in"
                        }
                    }
                }
            }
            div {
                class: "block has-text-centered",
                a {
                    class: "is-size-7",
                    onclick: reset_password,
                    "Forgot your password?"
                }
            }
        }
    }
}
