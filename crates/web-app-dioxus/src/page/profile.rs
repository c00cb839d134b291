use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::{SessionService, UserService};

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route,
    component::{
        element::{Avatar, Icon, LoadingPage, Title, local_date, read_failure},
        form::{FieldValue, FieldValueState, FileField, InputField},
    },
    ensure_session, notify, signal_changed_data,
};

#[component]
pub fn Profile() -> Element {
    let session = ensure_session!();
    let profile = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_or_create_profile().await
    });

    match (&*session.read(), &*profile.read()) {
        (Some(Ok(_)), Some(Ok(user))) => rsx! {
            ProfileView { user: user.clone() }
        },
        (Some(Err(err)), _) | (_, Some(Err(err))) => read_failure(err),
        _ => rsx! { LoadingPage {} },
    }
}

fn name_field(name: &str) -> FieldValue<domain::Name> {
    FieldValue {
        input: name.to_string(),
        validated: DOMAIN_SERVICE
            .read()
            .validate_user_name(name)
            .map_err(|err| err.to_string()),
        orig: name.to_string(),
    }
}

#[component]
fn ProfileView(user: domain::User) -> Element {
    let mut first_name = use_signal(|| name_field(&user.first_name));
    let mut last_name = use_signal(|| name_field(&user.last_name));
    let mut is_saving = use_signal(|| false);
    let mut is_uploading = use_signal(|| false);

    let save = {
        let user = user.clone();
        move |_| {
            let user = user.clone();
            async move {
                let (Ok(first), Ok(last)) = (
                    first_name.read().validated.clone(),
                    last_name.read().validated.clone(),
                ) else {
                    return;
                };
                *is_saving.write() = true;
                match DOMAIN_SERVICE
                    .read()
                    .replace_user(domain::User {
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                        ..user
                    })
                    .await
                {
                    Ok(user) => {
                        *first_name.write() = name_field(&user.first_name);
                        *last_name.write() = name_field(&user.last_name);
                        signal_changed_data();
                    }
                    Err(err) => notify(format!("Failed to save profile: {err}")),
                }
                *is_saving.write() = false;
            }
        }
    };

    let upload = move |upload: domain::Upload| async move {
        *is_uploading.write() = true;
        match DOMAIN_SERVICE.read().set_profile_photo(upload).await {
            Ok(_) => signal_changed_data(),
            Err(err) => notify(format!("Failed to upload photo: {err}")),
        }
        *is_uploading.write() = false;
    };

    rsx! {
        Title { title: user.display_name() }
        Avatar { url: user.photo_url.clone() }
        div {
            class: "mt-3",
            FileField {
                label: "Change photo",
                accept: "image/*",
                is_loading: is_uploading(),
                onupload: upload,
            }
        }
        div {
            class: "box mx-3",
            InputField {
                label: "E-mail".to_string(),
                left_icon: rsx! { Icon { name: "envelope" } },
                value: user.email.to_string(),
                has_changed: false,
                is_disabled: true,
                oninput: move |_| {},
            }
            div {
                class: "columns",
                div {
                    class: "column",
                    InputField {
                        label: "First name".to_string(),
                        autocomplete: "given-name".to_string(),
                        value: first_name.read().input.clone(),
                        error: if let Err(err) = &first_name.read().validated { err.clone() },
                        has_changed: first_name.read().changed(),
                        oninput: move |event: FormEvent| {
                            first_name.write().update(event.value(), |v| DOMAIN_SERVICE.read().validate_user_name(v));
                        }
                    }
                }
                div {
                    class: "column",
                    InputField {
                        label: "Last name".to_string(),
                        autocomplete: "family-name".to_string(),
                        value: last_name.read().input.clone(),
                        error: if let Err(err) = &last_name.read().validated { err.clone() },
                        has_changed: last_name.read().changed(),
                        oninput: move |event: FormEvent| {
                            last_name.write().update(event.value(), |v| DOMAIN_SERVICE.read().validate_user_name(v));
                        }
                    }
                }
            }
            p {
                class: "is-size-7 has-text-grey mb-3",
                "Member since {local_date(user.created_at)}"
            }
            div {
                class: "field is-grouped is-grouped-centered",
                div {
                    class: "control",
                    button {
                        class: "button is-primary",
                        class: if is_saving() { "is-loading" },
                        disabled: !FieldValue::has_valid_changes(&[&*first_name.read() as &dyn FieldValueState, &*last_name.read()]),
                        onclick: save,
                        Icon { name: "check" }
                        span { "Save" }
                    }
                }
            }
        }
    }
}
