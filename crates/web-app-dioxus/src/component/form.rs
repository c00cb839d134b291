use dioxus::prelude::*;

use ironlog_domain as domain;

#[component]
pub fn InputField(
    label: Option<String>,
    help: Option<String>,
    left_icon: Option<Element>,
    r#type: Option<String>,
    inputmode: Option<String>,
    autocomplete: Option<String>,
    max: Option<String>,
    step: Option<String>,
    value: String,
    error: Option<String>,
    has_changed: bool,
    has_text_right: Option<bool>,
    is_disabled: Option<bool>,
    oninput: EventHandler<FormEvent>,
) -> Element {
    let error = error.and_then(|error| if error.is_empty() { None } else { Some(error) });
    let has_error = error.is_some();
    rsx! {
        div {
            class: "field",
            if let Some(label) = label { label { class: "label", "{label}" } }
            div {
                class: "control",
                class: if left_icon.is_some() { "has-icons-left" },
                input {
                    class: "input",
                    class: if has_error { "is-danger" },
                    class: if has_changed { "is-info" },
                    class: if has_text_right.unwrap_or_default() { "has-text-right" },
                    disabled: if let Some(is_disabled) = is_disabled { is_disabled },
                    r#type: if let Some(r#type) = r#type { r#type } else { "text" },
                    inputmode: if let Some(inputmode) = inputmode { inputmode },
                    autocomplete: if let Some(autocomplete) = autocomplete { autocomplete },
                    max: if let Some(max) = max { max },
                    step: if let Some(step) = step { step },
                    value: "{value}",
                    oninput: move |evt| oninput.call(evt),
                }
                if let Some(ref left_icon) = left_icon {
                    span {
                        class: "icon is-left",
                        {left_icon}
                    }
                }
            }
            if let Some(ref error) = error {
                p { class: "help is-danger", "{error}" }
            } else if let Some(ref help) = help {
                p { class: "help", "{help}" }
            }
        }
    }
}

#[component]
pub fn TextAreaField(
    label: String,
    value: String,
    error: Option<String>,
    has_changed: bool,
    oninput: EventHandler<FormEvent>,
) -> Element {
    let error = error.and_then(|error| if error.is_empty() { None } else { Some(error) });
    rsx! {
        div {
            class: "field",
            label { class: "label", "{label}" }
            div {
                class: "control",
                textarea {
                    class: "textarea",
                    class: if error.is_some() { "is-danger" },
                    class: if has_changed { "is-info" },
                    rows: 4,
                    value: "{value}",
                    oninput: move |evt| oninput.call(evt),
                }
            }
            if let Some(ref error) = error {
                p { class: "help is-danger", "{error}" }
            }
        }
    }
}

#[component]
pub fn SelectField(
    label: String,
    options: Vec<Element>,
    has_changed: bool,
    onchange: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        div {
            class: "field",
            label { class: "label", "{label}" }
            div {
                class: "control",
                div {
                    class: "select is-fullwidth",
                    select {
                        class: if has_changed { "has-text-info" },
                        onchange,
                        for option in options {
                            {option}
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn SelectOption(text: String, value: String, selected: bool) -> Element {
    rsx! {
        option {
            selected,
            value,
            "{text}"
        }
    }
}

/// File picker that hands the chosen file to `onupload`.
#[component]
pub fn FileField(
    label: String,
    accept: String,
    is_loading: bool,
    onupload: EventHandler<domain::Upload>,
) -> Element {
    rsx! {
        div {
            class: "field",
            div {
                class: "file is-centered is-link",
                label {
                    class: "file-label",
                    input {
                        class: "file-input",
                        r#type: "file",
                        accept,
                        disabled: is_loading,
                        onchange: move |event: FormEvent| async move {
                            if let Some(upload) = read_upload(&event).await {
                                onupload.call(upload);
                            }
                        },
                    }
                    span {
                        class: "file-cta",
                        class: if is_loading { "is-loading" },
                        span {
                            class: "file-icon",
                            i { class: "fas fa-upload" }
                        }
                        span { class: "file-label", "{label}" }
                    }
                }
            }
        }
    }
}

async fn read_upload(event: &FormEvent) -> Option<domain::Upload> {
    let file = event.files().into_iter().next()?;
    match file.read_bytes().await {
        Ok(bytes) => Some(domain::Upload {
            file_name: file.name(),
            content_type: file.content_type().unwrap_or_default(),
            bytes: bytes.to_vec(),
        }),
        Err(err) => {
            log::error!("failed to read {}: {err}", file.name());
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue<T> {
    pub input: String,
    pub validated: Result<T, String>,
    pub orig: String,
}

impl<T> Default for FieldValue<T> {
    fn default() -> Self {
        Self {
            input: String::new(),
            validated: Err(String::new()),
            orig: String::new(),
        }
    }
}

impl<T: ToString> FieldValue<T> {
    pub fn new(value: T) -> Self {
        let value_string = value.to_string();
        Self {
            input: value_string.clone(),
            validated: Ok(value),
            orig: value_string,
        }
    }
}

impl<T: ToString> FieldValue<Option<T>> {
    pub fn from_option(value: Option<T>) -> Self {
        if let Some(value) = value {
            let value_string = value.to_string();
            Self {
                input: value_string.clone(),
                validated: Ok(Some(value)),
                orig: value_string,
            }
        } else {
            Self {
                input: String::new(),
                validated: Ok(None),
                orig: String::new(),
            }
        }
    }
}

impl<T> FieldValue<T> {
    /// Sets the input and validates it.
    pub fn update<E: ToString>(&mut self, input: String, validate: impl FnOnce(&str) -> Result<T, E>) {
        self.validated = validate(&input).map_err(|err| err.to_string());
        self.input = input;
    }
}

impl FieldValue<()> {
    pub fn has_valid_changes(values: &[&dyn FieldValueState]) -> bool {
        values.iter().any(|v| v.changed()) && values.iter().all(|v| v.valid())
    }

    pub fn all_valid(values: &[&dyn FieldValueState]) -> bool {
        values.iter().all(|v| v.valid())
    }
}

pub trait FieldValueState {
    fn valid(&self) -> bool;
    fn changed(&self) -> bool;
}

impl<T> FieldValueState for FieldValue<T> {
    fn valid(&self) -> bool {
        self.validated.is_ok()
    }

    fn changed(&self) -> bool {
        self.input.trim() != self.orig.trim()
    }
}
