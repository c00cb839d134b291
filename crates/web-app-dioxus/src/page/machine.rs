use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::{ExerciseService, MachineService, SessionService};

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route,
    component::{
        element::{
            DeleteConfirmationDialog, Dialog, FloatingActionButton, Icon, Loading, LoadingPage,
            MediaView, MenuOption, NoData, NotFound, OptionsMenu, Title, read_failure,
        },
        form::{FieldValue, FieldValueState, FileField, InputField, TextAreaField},
    },
    ensure_session, notify,
    page::machines::{MachineDialog, MachineForm},
    signal_changed_data,
};

const MEDIA_TYPES: &str = "image/*,video/*";

#[component]
pub fn Machine(id: String) -> Element {
    let session = ensure_session!();
    let machines = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_machines().await
    });
    let machine_id = domain::MachineID::from(id);

    match (&*session.read(), &*machines.read()) {
        (Some(Ok(session)), Some(Ok(machines))) => {
            match machines.iter().find(|m| m.id == machine_id) {
                Some(machine) => rsx! {
                    MachineDetails { machine: machine.clone(), session: session.clone() }
                    Exercises { machine: machine.clone(), session: session.clone() }
                },
                None => rsx! { NotFound { element: "Machine" } },
            }
        }
        (Some(Err(err)), _) | (_, Some(Err(err))) => read_failure(err),
        _ => rsx! { LoadingPage {} },
    }
}

#[derive(Clone, PartialEq)]
enum MachineDialogState {
    None,
    Options,
    Edit(MachineForm),
    Delete,
}

#[component]
fn MachineDetails(machine: domain::Machine, session: domain::Session) -> Element {
    let mut dialog = use_signal(|| MachineDialogState::None);
    let mut is_loading = use_signal(|| false);
    let may_modify = session.may_modify(machine.ownership.owner());

    let upload = {
        let id = machine.id.clone();
        move |upload: domain::Upload| {
            let id = id.clone();
            async move {
                *is_loading.write() = true;
                match DOMAIN_SERVICE.read().set_machine_media(&id, upload).await {
                    Ok(_) => signal_changed_data(),
                    Err(err) => notify(format!("Failed to upload media: {err}")),
                }
                *is_loading.write() = false;
            }
        }
    };

    let delete = {
        let id = machine.id.clone();
        move |_| {
            let id = id.clone();
            async move {
                *is_loading.write() = true;
                match DOMAIN_SERVICE.read().delete_machine(&id).await {
                    Ok(_) => {
                        signal_changed_data();
                        navigator().replace(Route::Machines { search: String::new() });
                    }
                    Err(err) => notify(format!("Failed to delete machine: {err}")),
                }
                *is_loading.write() = false;
                *dialog.write() = MachineDialogState::None;
            }
        }
    };

    let media = machine.media_url.clone().map(|url| {
        let kind = domain::MediaKind::detect("", &url).unwrap_or(domain::MediaKind::Image);
        (url, kind)
    });

    rsx! {
        div {
            class: "is-flex is-justify-content-center is-align-items-center",
            Title { title: machine.label(), class: "mb-0" }
            if may_modify {
                a {
                    class: "mx-2",
                    onclick: move |_| *dialog.write() = MachineDialogState::Options,
                    Icon { name: "ellipsis-vertical" }
                }
            }
        }
        div {
            class: "block has-text-centered",
            if let Some(category) = &machine.category {
                span { class: "tag is-link is-light mx-1", "{category}" }
            }
            if !machine.ownership.is_global() {
                span { class: "tag is-info is-light mx-1", "personal" }
            }
        }
        if let Some((url, kind)) = media {
            MediaView { url, kind }
        }
        if !machine.description.is_empty() {
            div {
                class: "block mx-3",
                style: "white-space:pre-line",
                "{machine.description}"
            }
        }
        if may_modify {
            FileField {
                label: if machine.media_url.is_some() { "Replace photo or video" } else { "Add photo or video" },
                accept: MEDIA_TYPES,
                is_loading: is_loading(),
                onupload: upload,
            }
        }

        match dialog() {
            MachineDialogState::None => rsx! {},
            MachineDialogState::Options => {
                let edit = MachineForm::from_machine(&machine);
                rsx! {
                    OptionsMenu {
                        options: vec![rsx! {
                            MenuOption {
                                icon: "edit".to_string(),
                                text: "Edit machine".to_string(),
                                onclick: move |_| *dialog.write() = MachineDialogState::Edit(edit.clone()),
                            }
                            MenuOption {
                                icon: "times".to_string(),
                                text: "Delete machine".to_string(),
                                onclick: move |_| *dialog.write() = MachineDialogState::Delete,
                            }
                        }],
                        close_event: move |_| *dialog.write() = MachineDialogState::None,
                    }
                }
            }
            MachineDialogState::Edit(form) => {
                let original = machine.clone();
                rsx! {
                    MachineDialog {
                        form,
                        title: "Edit machine",
                        may_be_global: false,
                        onchange: move |f| *dialog.write() = MachineDialogState::Edit(f),
                        close: move |()| *dialog.write() = MachineDialogState::None,
                        save: move |f: MachineForm| {
                            let original = original.clone();
                            async move {
                                let Some(machine) = f.apply(&original) else {
                                    return;
                                };
                                match DOMAIN_SERVICE.read().replace_machine(machine).await {
                                    Ok(_) => {
                                        *dialog.write() = MachineDialogState::None;
                                        signal_changed_data();
                                    }
                                    Err(err) => notify(format!("Failed to edit machine: {err}")),
                                }
                            }
                        },
                    }
                }
            }
            MachineDialogState::Delete => rsx! {
                DeleteConfirmationDialog {
                    element_type: "machine",
                    element_name: rsx! { "{machine.name}" },
                    consequence: "The machine and its exercises will be permanently deleted and removed from all training tables. Logged workouts are kept.",
                    delete_event: delete,
                    cancel_event: move |_| *dialog.write() = MachineDialogState::None,
                    is_loading: is_loading(),
                }
            },
        }
    }
}

#[derive(Clone, PartialEq)]
struct ExerciseForm {
    id: domain::ExerciseID,
    name: FieldValue<domain::Name>,
    description: String,
    global: bool,
}

impl ExerciseForm {
    fn new(global: bool) -> Self {
        Self {
            id: domain::ExerciseID::nil(),
            name: FieldValue::default(),
            description: String::new(),
            global,
        }
    }

    fn from_exercise(exercise: &domain::Exercise) -> Self {
        Self {
            id: exercise.id.clone(),
            name: FieldValue::new(exercise.name.clone()),
            description: exercise.description.clone(),
            global: exercise.ownership.is_global(),
        }
    }
}

#[derive(Clone, PartialEq)]
enum ExerciseDialog {
    None,
    Options(domain::Exercise),
    Add(ExerciseForm),
    Edit(domain::Exercise, ExerciseForm),
    Delete(domain::Exercise),
}

#[component]
fn Exercises(machine: domain::Machine, session: domain::Session) -> Element {
    let machine_id = machine.id.clone();
    let exercises = use_resource(use_reactive!(|machine_id| async move {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE
            .read()
            .get_exercises_for_machine(&machine_id)
            .await
    }));
    let mut dialog = use_signal(|| ExerciseDialog::None);
    let mut uploading = use_signal(|| None::<domain::ExerciseID>);
    let is_admin = session.is_admin();

    let exercises = match &*exercises.read() {
        Some(Ok(exercises)) => domain::sort_exercises(exercises.clone()),
        Some(Err(err)) => return read_failure(err),
        None => return rsx! { Loading {} },
    };

    rsx! {
        Title { title: "Exercises", class: "mt-5" }
        if exercises.is_empty() {
            NoData {}
        }
        for exercise in exercises {
            {
                let may_modify = session.may_modify(exercise.ownership.owner());
                let options = exercise.clone();
                let id = exercise.id.clone();
                rsx! {
                    div {
                        class: "box mx-3",
                        div {
                            class: "is-flex is-justify-content-space-between",
                            h2 { class: "subtitle is-5 mb-2", "{exercise.name}" }
                            if may_modify {
                                a {
                                    onclick: move |_| *dialog.write() = ExerciseDialog::Options(options.clone()),
                                    Icon { name: "ellipsis-vertical" }
                                }
                            }
                        }
                        if let Some(media) = &exercise.media {
                            MediaView { url: media.url.clone(), kind: media.kind }
                        }
                        if !exercise.description.is_empty() {
                            p { style: "white-space:pre-line", "{exercise.description}" }
                        }
                        if may_modify {
                            FileField {
                                label: if exercise.media.is_some() { "Replace photo or video" } else { "Add photo or video" },
                                accept: MEDIA_TYPES,
                                is_loading: uploading().as_ref() == Some(&exercise.id),
                                onupload: move |upload: domain::Upload| {
                                    let id = id.clone();
                                    async move {
                                        *uploading.write() = Some(id.clone());
                                        match DOMAIN_SERVICE.read().set_exercise_media(&id, upload).await {
                                            Ok(_) => signal_changed_data(),
                                            Err(err) => notify(format!("Failed to upload media: {err}")),
                                        }
                                        *uploading.write() = None;
                                    }
                                },
                            }
                        }
                    }
                }
            }
        }
        ExerciseDialogView { dialog, machine_id: machine.id.clone(), is_admin }
        FloatingActionButton {
            icon: "plus".to_string(),
            onclick: move |_| *dialog.write() = ExerciseDialog::Add(ExerciseForm::new(is_admin)),
        }
    }
}

#[component]
fn ExerciseDialogView(
    dialog: Signal<ExerciseDialog>,
    machine_id: domain::MachineID,
    is_admin: bool,
) -> Element {
    let mut dialog = dialog;
    let mut is_loading = use_signal(|| false);
    let close = move |_| *dialog.write() = ExerciseDialog::None;

    let save = {
        let machine_id = machine_id.clone();
        move |_| {
            let machine_id = machine_id.clone();
            async move {
                let current = dialog.read().clone();
                let (ExerciseDialog::Add(form) | ExerciseDialog::Edit(_, form)) = &current else {
                    return;
                };
                let Ok(name) = form.name.validated.clone() else {
                    return;
                };
                let description = form.description.trim().to_string();
                let global = form.global;
                *is_loading.write() = true;
                let result = if let ExerciseDialog::Edit(exercise, _) = current {
                    DOMAIN_SERVICE
                        .read()
                        .replace_exercise(domain::Exercise {
                            name,
                            description,
                            ..exercise
                        })
                        .await
                        .map_err(|err| format!("Failed to edit exercise: {err}"))
                } else {
                    DOMAIN_SERVICE
                        .read()
                        .create_exercise(domain::NewExercise {
                            name,
                            machine_id,
                            description,
                            global,
                        })
                        .await
                        .map_err(|err| format!("Failed to add exercise: {err}"))
                };
                *is_loading.write() = false;
                match result {
                    Ok(_) => {
                        *dialog.write() = ExerciseDialog::None;
                        signal_changed_data();
                    }
                    Err(message) => notify(message),
                }
            }
        }
    };

    let delete = move |_| async move {
        let ExerciseDialog::Delete(exercise) = dialog.read().clone() else {
            return;
        };
        *is_loading.write() = true;
        match DOMAIN_SERVICE.read().delete_exercise(&exercise.id).await {
            Ok(_) => signal_changed_data(),
            Err(err) => notify(format!("Failed to delete exercise: {err}")),
        }
        *is_loading.write() = false;
        *dialog.write() = ExerciseDialog::None;
    };

    let form = match dialog() {
        ExerciseDialog::None => return rsx! {},
        ExerciseDialog::Options(exercise) => {
            let edit = exercise.clone();
            return rsx! {
                OptionsMenu {
                    options: vec![rsx! {
                        MenuOption {
                            icon: "edit".to_string(),
                            text: "Edit exercise".to_string(),
                            onclick: move |_| {
                                *dialog.write() = ExerciseDialog::Edit(edit.clone(), ExerciseForm::from_exercise(&edit));
                            }
                        }
                        MenuOption {
                            icon: "times".to_string(),
                            text: "Delete exercise".to_string(),
                            onclick: move |_| *dialog.write() = ExerciseDialog::Delete(exercise.clone()),
                        }
                    }],
                    close_event: close,
                }
            };
        }
        ExerciseDialog::Delete(exercise) => {
            return rsx! {
                DeleteConfirmationDialog {
                    element_type: "exercise",
                    element_name: rsx! { "{exercise.name}" },
                    consequence: "The exercise will be permanently deleted and removed from all training tables.",
                    delete_event: delete,
                    cancel_event: close,
                    is_loading: is_loading(),
                }
            };
        }
        ExerciseDialog::Add(form) | ExerciseDialog::Edit(_, form) => form,
    };
    let is_new = form.id.is_nil();

    rsx! {
        Dialog {
            title: rsx! { if is_new { "Add exercise" } else { "Edit exercise" } },
            close_event: close,
            InputField {
                label: "Name".to_string(),
                value: form.name.input.clone(),
                error: if let Err(err) = &form.name.validated { err.clone() },
                has_changed: form.name.changed(),
                oninput: {
                    let machine_id = machine_id.clone();
                    let id = form.id.clone();
                    move |event: FormEvent| {
                        let machine_id = machine_id.clone();
                        let id = id.clone();
                        async move {
                            let input = event.value();
                            let validated = DOMAIN_SERVICE
                                .read()
                                .validate_exercise_name(&input, &machine_id, &id)
                                .await
                                .map_err(|err| err.to_string());
                            match &mut *dialog.write() {
                                ExerciseDialog::Add(form) | ExerciseDialog::Edit(_, form) => {
                                    form.name.input = input;
                                    form.name.validated = validated;
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
            TextAreaField {
                label: "Description".to_string(),
                value: form.description.clone(),
                has_changed: false,
                oninput: move |event: FormEvent| {
                    match &mut *dialog.write() {
                        ExerciseDialog::Add(form) | ExerciseDialog::Edit(_, form) => {
                            form.description = event.value();
                        }
                        _ => {}
                    }
                }
            }
            if is_admin && is_new {
                div {
                    class: "field",
                    label {
                        class: "checkbox",
                        input {
                            r#type: "checkbox",
                            checked: form.global,
                            onchange: move |_| {
                                if let ExerciseDialog::Add(form) = &mut *dialog.write() {
                                    form.global = !form.global;
                                }
                            }
                        }
                        " Visible to all members"
                    }
                }
            }
            div {
                class: "field is-grouped is-grouped-centered",
                div {
                    class: "control",
                    onclick: close,
                    button { class: "button is-light is-soft", "Cancel" }
                }
                div {
                    class: "control",
                    button {
                        class: "button is-primary",
                        class: if is_loading() { "is-loading" },
                        disabled: !form.name.valid(),
                        onclick: save,
                        Icon { name: "check" }
                        span { "Save" }
                    }
                }
            }
        }
    }
}
