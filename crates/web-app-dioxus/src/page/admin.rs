use std::collections::HashMap;

use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::{
    AssignedTableService, CategoryService, ConfigService, ExerciseService, FeedbackService,
    MachineService, PostService, SessionService, UserService, WorkoutService,
};
use ironlog_web_app as web_app;
use ironlog_web_app::log::Service;

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route, WEB_APP_SERVICE,
    component::{
        element::{
            Color, Container, DeleteConfirmationDialog, Dialog, Error, Icon, Loading, LoadingPage,
            MenuOption, Message, NoData, OptionsMenu, Table, Title, local_date, read_failure,
        },
        form::{
            FieldValue, FieldValueState, InputField, SelectField, SelectOption, TextAreaField,
        },
    },
    ensure_admin, ensure_session, notify, signal_changed_data,
};

#[component]
pub fn Admin() -> Element {
    let session = ensure_admin!();

    match &*session.read() {
        Some(Ok(session)) if session.is_admin() => rsx! {
            Users {}
            Tables {}
            GlobalMachines {}
            Categories {}
            FeedbackInbox {}
            Posts {}
            GymConfig {}
            AppUpdate {}
            Log {}
        },
        Some(Ok(_)) => rsx! {},
        Some(Err(err)) => read_failure(err),
        None => rsx! { LoadingPage {} },
    }
}

#[component]
fn ActionButtons(
    is_loading: bool,
    is_valid: bool,
    close: EventHandler<MouseEvent>,
    save: EventHandler<MouseEvent>,
) -> Element {
    rsx! {
        div {
            class: "field is-grouped is-grouped-centered",
            div {
                class: "control",
                onclick: move |evt| close.call(evt),
                button { class: "button is-light is-soft", "Cancel" }
            }
            div {
                class: "control",
                button {
                    class: "button is-primary",
                    class: if is_loading { "is-loading" },
                    disabled: !is_valid,
                    onclick: move |evt| save.call(evt),
                    "Save"
                }
            }
        }
    }
}

#[derive(Clone, PartialEq)]
enum UserDialog {
    None,
    Options(domain::User),
    Add {
        first_name: FieldValue<domain::Name>,
        last_name: FieldValue<domain::Name>,
        email: FieldValue<domain::Email>,
        password: FieldValue<domain::Password>,
    },
    ResetPassword {
        user: domain::User,
        password: FieldValue<domain::Password>,
    },
}

#[component]
fn Users() -> Element {
    let users = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_users().await
    });
    let mut dialog = use_signal(|| UserDialog::None);
    let mut is_loading = use_signal(|| false);
    let close = move |_| *dialog.write() = UserDialog::None;

    let save = move |_| async move {
        let current = dialog.read().clone();
        *is_loading.write() = true;
        let result = match current {
            UserDialog::Add { first_name, last_name, email, password } => {
                let (Ok(first_name), Ok(last_name), Ok(email), Ok(password)) = (
                    first_name.validated,
                    last_name.validated,
                    email.validated,
                    password.validated,
                ) else {
                    *is_loading.write() = false;
                    return;
                };
                DOMAIN_SERVICE
                    .read()
                    .create_member(domain::NewMember { first_name, last_name, email, password })
                    .await
                    .map(|_| ())
                    .map_err(|err| format!("Failed to add member: {err}"))
            }
            UserDialog::ResetPassword { user, password } => DOMAIN_SERVICE
                .read()
                .reset_member_password(user.email.clone(), &password.input)
                .await
                .map_err(|err| format!("Failed to reset password: {err}")),
            UserDialog::None | UserDialog::Options(_) => Ok(()),
        };
        *is_loading.write() = false;
        match result {
            Ok(()) => {
                *dialog.write() = UserDialog::None;
                signal_changed_data();
            }
            Err(message) => notify(message),
        }
    };

    rsx! {
        Title { title: "Members" }
        match &*users.read() {
            Some(Ok(users)) => rsx! {
                Table {
                    head: vec![rsx! { "Name" }, rsx! { "E-mail" }, rsx! { "Since" }, rsx! {}],
                    body: users.iter().map(|user| {
                        let user = user.clone();
                        vec![
                            rsx! { "{user.display_name()}" },
                            rsx! { "{user.email}" },
                            rsx! { "{local_date(user.created_at)}" },
                            rsx! {
                                a {
                                    class: "mx-2",
                                    onclick: move |_| *dialog.write() = UserDialog::Options(user.clone()),
                                    Icon { name: "ellipsis-vertical" }
                                }
                            },
                        ]
                    }).collect::<Vec<_>>()
                }
                Container {
                    button {
                        class: "button is-link",
                        onclick: move |_| {
                            *dialog.write() = UserDialog::Add {
                                first_name: FieldValue::default(),
                                last_name: FieldValue::default(),
                                email: FieldValue::default(),
                                password: FieldValue::default(),
                            };
                        },
                        Icon { name: "user-plus" }
                    }
                }
            },
            Some(Err(err)) => read_failure(err),
            None => rsx! { Loading {} },
        }
        match dialog() {
            UserDialog::None => rsx! {},
            UserDialog::Options(user) => rsx! {
                OptionsMenu {
                    options: vec![rsx! {
                        MenuOption {
                            icon: "key".to_string(),
                            text: "Reset password".to_string(),
                            onclick: move |_| {
                                *dialog.write() = UserDialog::ResetPassword {
                                    user: user.clone(),
                                    password: FieldValue::default(),
                                };
                            }
                        }
                    }],
                    close_event: close,
                }
            },
            UserDialog::Add { first_name, last_name, email, password } => rsx! {
                Dialog {
                    title: rsx! { "Add member" },
                    close_event: close,
                    InputField {
                        label: "First name".to_string(),
                        value: first_name.input.clone(),
                        error: if let Err(err) = &first_name.validated { err.clone() },
                        has_changed: false,
                        oninput: move |event: FormEvent| {
                            if let UserDialog::Add { first_name, .. } = &mut *dialog.write() {
                                first_name.update(event.value(), |v| DOMAIN_SERVICE.read().validate_user_name(v));
                            }
                        }
                    }
                    InputField {
                        label: "Last name".to_string(),
                        value: last_name.input.clone(),
                        error: if let Err(err) = &last_name.validated { err.clone() },
                        has_changed: false,
                        oninput: move |event: FormEvent| {
                            if let UserDialog::Add { last_name, .. } = &mut *dialog.write() {
                                last_name.update(event.value(), |v| DOMAIN_SERVICE.read().validate_user_name(v));
                            }
                        }
                    }
                    InputField {
                        label: "E-mail".to_string(),
                        r#type: "email".to_string(),
                        value: email.input.clone(),
                        error: if let Err(err) = &email.validated { err.clone() },
                        has_changed: false,
                        oninput: move |event: FormEvent| async move {
                            let input = event.value();
                            let validated = DOMAIN_SERVICE
                                .read()
                                .validate_user_email(&input, &domain::UserID::nil())
                                .await
                                .map_err(|err| err.to_string());
                            if let UserDialog::Add { email, .. } = &mut *dialog.write() {
                                email.input = input;
                                email.validated = validated;
                            }
                        }
                    }
                    InputField {
                        label: "Initial password".to_string(),
                        r#type: "password".to_string(),
                        autocomplete: "new-password".to_string(),
                        value: password.input.clone(),
                        error: if let Err(err) = &password.validated { err.clone() },
                        has_changed: false,
                        oninput: move |event: FormEvent| {
                            if let UserDialog::Add { password, .. } = &mut *dialog.write() {
                                password.update(event.value(), domain::Password::new);
                            }
                        }
                    }
                    p {
                        class: "help mb-4",
                        "The member receives a welcome e-mail with the sign-in details."
                    }
                    ActionButtons {
                        is_loading: is_loading(),
                        is_valid: FieldValue::all_valid(&[&first_name as &dyn FieldValueState, &last_name, &email, &password]),
                        close,
                        save,
                    }
                }
            },
            UserDialog::ResetPassword { user, password } => rsx! {
                Dialog {
                    title: rsx! { "Reset password of {user.display_name()}" },
                    close_event: close,
                    InputField {
                        label: "New password".to_string(),
                        r#type: "password".to_string(),
                        autocomplete: "new-password".to_string(),
                        value: password.input.clone(),
                        error: if let Err(err) = &password.validated { err.clone() },
                        has_changed: false,
                        oninput: move |event: FormEvent| {
                            if let UserDialog::ResetPassword { password, .. } = &mut *dialog.write() {
                                password.update(event.value(), domain::Password::new);
                            }
                        }
                    }
                    ActionButtons {
                        is_loading: is_loading(),
                        is_valid: password.valid(),
                        close,
                        save,
                    }
                }
            },
        }
    }
}

#[derive(Clone, PartialEq)]
struct EntryForm {
    machine: Option<domain::MachineID>,
    exercise: Option<domain::ExerciseID>,
    sets: FieldValue<domain::Sets>,
    reps: FieldValue<domain::Reps>,
    weight: FieldValue<domain::Weight>,
    notes: String,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            machine: None,
            exercise: None,
            sets: FieldValue::default(),
            reps: FieldValue::default(),
            weight: FieldValue::default(),
            notes: String::new(),
        }
    }
}

impl EntryForm {
    fn is_valid(&self) -> bool {
        self.machine.is_some()
            && FieldValue::all_valid(&[&self.sets as &dyn FieldValueState, &self.reps, &self.weight])
    }

    fn to_entry(
        &self,
        machines: &[domain::Machine],
        exercises: &[domain::Exercise],
    ) -> Option<domain::TableEntry> {
        let machine = machines.iter().find(|m| Some(&m.id) == self.machine.as_ref())?;
        let exercise = self
            .exercise
            .as_ref()
            .and_then(|id| exercises.iter().find(|e| e.id == *id));
        Some(domain::TableEntry {
            machine_id: machine.id.clone(),
            machine_name: machine.name.to_string(),
            exercise_id: exercise.map(|e| e.id.clone()),
            exercise_name: exercise.map(|e| e.name.to_string()).unwrap_or_default(),
            sets: self.sets.validated.clone().ok()?,
            reps: self.reps.validated.clone().ok()?,
            weight: self.weight.validated.clone().ok()?,
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Clone, Default, PartialEq)]
struct TableForm {
    user: Option<domain::UserID>,
    name: String,
    entries: Vec<EntryForm>,
}

impl TableForm {
    fn is_valid(&self) -> bool {
        self.user.is_some() && !self.entries.is_empty() && self.entries.iter().all(EntryForm::is_valid)
    }

    fn to_new_table(
        &self,
        machines: &[domain::Machine],
        exercises: &[domain::Exercise],
    ) -> Option<domain::NewAssignedTable> {
        if self.entries.is_empty() {
            return None;
        }
        Some(domain::NewAssignedTable {
            user_id: self.user.clone()?,
            name: Some(self.name.trim().to_string()).filter(|n| !n.is_empty()),
            entries: self
                .entries
                .iter()
                .map(|e| e.to_entry(machines, exercises))
                .collect::<Option<Vec<_>>>()?,
        })
    }
}

#[derive(Clone, PartialEq)]
enum TableDialog {
    None,
    Options(domain::AssignedTable),
    Assign(TableForm),
    Delete(domain::AssignedTable),
}

#[component]
fn Tables() -> Element {
    let tables = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_assigned_tables().await
    });
    let users = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_users().await
    });
    let mut dialog = use_signal(|| TableDialog::None);
    let mut is_loading = use_signal(|| false);
    let close = move |_| *dialog.write() = TableDialog::None;

    let user_names = match &*users.read() {
        Some(Ok(users)) => users
            .iter()
            .map(|u| (u.id.clone(), u.display_name()))
            .collect::<HashMap<_, _>>(),
        _ => HashMap::new(),
    };
    let user_list = match &*users.read() {
        Some(Ok(users)) => users.clone(),
        _ => vec![],
    };

    let complete = move |id: domain::AssignedTableID| async move {
        match DOMAIN_SERVICE.read().complete_table(&id).await {
            Ok(_) => signal_changed_data(),
            Err(err) => notify(format!("Failed to complete table: {err}")),
        }
        *dialog.write() = TableDialog::None;
    };

    let delete = move |_| async move {
        let TableDialog::Delete(table) = dialog.read().clone() else {
            return;
        };
        *is_loading.write() = true;
        match DOMAIN_SERVICE.read().delete_assigned_table(&table.id).await {
            Ok(_) => signal_changed_data(),
            Err(err) => notify(format!("Failed to delete table: {err}")),
        }
        *is_loading.write() = false;
        *dialog.write() = TableDialog::None;
    };

    rsx! {
        Title { title: "Training tables" }
        match &*tables.read() {
            Some(Ok(tables)) => rsx! {
                if tables.is_empty() {
                    NoData {}
                } else {
                    Table {
                        head: vec![rsx! { "Member" }, rsx! { "Table" }, rsx! { "Exercises" }, rsx! { "Status" }, rsx! {}],
                        body: tables.iter().map(|table| {
                            let member = user_names.get(&table.user_id).cloned().unwrap_or_else(|| table.user_id.to_string());
                            let options = table.clone();
                            vec![
                                rsx! { "{member}" },
                                rsx! { "{table.name.clone().unwrap_or_default()}" },
                                rsx! { "{table.entries.len()}" },
                                rsx! {
                                    span {
                                        class: "tag",
                                        class: if table.is_active() { "is-success" },
                                        "{table.status.as_str()}"
                                    }
                                },
                                rsx! {
                                    a {
                                        class: "mx-2",
                                        onclick: move |_| *dialog.write() = TableDialog::Options(options.clone()),
                                        Icon { name: "ellipsis-vertical" }
                                    }
                                },
                            ]
                        }).collect::<Vec<_>>()
                    }
                }
                Container {
                    button {
                        class: "button is-link",
                        onclick: move |_| *dialog.write() = TableDialog::Assign(TableForm::default()),
                        Icon { name: "table-list" }
                        span { "Assign table" }
                    }
                }
            },
            Some(Err(err)) => read_failure(err),
            None => rsx! { Loading {} },
        }
        match dialog() {
            TableDialog::None => rsx! {},
            TableDialog::Options(table) => {
                let id = table.id.clone();
                let is_active = table.is_active();
                rsx! {
                    OptionsMenu {
                        options: vec![rsx! {
                            if is_active {
                                MenuOption {
                                    icon: "check".to_string(),
                                    text: "Mark as completed".to_string(),
                                    onclick: move |_| complete(id.clone()),
                                }
                            }
                            MenuOption {
                                icon: "times".to_string(),
                                text: "Delete table".to_string(),
                                onclick: move |_| *dialog.write() = TableDialog::Delete(table.clone()),
                            }
                        }],
                        close_event: close,
                    }
                }
            }
            TableDialog::Assign(form) => rsx! {
                AssignTableDialog { dialog, form, users: user_list }
            },
            TableDialog::Delete(table) => rsx! {
                DeleteConfirmationDialog {
                    element_type: "table",
                    element_name: rsx! { "{table.name.clone().unwrap_or_default()}" },
                    delete_event: delete,
                    cancel_event: close,
                    is_loading: is_loading(),
                }
            },
        }
    }
}

macro_rules! update_entry {
    ($dialog:ident, $index:expr, |$entry:ident| $body:expr) => {
        if let TableDialog::Assign(form) = &mut *$dialog.write() {
            if let Some($entry) = form.entries.get_mut($index) {
                $body;
            }
        }
    };
}

#[component]
fn AssignTableDialog(
    dialog: Signal<TableDialog>,
    form: TableForm,
    users: Vec<domain::User>,
) -> Element {
    let mut dialog = dialog;
    let machines = use_resource(|| async { DOMAIN_SERVICE.read().get_machines().await });
    let exercises = use_resource(|| async { DOMAIN_SERVICE.read().get_exercises().await });
    let mut is_loading = use_signal(|| false);
    let close = move |_| *dialog.write() = TableDialog::None;

    let (machines, exercises) = match (&*machines.read(), &*exercises.read()) {
        (Some(Ok(machines)), Some(Ok(exercises))) => (machines.clone(), exercises.clone()),
        (Some(Err(err)), _) | (_, Some(Err(err))) => return read_failure(err),
        _ => return rsx! { Loading {} },
    };

    let save = {
        let machines = machines.clone();
        let exercises = exercises.clone();
        move |_| {
            let machines = machines.clone();
            let exercises = exercises.clone();
            async move {
                let TableDialog::Assign(form) = dialog.read().clone() else {
                    return;
                };
                let Some(table) = form.to_new_table(&machines, &exercises) else {
                    return;
                };
                *is_loading.write() = true;
                match DOMAIN_SERVICE.read().assign_table(table).await {
                    Ok(_) => {
                        *dialog.write() = TableDialog::None;
                        signal_changed_data();
                    }
                    Err(err) => notify(format!("Failed to assign table: {err}")),
                }
                *is_loading.write() = false;
            }
        }
    };

    rsx! {
        Dialog {
            title: rsx! { "Assign training table" },
            close_event: close,
            SelectField {
                label: "Member".to_string(),
                options: std::iter::once(rsx! {
                    SelectOption { text: "Select a member", value: "", selected: form.user.is_none() }
                })
                .chain(users.iter().map(|user| rsx! {
                    SelectOption {
                        text: user.display_name(),
                        value: user.id.to_string(),
                        selected: form.user.as_ref() == Some(&user.id),
                    }
                }))
                .collect::<Vec<_>>(),
                has_changed: false,
                onchange: move |event: FormEvent| {
                    if let TableDialog::Assign(form) = &mut *dialog.write() {
                        let value = event.value();
                        form.user = if value.is_empty() { None } else { Some(domain::UserID::from(value)) };
                    }
                }
            }
            InputField {
                label: "Name".to_string(),
                help: "Optional, e.g. \"Strength block 1\"".to_string(),
                value: form.name.clone(),
                has_changed: false,
                oninput: move |event: FormEvent| {
                    if let TableDialog::Assign(form) = &mut *dialog.write() {
                        form.name = event.value();
                    }
                }
            }
            for (index, entry) in form.entries.iter().cloned().enumerate() {
                div {
                    class: "box p-3",
                    div {
                        class: "is-flex is-justify-content-space-between",
                        strong { "Exercise {index + 1}" }
                        a {
                            class: "has-text-danger",
                            onclick: move |_| {
                                if let TableDialog::Assign(form) = &mut *dialog.write() {
                                    form.entries.remove(index);
                                }
                            },
                            Icon { name: "trash" }
                        }
                    }
                    SelectField {
                        label: "Machine".to_string(),
                        options: std::iter::once(rsx! {
                            SelectOption { text: "Select a machine", value: "", selected: entry.machine.is_none() }
                        })
                        .chain(machines.iter().map(|machine| rsx! {
                            SelectOption {
                                text: machine.label(),
                                value: machine.id.to_string(),
                                selected: entry.machine.as_ref() == Some(&machine.id),
                            }
                        }))
                        .collect::<Vec<_>>(),
                        has_changed: false,
                        onchange: move |event: FormEvent| {
                            let value = event.value();
                            update_entry!(dialog, index, |entry| {
                                entry.machine = if value.is_empty() { None } else { Some(domain::MachineID::from(value)) };
                                entry.exercise = None;
                            });
                        }
                    }
                    if let Some(machine_id) = &entry.machine {
                        SelectField {
                            label: "Exercise".to_string(),
                            options: std::iter::once(rsx! {
                                SelectOption { text: "Any", value: "", selected: entry.exercise.is_none() }
                            })
                            .chain(exercises.iter().filter(|e| e.machine_id == *machine_id).map(|exercise| rsx! {
                                SelectOption {
                                    text: exercise.name.to_string(),
                                    value: exercise.id.to_string(),
                                    selected: entry.exercise.as_ref() == Some(&exercise.id),
                                }
                            }))
                            .collect::<Vec<_>>(),
                            has_changed: false,
                            onchange: move |event: FormEvent| {
                                let value = event.value();
                                update_entry!(dialog, index, |entry| {
                                    entry.exercise = if value.is_empty() { None } else { Some(domain::ExerciseID::from(value)) };
                                });
                            }
                        }
                    }
                    div {
                        class: "columns is-mobile",
                        div {
                            class: "column",
                            InputField {
                                label: "Sets".to_string(),
                                inputmode: "numeric".to_string(),
                                value: entry.sets.input.clone(),
                                error: if let Err(err) = &entry.sets.validated { err.clone() },
                                has_changed: false,
                                oninput: move |event: FormEvent| {
                                    update_entry!(dialog, index, |entry| {
                                        entry.sets.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_sets(v));
                                    });
                                }
                            }
                        }
                        div {
                            class: "column",
                            InputField {
                                label: "Reps".to_string(),
                                inputmode: "numeric".to_string(),
                                value: entry.reps.input.clone(),
                                error: if let Err(err) = &entry.reps.validated { err.clone() },
                                has_changed: false,
                                oninput: move |event: FormEvent| {
                                    update_entry!(dialog, index, |entry| {
                                        entry.reps.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_reps(v));
                                    });
                                }
                            }
                        }
                        div {
                            class: "column",
                            InputField {
                                label: "kg".to_string(),
                                inputmode: "decimal".to_string(),
                                value: entry.weight.input.clone(),
                                error: if let Err(err) = &entry.weight.validated { err.clone() },
                                has_changed: false,
                                oninput: move |event: FormEvent| {
                                    update_entry!(dialog, index, |entry| {
                                        entry.weight.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_weight(v));
                                    });
                                }
                            }
                        }
                    }
                    InputField {
                        label: "Notes".to_string(),
                        value: entry.notes.clone(),
                        has_changed: false,
                        oninput: move |event: FormEvent| {
                            update_entry!(dialog, index, |entry| entry.notes = event.value());
                        }
                    }
                }
            }
            div {
                class: "block has-text-centered",
                button {
                    class: "button is-link is-light",
                    onclick: move |_| {
                        if let TableDialog::Assign(form) = &mut *dialog.write() {
                            form.entries.push(EntryForm::default());
                        }
                    },
                    Icon { name: "plus" }
                    span { "Add exercise" }
                }
            }
            p {
                class: "help mb-4",
                "Assigning a table completes the current table of the member."
            }
            ActionButtons {
                is_loading: is_loading(),
                is_valid: form.is_valid(),
                close,
                save,
            }
        }
    }
}

#[component]
fn GlobalMachines() -> Element {
    let machines = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_machines().await
    });

    rsx! {
        Title { title: "Machines" }
        match &*machines.read() {
            Some(Ok(machines)) => {
                let global = machines.iter().filter(|m| m.ownership.is_global()).count();
                rsx! {
                    Container {
                        has_text_centered: true,
                        p { class: "mb-3", "{global} gym machines are visible to all members." }
                        Link {
                            class: "button is-link",
                            to: Route::Machines { search: String::new() },
                            Icon { name: "dumbbell" }
                            span { "Manage machines" }
                        }
                    }
                }
            }
            Some(Err(err)) => read_failure(err),
            None => rsx! { Loading {} },
        }
    }
}

#[component]
fn Categories() -> Element {
    let categories = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_category_documents().await
    });
    let mut name = use_signal(FieldValue::<domain::Name>::default);
    let mut delete_candidate = use_signal(|| None::<domain::Category>);
    let mut is_loading = use_signal(|| false);

    let add = move |_| async move {
        let Ok(category) = name.read().validated.clone() else {
            return;
        };
        match DOMAIN_SERVICE.read().create_category(category).await {
            Ok(_) => {
                *name.write() = FieldValue::default();
                signal_changed_data();
            }
            Err(err) => notify(format!("Failed to add category: {err}")),
        }
    };

    let delete = move |_| async move {
        let Some(category) = delete_candidate.read().clone() else {
            return;
        };
        *is_loading.write() = true;
        match DOMAIN_SERVICE.read().delete_category(&category.id).await {
            Ok(_) => signal_changed_data(),
            Err(err) => notify(format!("Failed to delete category: {err}")),
        }
        *is_loading.write() = false;
        *delete_candidate.write() = None;
    };

    rsx! {
        Title { title: "Categories" }
        match &*categories.read() {
            Some(Ok(categories)) => rsx! {
                Container {
                    div {
                        class: "tags is-centered",
                        for category in categories.iter().cloned() {
                            span {
                                class: "tag is-link is-medium",
                                "{category.name}"
                                button {
                                    class: "delete is-small",
                                    onclick: move |_| *delete_candidate.write() = Some(category.clone()),
                                }
                            }
                        }
                    }
                    if categories.is_empty() {
                        p { class: "help mb-3", "Without categories the categories of the machines are used." }
                    }
                    div {
                        class: "field has-addons has-addons-centered",
                        div {
                            class: "control",
                            input {
                                class: "input",
                                class: if name.read().validated.is_err() && !name.read().input.is_empty() { "is-danger" },
                                r#type: "text",
                                placeholder: "New category",
                                value: name.read().input.clone(),
                                oninput: move |event: FormEvent| {
                                    name.write().update(event.value(), domain::Name::new);
                                }
                            }
                        }
                        div {
                            class: "control",
                            button {
                                class: "button is-link",
                                disabled: !name.read().valid(),
                                onclick: add,
                                Icon { name: "plus" }
                            }
                        }
                    }
                }
            },
            Some(Err(err)) => read_failure(err),
            None => rsx! { Loading {} },
        }
        if let Some(category) = delete_candidate() {
            DeleteConfirmationDialog {
                element_type: "category",
                element_name: rsx! { "{category.name}" },
                consequence: "The category will be deleted. Machines keep their category label.",
                delete_event: delete,
                cancel_event: move |_| *delete_candidate.write() = None,
                is_loading: is_loading(),
            }
        }
    }
}

#[component]
fn FeedbackInbox() -> Element {
    let notifications = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_notifications().await
    });
    let suggestions = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_suggestions().await
    });

    let unread = match &*notifications.read() {
        Some(Ok(notifications)) => DOMAIN_SERVICE.read().unread_count(notifications),
        _ => 0,
    };

    let title = if unread > 0 {
        format!("Notifications ({unread} unread)")
    } else {
        "Notifications".to_string()
    };

    rsx! {
        Title { title }
        match &*notifications.read() {
            Some(Ok(notifications)) => rsx! {
                if notifications.is_empty() {
                    NoData {}
                }
                for notification in notifications.iter().cloned() {
                    {
                        let id = notification.id.clone();
                        let delete_id = notification.id.clone();
                        let color = if notification.read { Color::Dark } else { Color::Warning };
                        rsx! {
                            Message {
                                color,
                                p {
                                    class: "is-size-7",
                                    "{notification.user_name} · {local_date(notification.created_at)}"
                                }
                                p { style: "white-space:pre-line", "{notification.message}" }
                                div {
                                    class: "buttons is-right mt-2",
                                    if !notification.read {
                                        button {
                                            class: "button is-small",
                                            onclick: move |_| {
                                                let id = id.clone();
                                                async move {
                                                    match DOMAIN_SERVICE.read().mark_notification_read(&id).await {
                                                        Ok(_) => signal_changed_data(),
                                                        Err(err) => notify(format!("Failed to mark notification as read: {err}")),
                                                    }
                                                }
                                            },
                                            Icon { name: "check" }
                                            span { "Read" }
                                        }
                                    }
                                    button {
                                        class: "button is-small is-danger is-outlined",
                                        onclick: move |_| {
                                            let id = delete_id.clone();
                                            async move {
                                                match DOMAIN_SERVICE.read().delete_notification(&id).await {
                                                    Ok(_) => signal_changed_data(),
                                                    Err(err) => notify(format!("Failed to delete notification: {err}")),
                                                }
                                            }
                                        },
                                        Icon { name: "trash" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            Some(Err(err)) => read_failure(err),
            None => rsx! { Loading {} },
        }
        Title { title: "Suggestions", class: "mt-5" }
        match &*suggestions.read() {
            Some(Ok(suggestions)) => rsx! {
                if suggestions.is_empty() {
                    NoData {}
                }
                for suggestion in suggestions.iter().cloned() {
                    {
                        let id = suggestion.id.clone();
                        let delete_id = suggestion.id.clone();
                        let pending = suggestion.status == domain::SuggestionStatus::Pending;
                        let color = if pending { Color::Info } else { Color::Dark };
                        rsx! {
                            Message {
                                color,
                                p {
                                    class: "is-size-7",
                                    "{suggestion.user_name} · {local_date(suggestion.created_at)} · {suggestion.status.as_str()}"
                                }
                                p { style: "white-space:pre-line", "{suggestion.text}" }
                                div {
                                    class: "buttons is-right mt-2",
                                    if pending {
                                        button {
                                            class: "button is-small",
                                            onclick: move |_| {
                                                let id = id.clone();
                                                async move {
                                                    match DOMAIN_SERVICE.read().mark_suggestion_reviewed(&id).await {
                                                        Ok(_) => signal_changed_data(),
                                                        Err(err) => notify(format!("Failed to mark suggestion as reviewed: {err}")),
                                                    }
                                                }
                                            },
                                            Icon { name: "check" }
                                            span { "Reviewed" }
                                        }
                                    }
                                    button {
                                        class: "button is-small is-danger is-outlined",
                                        onclick: move |_| {
                                            let id = delete_id.clone();
                                            async move {
                                                match DOMAIN_SERVICE.read().delete_suggestion(&id).await {
                                                    Ok(_) => signal_changed_data(),
                                                    Err(err) => notify(format!("Failed to delete suggestion: {err}")),
                                                }
                                            }
                                        },
                                        Icon { name: "trash" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            Some(Err(err)) => read_failure(err),
            None => rsx! { Loading {} },
        }
    }
}

#[component]
fn Posts() -> Element {
    let posts = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_posts().await
    });
    let mut title = use_signal(FieldValue::<domain::Name>::default);
    let mut content = use_signal(FieldValue::<String>::default);
    let mut delete_candidate = use_signal(|| None::<domain::Post>);
    let mut is_loading = use_signal(|| false);

    let publish = move |_| async move {
        let (Ok(t), Ok(c)) = (title.read().validated.clone(), content.read().validated.clone()) else {
            return;
        };
        *is_loading.write() = true;
        match DOMAIN_SERVICE.read().create_post(t, c).await {
            Ok(_) => {
                *title.write() = FieldValue::default();
                *content.write() = FieldValue::default();
                signal_changed_data();
            }
            Err(err) => notify(format!("Failed to publish announcement: {err}")),
        }
        *is_loading.write() = false;
    };

    let delete = move |_| async move {
        let Some(post) = delete_candidate.read().clone() else {
            return;
        };
        *is_loading.write() = true;
        match DOMAIN_SERVICE.read().delete_post(&post.id).await {
            Ok(_) => signal_changed_data(),
            Err(err) => notify(format!("Failed to delete announcement: {err}")),
        }
        *is_loading.write() = false;
        *delete_candidate.write() = None;
    };

    rsx! {
        Title { title: "Announcements" }
        match &*posts.read() {
            Some(Ok(posts)) => rsx! {
                Table {
                    body: posts.iter().map(|post| {
                        let post = post.clone();
                        vec![
                            rsx! { "{local_date(post.created_at)}" },
                            rsx! { "{post.title}" },
                            rsx! {
                                a {
                                    class: "has-text-danger",
                                    onclick: move |_| *delete_candidate.write() = Some(post.clone()),
                                    Icon { name: "trash" }
                                }
                            },
                        ]
                    }).collect::<Vec<_>>()
                }
            },
            Some(Err(err)) => read_failure(err),
            None => rsx! { Loading {} },
        }
        div {
            class: "box mx-3",
            InputField {
                label: "Title".to_string(),
                value: title.read().input.clone(),
                error: if let Err(err) = &title.read().validated { err.clone() },
                has_changed: false,
                oninput: move |event: FormEvent| {
                    title.write().update(event.value(), |v| DOMAIN_SERVICE.read().validate_post_title(v));
                }
            }
            TextAreaField {
                label: "Content".to_string(),
                value: content.read().input.clone(),
                error: if let Err(err) = &content.read().validated { err.clone() },
                has_changed: false,
                oninput: move |event: FormEvent| {
                    content.write().update(event.value(), |v| DOMAIN_SERVICE.read().validate_post_content(v));
                }
            }
            div {
                class: "field is-grouped is-grouped-centered",
                div {
                    class: "control",
                    button {
                        class: "button is-primary",
                        class: if is_loading() { "is-loading" },
                        disabled: !FieldValue::all_valid(&[&*title.read() as &dyn FieldValueState, &*content.read()]),
                        onclick: publish,
                        Icon { name: "bullhorn" }
                        span { "Publish" }
                    }
                }
            }
        }
        if let Some(post) = delete_candidate() {
            DeleteConfirmationDialog {
                element_type: "announcement",
                element_name: rsx! { "{post.title}" },
                delete_event: delete,
                cancel_event: move |_| *delete_candidate.write() = None,
                is_loading: is_loading(),
            }
        }
    }
}

#[component]
fn GymConfig() -> Element {
    let config = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_config().await
    });

    match &*config.read() {
        Some(Ok(config)) => rsx! {
            GymConfigForm { config: config.clone() }
        },
        Some(Err(err)) => rsx! {
            Title { title: "Gym" }
            {read_failure(err)}
        },
        None => rsx! { Loading {} },
    }
}

#[component]
fn GymConfigForm(config: domain::Config) -> Element {
    let mut gym_name = use_signal(|| FieldValue::new(config.gym_name.clone()));
    let mut contact_email = use_signal(|| FieldValue::from_option(config.contact_email.clone()));
    let mut is_loading = use_signal(|| false);

    let save = move |_| async move {
        let (Ok(name), Ok(email)) = (
            gym_name.read().validated.clone(),
            contact_email.read().validated.clone(),
        ) else {
            return;
        };
        *is_loading.write() = true;
        match DOMAIN_SERVICE
            .read()
            .replace_config(domain::Config {
                gym_name: name,
                contact_email: email,
            })
            .await
        {
            Ok(config) => {
                *gym_name.write() = FieldValue::new(config.gym_name.clone());
                *contact_email.write() = FieldValue::from_option(config.contact_email);
                signal_changed_data();
            }
            Err(err) => notify(format!("Failed to save settings: {err}")),
        }
        *is_loading.write() = false;
    };

    rsx! {
        Title { title: "Gym" }
        div {
            class: "box mx-3",
            InputField {
                label: "Name".to_string(),
                value: gym_name.read().input.clone(),
                error: if let Err(err) = &gym_name.read().validated { err.clone() },
                has_changed: gym_name.read().changed(),
                oninput: move |event: FormEvent| {
                    gym_name.write().update(event.value(), |v| domain::Name::new(v).map(|name| name.to_string()));
                }
            }
            InputField {
                label: "Contact e-mail".to_string(),
                r#type: "email".to_string(),
                value: contact_email.read().input.clone(),
                error: if let Err(err) = &contact_email.read().validated { err.clone() },
                has_changed: contact_email.read().changed(),
                oninput: move |event: FormEvent| {
                    contact_email.write().update(event.value(), |v| {
                        if v.trim().is_empty() { Ok(None) } else { domain::Email::new(v).map(Some) }
                    });
                }
            }
            div {
                class: "field is-grouped is-grouped-centered",
                div {
                    class: "control",
                    button {
                        class: "button is-primary",
                        class: if is_loading() { "is-loading" },
                        disabled: !FieldValue::has_valid_changes(&[&*gym_name.read() as &dyn FieldValueState, &*contact_email.read()]),
                        onclick: save,
                        "Save"
                    }
                }
            }
        }
    }
}

#[component]
fn AppUpdate() -> Element {
    let navigator = use_navigator();

    rsx! {
        Container {
            has_text_centered: true,
            Title { title: "App" }
            button {
                class: "button is-link",
                onclick: move |_| {
                    match web_app::service_worker::post(&web_app::service_worker::Message::UpdateCache) {
                        Ok(()) => {
                            navigator.push(Route::Root {});
                        }
                        Err(err) => notify(format!("Update failed: {err}")),
                    }
                },
                Icon { name: "download" }
                span { "Reload app" }
            }
        }
    }
}

#[component]
fn Log() -> Element {
    let entries = WEB_APP_SERVICE.read().get_log_entries();
    rsx! {
        Title { title: "Log" }
        Container {
            match entries {
                Ok(entries) => rsx! {
                    for entry in entries {
                        Message {
                            color: match entry.level {
                                log::Level::Error => Color::Danger,
                                log::Level::Warn => Color::Warning,
                                log::Level::Info => Color::Primary,
                                log::Level::Debug => Color::Info,
                                log::Level::Trace => Color::Dark,
                            },
                            p { class: "is-size-7", {entry.time} }
                            p { "{entry.message}" }
                        }
                    }
                },
                Err(err) => rsx! {
                    Error { message: err }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn machine(id: &str, name: &str) -> domain::Machine {
        domain::Machine {
            id: domain::MachineID::from(id),
            name: domain::Name::new(name).unwrap(),
            number: None,
            category: None,
            description: String::new(),
            media_url: None,
            ownership: domain::Ownership::Global,
            created_at: DateTime::default(),
        }
    }

    fn exercise(id: &str, name: &str, machine_id: &str) -> domain::Exercise {
        domain::Exercise {
            id: domain::ExerciseID::from(id),
            name: domain::Name::new(name).unwrap(),
            machine_id: domain::MachineID::from(machine_id),
            description: String::new(),
            media: None,
            ownership: domain::Ownership::Global,
            created_at: DateTime::default(),
        }
    }

    fn entry(machine: Option<&str>, exercise: Option<&str>, sets: &str) -> EntryForm {
        let mut entry = EntryForm {
            machine: machine.map(domain::MachineID::from),
            exercise: exercise.map(domain::ExerciseID::from),
            notes: " slow ".to_string(),
            ..EntryForm::default()
        };
        entry.sets.update(sets.to_string(), |v| domain::Sets::try_from(v));
        entry.reps.update("10".to_string(), |v| domain::Reps::try_from(v));
        entry.weight.update("42.5".to_string(), |v| domain::Weight::try_from(v));
        entry
    }

    #[test]
    fn test_table_form_to_new_table() {
        let form = TableForm {
            user: Some(domain::UserID::from("u1")),
            name: "  ".to_string(),
            entries: vec![entry(Some("m1"), Some("e1"), "3"), entry(Some("m2"), None, "4")],
        };

        assert!(form.is_valid());
        let table = form
            .to_new_table(
                &[machine("m1", "Leg Press"), machine("m2", "Rowing")],
                &[exercise("e1", "Calf Raise", "m1")],
            )
            .unwrap();

        assert_eq!(table.user_id, domain::UserID::from("u1"));
        assert_eq!(table.name, None);
        assert_eq!(
            table
                .entries
                .iter()
                .map(|e| (e.machine_name.as_str(), e.exercise_name.as_str(), u32::from(e.sets), e.notes.as_str()))
                .collect::<Vec<_>>(),
            vec![("Leg Press", "Calf Raise", 3, "slow"), ("Rowing", "", 4, "slow")]
        );
    }

    #[rstest]
    #[case::no_user(None, vec![entry(Some("m1"), None, "3")])]
    #[case::no_entries(Some("u1"), vec![])]
    #[case::no_machine(Some("u1"), vec![entry(None, None, "3")])]
    #[case::invalid_sets(Some("u1"), vec![entry(Some("m1"), None, "x")])]
    fn test_table_form_invalid(#[case] user: Option<&str>, #[case] entries: Vec<EntryForm>) {
        let form = TableForm {
            user: user.map(domain::UserID::from),
            name: String::new(),
            entries,
        };

        assert!(!form.is_valid());
        assert_eq!(form.to_new_table(&[machine("m1", "Leg Press")], &[]), None);
    }
}
