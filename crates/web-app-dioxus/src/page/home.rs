use chrono::Local;
use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::{
    AssignedTableService, ConfigService, MachineService, PostService, SessionService,
    WorkoutService,
};

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route,
    component::{
        element::{
            CenteredBlock, DeleteConfirmationDialog, Error, Icon, Loading, LoadingPage, NoData,
            Table, Title, local_date, read_failure, relative_date,
        },
        form::{FieldValue, FieldValueState, InputField, SelectField, SelectOption},
    },
    ensure_session, notify, signal_changed_data,
};

#[component]
pub fn Home() -> Element {
    let session = ensure_session!();
    let config = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_config().await
    });

    let gym_name = match &*config.read() {
        Some(Ok(config)) => config.gym_name.clone(),
        _ => domain::DEFAULT_GYM_NAME.to_string(),
    };

    match &*session.read() {
        Some(Ok(session)) => {
            let user_id = session.user_id.clone();
            rsx! {
                Title { title: gym_name }
                Announcements {}
                ActiveTable { user_id }
                WorkoutLogger {}
                TodaysWorkouts {}
            }
        }
        Some(Err(err)) => read_failure(err),
        None => rsx! { LoadingPage {} },
    }
}

#[component]
fn Announcements() -> Element {
    let posts = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_posts().await
    });

    match &*posts.read() {
        Some(Ok(posts)) => rsx! {
            for post in posts.iter().take(3) {
                article {
                    class: "message is-info mx-2",
                    div {
                        class: "message-header",
                        p { "{post.title}" }
                        span { class: "is-size-7", "{local_date(post.created_at)}" }
                    }
                    div {
                        class: "message-body",
                        style: "white-space:pre-line",
                        "{post.content}"
                    }
                }
            }
        },
        Some(Err(domain::ReadError::Storage(domain::StorageError::NoConnection))) => {
            *NO_CONNECTION.write() = true;
            rsx! {}
        }
        Some(Err(err)) => rsx! { CenteredBlock { Error { message: "Failed to load announcements: {err}" } } },
        None => rsx! { Loading {} },
    }
}

#[component]
fn ActiveTable(user_id: domain::UserID) -> Element {
    let table = use_resource(use_reactive!(|user_id| async move {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_active_table(&user_id).await
    }));
    let navigator = use_navigator();

    let subtitle = match &*table.read() {
        Some(Ok(Some(table))) => {
            let name = table.name.clone().unwrap_or_else(|| "Training table".to_string());
            let exercises = table.entries.len();
            rsx! {
                strong { "{name}" }
                " ({exercises} exercises, assigned {relative_date(local_date(table.created_at))})"
            }
        }
        Some(Ok(None)) => rsx! { "No table assigned" },
        Some(Err(err)) => rsx! { Error { message: "{err}" } },
        None => rsx! { Loading {} },
    };

    rsx! {
        div {
            class: "mx-3 my-3",
            a {
                class: "box px-4 py-3",
                onclick: move |_| { navigator.push(Route::Table {}); },
                div {
                    class: "is-flex is-justify-content-space-between",
                    span { class: "title is-size-5 has-text-link", "Training table" }
                    Icon { name: "chevron-right" }
                }
                p { {subtitle} }
            }
        }
    }
}

#[derive(Clone, Default)]
struct WorkoutForm {
    date: FieldValue<chrono::NaiveDate>,
    machine: Option<domain::MachineID>,
    sets: FieldValue<domain::Sets>,
    reps: FieldValue<domain::Reps>,
    weight: FieldValue<domain::Weight>,
}

impl WorkoutForm {
    fn new() -> Self {
        Self {
            date: FieldValue::new(Local::now().date_naive()),
            ..Self::default()
        }
    }

    /// Prefills the values of the most recent record on the machine.
    fn select_machine(&mut self, machine_id: domain::MachineID, workouts: &[domain::WorkoutRecord]) {
        if let Some(last) = workouts.iter().find(|w| w.machine_id == machine_id) {
            self.sets = FieldValue::new(last.sets);
            self.reps = FieldValue::new(last.reps);
            self.weight = FieldValue::new(last.weight);
        }
        self.machine = Some(machine_id);
    }

    fn is_valid(&self) -> bool {
        self.machine.is_some()
            && FieldValue::all_valid(&[&self.date as &dyn FieldValueState, &self.sets, &self.reps, &self.weight])
    }

    fn to_new_workout(&self) -> Option<domain::NewWorkout> {
        Some(domain::NewWorkout {
            date: self.date.validated.clone().ok()?,
            machine_id: self.machine.clone()?,
            sets: self.sets.validated.clone().ok()?,
            reps: self.reps.validated.clone().ok()?,
            weight: self.weight.validated.clone().ok()?,
        })
    }
}

#[component]
fn WorkoutLogger() -> Element {
    let machines = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_machines().await
    });
    let workouts = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_workouts().await
    });
    let mut form = use_signal(WorkoutForm::new);
    let mut is_loading = use_signal(|| false);

    let save = move |_| async move {
        let Some(workout) = form.read().to_new_workout() else {
            return;
        };
        *is_loading.write() = true;
        match DOMAIN_SERVICE.read().log_workout(workout).await {
            Ok(_) => {
                signal_changed_data();
            }
            Err(err) => notify(format!("Failed to log workout: {err}")),
        }
        *is_loading.write() = false;
    };

    let machines = match &*machines.read() {
        Some(Ok(machines)) => machines.clone(),
        Some(Err(err)) => return read_failure(err),
        None => return rsx! { Loading {} },
    };
    let selected = form.read().machine.clone();

    rsx! {
        Title { title: "Log workout" }
        div {
            class: "box mx-3",
            SelectField {
                label: "Machine".to_string(),
                options: std::iter::once(rsx! {
                    SelectOption { text: "Select a machine", value: "", selected: selected.is_none() }
                })
                .chain(machines.iter().map(|machine| rsx! {
                    SelectOption {
                        text: machine.label(),
                        value: machine.id.to_string(),
                        selected: selected.as_ref() == Some(&machine.id),
                    }
                }))
                .collect::<Vec<_>>(),
                has_changed: false,
                onchange: move |event: FormEvent| {
                    let value = event.value();
                    if value.is_empty() {
                        form.write().machine = None;
                    } else {
                        let history = match &*workouts.read() {
                            Some(Ok(workouts)) => workouts.clone(),
                            _ => vec![],
                        };
                        form.write().select_machine(domain::MachineID::from(value), &history);
                    }
                }
            }
            div {
                class: "columns is-mobile is-multiline",
                div {
                    class: "column is-half-mobile",
                    InputField {
                        label: "Sets".to_string(),
                        inputmode: "numeric".to_string(),
                        value: form.read().sets.input.clone(),
                        error: if let Err(err) = &form.read().sets.validated { err.clone() },
                        has_changed: form.read().sets.changed(),
                        has_text_right: true,
                        oninput: move |event: FormEvent| {
                            form.write().sets.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_sets(v));
                        }
                    }
                }
                div {
                    class: "column is-half-mobile",
                    InputField {
                        label: "Reps".to_string(),
                        inputmode: "numeric".to_string(),
                        value: form.read().reps.input.clone(),
                        error: if let Err(err) = &form.read().reps.validated { err.clone() },
                        has_changed: form.read().reps.changed(),
                        has_text_right: true,
                        oninput: move |event: FormEvent| {
                            form.write().reps.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_reps(v));
                        }
                    }
                }
                div {
                    class: "column is-half-mobile",
                    InputField {
                        label: "Weight (kg)".to_string(),
                        inputmode: "decimal".to_string(),
                        value: form.read().weight.input.clone(),
                        error: if let Err(err) = &form.read().weight.validated { err.clone() },
                        has_changed: form.read().weight.changed(),
                        has_text_right: true,
                        oninput: move |event: FormEvent| {
                            form.write().weight.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_weight(v));
                        }
                    }
                }
                div {
                    class: "column is-half-mobile",
                    InputField {
                        label: "Date".to_string(),
                        r#type: "date".to_string(),
                        max: Local::now().date_naive().to_string(),
                        value: form.read().date.input.clone(),
                        error: if let Err(err) = &form.read().date.validated { err.clone() },
                        has_changed: form.read().date.changed(),
                        oninput: move |event: FormEvent| {
                            form.write().date.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_date(v));
                        }
                    }
                }
            }
            div {
                class: "field is-grouped is-grouped-centered",
                div {
                    class: "control",
                    button {
                        class: "button is-primary",
                        class: if is_loading() { "is-loading" },
                        disabled: !form.read().is_valid(),
                        onclick: save,
                        Icon { name: "plus" }
                        span { "Log" }
                    }
                }
            }
        }
    }
}

#[component]
fn TodaysWorkouts() -> Element {
    let workouts = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_workouts().await
    });
    let mut delete_candidate = use_signal(|| None::<domain::WorkoutRecord>);
    let mut is_loading = use_signal(|| false);
    let today = Local::now().date_naive();

    let delete = move |_| async move {
        let Some(workout) = delete_candidate.read().clone() else {
            return;
        };
        *is_loading.write() = true;
        match DOMAIN_SERVICE.read().delete_workout(&workout.id).await {
            Ok(_) => signal_changed_data(),
            Err(err) => notify(format!("Failed to delete workout: {err}")),
        }
        *is_loading.write() = false;
        *delete_candidate.write() = None;
    };

    rsx! {
        Title { title: "Today" }
        match &*workouts.read() {
            Some(Ok(workouts)) => {
                let todays = workouts.iter().filter(|w| w.date == today).cloned().collect::<Vec<_>>();
                if todays.is_empty() {
                    rsx! { NoData {} }
                } else {
                    rsx! {
                        Table {
                            head: vec![rsx! { "Machine" }, rsx! { "Sets × Reps" }, rsx! { "Weight" }, rsx! {}],
                            body: todays.into_iter().map(|workout| {
                                let candidate = workout.clone();
                                vec![
                                    rsx! { "{workout.machine_name}" },
                                    rsx! { "{workout.sets} × {workout.reps}" },
                                    rsx! { "{workout.weight} kg" },
                                    rsx! {
                                        a {
                                            class: "has-text-danger",
                                            onclick: move |_| { *delete_candidate.write() = Some(candidate.clone()); },
                                            Icon { name: "trash" }
                                        }
                                    },
                                ]
                            }).collect::<Vec<_>>()
                        }
                    }
                }
            }
            Some(Err(err)) => read_failure(err),
            None => rsx! { Loading {} },
        }
        if let Some(workout) = delete_candidate() {
            DeleteConfirmationDialog {
                element_type: "workout",
                element_name: rsx! { "{workout.machine_name} ({workout.date})" },
                delete_event: delete,
                cancel_event: move |_| { *delete_candidate.write() = None; },
                is_loading: is_loading(),
            }
        }
    }
}
