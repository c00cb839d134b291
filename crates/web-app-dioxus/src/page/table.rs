use chrono::Local;
use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::{AssignedTableService, SessionService, WorkoutService};

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route,
    component::element::{
        self, Color, Icon, IconText, LoadingPage, Message, NoData, Title, local_date,
        read_failure, relative_date,
    },
    ensure_session, notify, signal_changed_data,
};

#[component]
pub fn Table() -> Element {
    let session = ensure_session!();

    match &*session.read() {
        Some(Ok(session)) => rsx! {
            TableView { user_id: session.user_id.clone() }
        },
        Some(Err(err)) => read_failure(err),
        None => rsx! { LoadingPage {} },
    }
}

#[component]
fn TableView(user_id: domain::UserID) -> Element {
    let tables = use_resource(use_reactive!(|user_id| async move {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_table_history(&user_id).await
    }));
    let workouts = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_workouts().await
    });
    let mut logging = use_signal(|| None::<usize>);

    let (tables, workouts) = match (&*tables.read(), &*workouts.read()) {
        (Some(Ok(tables)), Some(Ok(workouts))) => (tables.clone(), workouts.clone()),
        (Some(Err(err)), _) | (_, Some(Err(err))) => return read_failure(err),
        _ => return rsx! { LoadingPage {} },
    };
    let today = Local::now().date_naive();
    let (active, completed): (Vec<_>, Vec<_>) = tables.into_iter().partition(domain::AssignedTable::is_active);

    rsx! {
        match active.into_iter().next() {
            Some(table) => {
                let entries = table.entries.clone();
                rsx! {
                    Title { title: table.name.clone().unwrap_or_else(|| "Training table".to_string()) }
                    p {
                        class: "has-text-centered is-size-7 mb-3",
                        "Assigned {relative_date(local_date(table.created_at))}"
                    }
                    if entries.is_empty() {
                        NoData {}
                    }
                    for (index, entry) in entries.into_iter().enumerate() {
                        {
                            let done = logged_today(&workouts, &entry, today);
                            let workout = domain::NewWorkout {
                                date: today,
                                machine_id: entry.machine_id.clone(),
                                sets: entry.sets,
                                reps: entry.reps,
                                weight: entry.weight,
                            };
                            rsx! {
                                div {
                                    class: "box mx-3 px-4 py-3",
                                    div {
                                        class: "is-flex is-justify-content-space-between is-align-items-center",
                                        div {
                                            p {
                                                class: "has-text-weight-bold",
                                                "{entry.machine_name}"
                                            }
                                            if !entry.exercise_name.is_empty() {
                                                p { class: "is-size-7", "{entry.exercise_name}" }
                                            }
                                            p { "{entry.sets} × {entry.reps} · {entry.weight} kg" }
                                        }
                                        if done {
                                            IconText { icon: "check", text: "Done", color: Color::Success }
                                        } else {
                                            button {
                                                class: "button is-primary is-small",
                                                class: if logging() == Some(index) { "is-loading" },
                                                onclick: move |_| {
                                                    let workout = workout.clone();
                                                    async move {
                                                        *logging.write() = Some(index);
                                                        match DOMAIN_SERVICE.read().log_workout(workout).await {
                                                            Ok(_) => signal_changed_data(),
                                                            Err(err) => notify(format!("Failed to log workout: {err}")),
                                                        }
                                                        *logging.write() = None;
                                                    }
                                                },
                                                Icon { name: "plus" }
                                                span { "Log" }
                                            }
                                        }
                                    }
                                    if !entry.notes.is_empty() {
                                        p { class: "is-size-7 has-text-grey mt-2", "{entry.notes}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            None => rsx! {
                Message { color: Color::Info, "No training table has been assigned to you yet." }
            },
        }

        if !completed.is_empty() {
            Title { title: "Previous tables", class: "mt-5" }
            element::Table {
                head: vec![rsx! { "Table" }, rsx! { "Exercises" }, rsx! { "Assigned" }, rsx! { "Completed" }],
                body: completed.iter().map(|table| {
                    vec![
                        rsx! { "{table.name.clone().unwrap_or_default()}" },
                        rsx! { "{table.entries.len()}" },
                        rsx! { "{local_date(table.created_at)}" },
                        rsx! {
                            if let Some(completed_at) = table.completed_at {
                                "{local_date(completed_at)}"
                            }
                        },
                    ]
                }).collect::<Vec<_>>()
            }
        }
    }
}

fn logged_today(
    workouts: &[domain::WorkoutRecord],
    entry: &domain::TableEntry,
    today: chrono::NaiveDate,
) -> bool {
    workouts
        .iter()
        .any(|w| w.date == today && w.machine_id == entry.machine_id)
}
