use chrono::{Local, NaiveDate};
use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::{SessionService, WorkoutService};
use ironlog_web_app as web_app;
use ironlog_web_app::SettingsService;

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route, WEB_APP_SERVICE,
    component::{
        element::{
            Chart, ChartLabel, DataBox, DeleteConfirmationDialog, Dialog, Icon,
            LoadingPage, MenuOption, NoData, OptionsMenu, Table, Title, read_failure,
        },
        form::{FieldValue, FieldValueState, InputField, SelectField, SelectOption},
    },
    ensure_session, notify, signal_changed_data,
};

#[component]
pub fn History() -> Element {
    let session = ensure_session!();
    let workouts = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_workouts().await
    });
    let settings = use_resource(|| async { WEB_APP_SERVICE.read().get_settings().await });

    let settings = match &*settings.read() {
        Some(Ok(settings)) => *settings,
        Some(Err(err)) => {
            log::warn!("failed to read settings: {err}");
            web_app::Settings::default()
        }
        None => return rsx! { LoadingPage {} },
    };

    match (&*session.read(), &*workouts.read()) {
        (Some(Ok(_)), Some(Ok(workouts))) => rsx! {
            HistoryView { workouts: workouts.clone(), settings }
        },
        (Some(Err(err)), _) | (_, Some(Err(err))) => read_failure(err),
        _ => rsx! { LoadingPage {} },
    }
}

#[component]
fn HistoryView(workouts: Vec<domain::WorkoutRecord>, settings: web_app::Settings) -> Element {
    let today = Local::now().date_naive();
    let mut filter = use_signal(|| domain::HistoryFilter {
        machine: None,
        from: settings.default_interval.first(today),
        to: None,
    });
    let mut interval = use_signal(|| Some(settings.default_interval));
    let mut dialog = use_signal(|| RecordDialog::None);

    let history = domain::History::new(&workouts, &filter.read());
    let machines = domain::max_weight_by_machine(&workouts);
    let selected_machine = filter.read().machine.clone();

    let (data, label) = match &selected_machine {
        Some(machine_id) => (
            web_app::chart::PlotData {
                values: history.series.clone(),
                plots: web_app::chart::plot_line_with_points(web_app::chart::COLOR_WEIGHT),
            },
            ChartLabel {
                name: machines
                    .iter()
                    .find(|m| m.machine_id == *machine_id)
                    .map_or_else(
                        || "Max. weight".to_string(),
                        |m| format!("{} (max. weight)", m.machine_name),
                    ),
                color: web_app::chart::COLOR_WEIGHT,
                opacity: web_app::chart::OPACITY_LINE,
            },
        ),
        None => (
            web_app::chart::PlotData {
                values: daily_volume(&history.groups),
                plots: web_app::chart::plot_histogram(web_app::chart::COLOR_VOLUME),
            },
            ChartLabel {
                name: "Volume (kg)".to_string(),
                color: web_app::chart::COLOR_VOLUME,
                opacity: web_app::chart::OPACITY_AREA,
            },
        ),
    };
    let chart =
        web_app::chart::plot(&[data], &settings.current_theme()).map_err(|err| err.to_string());

    rsx! {
        div {
            class: "box mx-3",
            SelectField {
                label: "Machine".to_string(),
                options: std::iter::once(rsx! {
                    SelectOption { text: "All machines", value: "", selected: selected_machine.is_none() }
                })
                .chain(machines.iter().map(|m| rsx! {
                    SelectOption {
                        text: m.machine_name.clone(),
                        value: m.machine_id.to_string(),
                        selected: selected_machine.as_ref() == Some(&m.machine_id),
                    }
                }))
                .collect::<Vec<_>>(),
                has_changed: false,
                onchange: move |event: FormEvent| {
                    let value = event.value();
                    filter.write().machine = if value.is_empty() { None } else { Some(domain::MachineID::from(value)) };
                }
            }
            div {
                class: "field has-addons has-addons-centered",
                for option in web_app::Interval::ALL {
                    p {
                        class: "control",
                        a {
                            class: "button is-small",
                            class: if interval() == Some(option) { "is-link" },
                            onclick: move |_| {
                                *interval.write() = Some(option);
                                let mut filter = filter.write();
                                filter.from = option.first(Local::now().date_naive());
                                filter.to = None;
                            },
                            "{option.label()}"
                        }
                    }
                }
            }
            div {
                class: "columns is-mobile",
                div {
                    class: "column",
                    DateFilter {
                        label: "From",
                        value: filter.read().from,
                        onchange: move |date| {
                            *interval.write() = None;
                            filter.write().from = date;
                        }
                    }
                }
                div {
                    class: "column",
                    DateFilter {
                        label: "To",
                        value: filter.read().to,
                        onchange: move |date| {
                            *interval.write() = None;
                            filter.write().to = date;
                        }
                    }
                }
            }
        }

        div {
            class: "is-flex is-justify-content-center is-flex-wrap-wrap",
            DataBox { title: "Sessions", "{history.sessions}" }
            DataBox { title: "Sets", "{history.sets}" }
            DataBox { title: "Volume", "{history.volume:.0} kg" }
        }

        Chart {
            labels: vec![label],
            chart,
            no_data_label: false,
        }

        if !history.maxima.is_empty() {
            Title { title: "Personal records" }
            Table {
                head: vec![rsx! { "Machine" }, rsx! { "Weight" }, rsx! { "Date" }],
                body: history.maxima.iter().map(|max| {
                    vec![
                        rsx! { "{max.machine_name}" },
                        rsx! { "{max.weight} kg" },
                        rsx! { "{max.date}" },
                    ]
                }).collect::<Vec<_>>()
            }
        }

        Title { title: "Workouts" }
        if history.groups.is_empty() {
            NoData {}
        }
        for group in history.groups {
            div {
                class: "mx-3 mb-4",
                h2 { class: "subtitle is-6 has-text-weight-bold mb-1", "{group.date.format(\"%A, %Y-%m-%d\")}" }
                Table {
                    body: group.records.iter().map(|record| {
                        let record = record.clone();
                        vec![
                            rsx! { "{record.machine_name}" },
                            rsx! { "{record.sets} × {record.reps}" },
                            rsx! { "{record.weight} kg" },
                            rsx! {
                                a {
                                    class: "mx-2",
                                    onclick: move |_| { *dialog.write() = RecordDialog::Options(record.clone()); },
                                    Icon { name: "ellipsis-vertical" }
                                }
                            },
                        ]
                    }).collect::<Vec<_>>()
                }
            }
        }

        RecordDialogView { dialog }
    }
}

#[component]
fn DateFilter(
    label: String,
    value: Option<NaiveDate>,
    onchange: EventHandler<Option<NaiveDate>>,
) -> Element {
    rsx! {
        InputField {
            label,
            r#type: "date".to_string(),
            value: value.map(|date| date.to_string()).unwrap_or_default(),
            has_changed: false,
            oninput: move |event: FormEvent| {
                onchange.call(NaiveDate::parse_from_str(&event.value(), "%Y-%m-%d").ok());
            }
        }
    }
}

#[derive(Clone)]
enum RecordDialog {
    None,
    Options(domain::WorkoutRecord),
    Edit {
        record: domain::WorkoutRecord,
        sets: FieldValue<domain::Sets>,
        reps: FieldValue<domain::Reps>,
        weight: FieldValue<domain::Weight>,
    },
    Delete(domain::WorkoutRecord),
}

#[component]
fn RecordDialogView(dialog: Signal<RecordDialog>) -> Element {
    let mut is_loading = use_signal(|| false);
    let mut dialog = dialog;
    let close = move |_| *dialog.write() = RecordDialog::None;

    let save = move |_| async move {
        let RecordDialog::Edit { record, sets, reps, weight } = dialog.read().clone() else {
            return;
        };
        *is_loading.write() = true;
        let result = DOMAIN_SERVICE
            .read()
            .modify_workout(
                &record.id,
                sets.changed().then(|| sets.validated.clone().ok()).flatten(),
                reps.changed().then(|| reps.validated.clone().ok()).flatten(),
                weight.changed().then(|| weight.validated.clone().ok()).flatten(),
            )
            .await;
        *is_loading.write() = false;
        match result {
            Ok(_) => {
                signal_changed_data();
                *dialog.write() = RecordDialog::None;
            }
            Err(err) => notify(format!("Failed to edit workout: {err}")),
        }
    };

    let delete = move |_| async move {
        let RecordDialog::Delete(record) = dialog.read().clone() else {
            return;
        };
        *is_loading.write() = true;
        let result = DOMAIN_SERVICE.read().delete_workout(&record.id).await;
        *is_loading.write() = false;
        match result {
            Ok(_) => {
                signal_changed_data();
                *dialog.write() = RecordDialog::None;
            }
            Err(err) => notify(format!("Failed to delete workout: {err}")),
        }
    };

    match dialog.read().clone() {
        RecordDialog::None => rsx! {},
        RecordDialog::Options(record) => {
            let edit = record.clone();
            rsx! {
                OptionsMenu {
                    options: vec![rsx! {
                        MenuOption {
                            icon: "edit".to_string(),
                            text: "Edit workout".to_string(),
                            onclick: move |_| {
                                *dialog.write() = RecordDialog::Edit {
                                    record: edit.clone(),
                                    sets: FieldValue::new(edit.sets),
                                    reps: FieldValue::new(edit.reps),
                                    weight: FieldValue::new(edit.weight),
                                };
                            }
                        }
                        MenuOption {
                            icon: "times".to_string(),
                            text: "Delete workout".to_string(),
                            onclick: move |_| { *dialog.write() = RecordDialog::Delete(record.clone()); }
                        }
                    }],
                    close_event: close,
                }
            }
        }
        RecordDialog::Edit { record, sets, reps, weight } => rsx! {
            Dialog {
                title: rsx! { "{record.machine_name} ({record.date})" },
                close_event: close,
                InputField {
                    label: "Sets".to_string(),
                    inputmode: "numeric".to_string(),
                    value: sets.input.clone(),
                    error: if let Err(err) = &sets.validated { err.clone() },
                    has_changed: sets.changed(),
                    oninput: move |event: FormEvent| {
                        if let RecordDialog::Edit { sets, .. } = &mut *dialog.write() {
                            sets.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_sets(v));
                        }
                    }
                }
                InputField {
                    label: "Reps".to_string(),
                    inputmode: "numeric".to_string(),
                    value: reps.input.clone(),
                    error: if let Err(err) = &reps.validated { err.clone() },
                    has_changed: reps.changed(),
                    oninput: move |event: FormEvent| {
                        if let RecordDialog::Edit { reps, .. } = &mut *dialog.write() {
                            reps.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_reps(v));
                        }
                    }
                }
                InputField {
                    label: "Weight (kg)".to_string(),
                    inputmode: "decimal".to_string(),
                    value: weight.input.clone(),
                    error: if let Err(err) = &weight.validated { err.clone() },
                    has_changed: weight.changed(),
                    oninput: move |event: FormEvent| {
                        if let RecordDialog::Edit { weight, .. } = &mut *dialog.write() {
                            weight.update(event.value(), |v| DOMAIN_SERVICE.read().validate_workout_weight(v));
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
                        onclick: save,
                        button {
                            class: "button is-primary",
                            class: if is_loading() { "is-loading" },
                            disabled: !FieldValue::has_valid_changes(&[&sets as &dyn FieldValueState, &reps, &weight]),
                            "Save"
                        }
                    }
                }
            }
        },
        RecordDialog::Delete(record) => rsx! {
            DeleteConfirmationDialog {
                element_type: "workout",
                element_name: rsx! { "{record.machine_name} ({record.date})" },
                delete_event: delete,
                cancel_event: close,
                is_loading: is_loading(),
            }
        },
    }
}

fn daily_volume(groups: &[domain::DateGroup]) -> Vec<(NaiveDate, f32)> {
    let mut volume = groups
        .iter()
        .map(|g| (g.date, g.records.iter().map(domain::WorkoutRecord::volume).sum()))
        .collect::<Vec<_>>();
    volume.sort_by_key(|(date, _)| *date);
    volume
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(date: NaiveDate, sets: &str, reps: &str, weight: &str) -> domain::WorkoutRecord {
        domain::WorkoutRecord {
            id: domain::WorkoutID::from("w1"),
            user_id: domain::UserID::from("u1"),
            date,
            machine_id: domain::MachineID::from("m1"),
            machine_name: "Leg Press".to_string(),
            sets: domain::Sets::try_from(sets).unwrap(),
            reps: domain::Reps::try_from(reps).unwrap(),
            weight: domain::Weight::try_from(weight).unwrap(),
            created_at: DateTime::default(),
        }
    }

    #[test]
    fn test_daily_volume() {
        let day_1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let day_2 = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let groups = vec![
            domain::DateGroup {
                date: day_2,
                records: vec![record(day_2, "3", "10", "50"), record(day_2, "2", "5", "20")],
            },
            domain::DateGroup {
                date: day_1,
                records: vec![record(day_1, "1", "8", "40")],
            },
        ];

        assert_eq!(daily_volume(&groups), vec![(day_1, 320.0), (day_2, 1700.0)]);
        assert_eq!(daily_volume(&[]), vec![]);
    }
}
