use std::collections::BTreeMap;

use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::{CategoryService, MachineService, SessionService};

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route,
    component::{
        element::{
            Dialog, FloatingActionButton, Icon, LoadingPage, NoData, SearchBox, Table, Title,
            read_failure,
        },
        form::{
            FieldValue, FieldValueState, InputField, SelectField, SelectOption, TextAreaField,
        },
    },
    ensure_session, notify, signal_changed_data,
};

const UNCATEGORIZED: &str = "Other";

#[component]
pub fn Machines(search: String) -> Element {
    let session = ensure_session!();
    let machines = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_machines().await
    });
    let mut search_term = use_signal(|| search.clone());
    let mut form = use_signal(|| None::<MachineForm>);

    let is_admin = matches!(&*session.read(), Some(Ok(session)) if session.is_admin());

    match &*machines.read() {
        Some(Ok(machines)) => {
            let groups = group_by_category(machines, &search_term.read());
            rsx! {
                div {
                    class: "field is-grouped px-4",
                    SearchBox {
                        search_term: search_term(),
                        oninput: move |event: FormEvent| {
                            *search_term.write() = event.value();
                            navigator().replace(Route::Machines { search: event.value() });
                        }
                    }
                }
                if groups.is_empty() {
                    NoData {}
                }
                for (category, machines) in groups {
                    Title { title: category, class: "mt-4 mb-0" }
                    Table {
                        body: machines.into_iter().map(|machine| {
                            let id = machine.id.to_string();
                            vec![
                                rsx! {
                                    a {
                                        onclick: move |_| { navigator().push(Route::Machine { id: id.clone() }); },
                                        "{machine.label()}"
                                    }
                                },
                                rsx! {
                                    if !machine.ownership.is_global() {
                                        span { class: "tag is-info is-light", "personal" }
                                    }
                                },
                            ]
                        }).collect::<Vec<_>>()
                    }
                }
                if let Some(current) = form() {
                    MachineDialog {
                        form: current,
                        title: "Add machine",
                        may_be_global: is_admin,
                        onchange: move |f| *form.write() = Some(f),
                        close: move |()| *form.write() = None,
                        save: move |f: MachineForm| async move {
                            let Some(machine) = f.to_new_machine() else {
                                return;
                            };
                            match DOMAIN_SERVICE.read().create_machine(machine).await {
                                Ok(machine) => {
                                    *form.write() = None;
                                    signal_changed_data();
                                    navigator().push(Route::Machine { id: machine.id.to_string() });
                                }
                                Err(err) => notify(format!("Failed to add machine: {err}")),
                            }
                        },
                    }
                }
                FloatingActionButton {
                    icon: "plus".to_string(),
                    onclick: move |_| *form.write() = Some(MachineForm::new(is_admin)),
                }
            }
        }
        Some(Err(err)) => read_failure(err),
        None => rsx! { LoadingPage {} },
    }
}

/// Machines matching the search term grouped by category, uncategorized machines last.
fn group_by_category(machines: &[domain::Machine], search: &str) -> Vec<(String, Vec<domain::Machine>)> {
    let search = search.trim().to_lowercase();
    let mut groups: BTreeMap<(bool, String), Vec<domain::Machine>> = BTreeMap::new();

    for machine in machines
        .iter()
        .filter(|m| search.is_empty() || m.label().to_lowercase().contains(&search))
    {
        let key = match &machine.category {
            Some(category) => (false, category.clone()),
            None => (true, UNCATEGORIZED.to_string()),
        };
        groups.entry(key).or_default().push(machine.clone());
    }

    groups
        .into_iter()
        .map(|((_, category), machines)| (category, machines))
        .collect()
}

#[derive(Clone, PartialEq)]
pub struct MachineForm {
    pub id: domain::MachineID,
    pub name: FieldValue<domain::Name>,
    pub number: FieldValue<Option<domain::MachineNumber>>,
    pub category: String,
    pub description: String,
    pub global: bool,
}

impl MachineForm {
    pub fn new(global: bool) -> Self {
        Self {
            id: domain::MachineID::nil(),
            name: FieldValue::default(),
            number: FieldValue::from_option(None),
            category: String::new(),
            description: String::new(),
            global,
        }
    }

    pub fn from_machine(machine: &domain::Machine) -> Self {
        Self {
            id: machine.id.clone(),
            name: FieldValue::new(machine.name.clone()),
            number: FieldValue::from_option(machine.number),
            category: machine.category.clone().unwrap_or_default(),
            description: machine.description.clone(),
            global: machine.ownership.is_global(),
        }
    }

    pub fn is_valid(&self) -> bool {
        FieldValue::all_valid(&[&self.name as &dyn FieldValueState, &self.number])
    }

    fn category(&self) -> Option<String> {
        Some(self.category.trim().to_string()).filter(|c| !c.is_empty())
    }

    pub fn to_new_machine(&self) -> Option<domain::NewMachine> {
        Some(domain::NewMachine {
            name: self.name.validated.clone().ok()?,
            number: self.number.validated.clone().ok()?,
            category: self.category(),
            description: self.description.trim().to_string(),
            global: self.global,
        })
    }

    /// Applies the form to an existing machine, keeping its identity and media.
    pub fn apply(&self, machine: &domain::Machine) -> Option<domain::Machine> {
        Some(domain::Machine {
            name: self.name.validated.clone().ok()?,
            number: self.number.validated.clone().ok()?,
            category: self.category(),
            description: self.description.trim().to_string(),
            ..machine.clone()
        })
    }
}

#[component]
pub fn MachineDialog(
    form: MachineForm,
    title: String,
    may_be_global: bool,
    onchange: EventHandler<MachineForm>,
    close: EventHandler<()>,
    save: EventHandler<MachineForm>,
) -> Element {
    let categories = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_categories().await
    });
    let categories = match &*categories.read() {
        Some(Ok(categories)) => categories.clone(),
        Some(Err(err)) => {
            log::warn!("failed to get categories: {err}");
            vec![]
        }
        None => vec![],
    };

    rsx! {
        Dialog {
            title: rsx! { "{title}" },
            close_event: move |_| close.call(()),
            InputField {
                label: "Name".to_string(),
                value: form.name.input.clone(),
                error: if let Err(err) = &form.name.validated { err.clone() },
                has_changed: form.name.changed(),
                oninput: {
                    let form = form.clone();
                    move |event: FormEvent| {
                        let mut form = form.clone();
                        async move {
                            let id = form.id.clone();
                            let input = event.value();
                            form.name.input.clone_from(&input);
                            form.name.validated = DOMAIN_SERVICE
                                .read()
                                .validate_machine_name(&input, &id)
                                .await
                                .map_err(|err| err.to_string());
                            onchange.call(form);
                        }
                    }
                }
            }
            InputField {
                label: "Number".to_string(),
                inputmode: "numeric".to_string(),
                value: form.number.input.clone(),
                error: if let Err(err) = &form.number.validated { err.clone() },
                has_changed: form.number.changed(),
                oninput: {
                    let form = form.clone();
                    move |event: FormEvent| {
                        let mut form = form.clone();
                        form.number.update(event.value(), |v| DOMAIN_SERVICE.read().validate_machine_number(v));
                        onchange.call(form);
                    }
                }
            }
            SelectField {
                label: "Category".to_string(),
                options: std::iter::once(rsx! {
                    SelectOption { text: "None", value: "", selected: form.category.is_empty() }
                })
                .chain(categories.iter().map(|category| rsx! {
                    SelectOption {
                        text: category.clone(),
                        value: category.clone(),
                        selected: form.category == *category,
                    }
                }))
                .collect::<Vec<_>>(),
                has_changed: false,
                onchange: {
                    let form = form.clone();
                    move |event: FormEvent| {
                        let mut form = form.clone();
                        form.category = event.value();
                        onchange.call(form);
                    }
                }
            }
            TextAreaField {
                label: "Description".to_string(),
                value: form.description.clone(),
                has_changed: false,
                oninput: {
                    let form = form.clone();
                    move |event: FormEvent| {
                        let mut form = form.clone();
                        form.description = event.value();
                        onchange.call(form);
                    }
                }
            }
            if may_be_global {
                div {
                    class: "field",
                    label {
                        class: "checkbox",
                        input {
                            r#type: "checkbox",
                            checked: form.global,
                            onchange: {
                                let form = form.clone();
                                move |_| {
                                    let mut form = form.clone();
                                    form.global = !form.global;
                                    onchange.call(form);
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
                    onclick: move |_| close.call(()),
                    button { class: "button is-light is-soft", "Cancel" }
                }
                div {
                    class: "control",
                    button {
                        class: "button is-primary",
                        disabled: !form.is_valid(),
                        onclick: {
                            let form = form.clone();
                            move |_| save.call(form.clone())
                        },
                        Icon { name: "check" }
                        span { "Save" }
                    }
                }
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

    fn machine(id: &str, name: &str, category: Option<&str>) -> domain::Machine {
        domain::Machine {
            id: domain::MachineID::from(id),
            name: domain::Name::new(name).unwrap(),
            number: None,
            category: category.map(ToString::to_string),
            description: String::new(),
            media_url: None,
            ownership: domain::Ownership::Global,
            created_at: DateTime::default(),
        }
    }

    #[rstest]
    #[case("", vec![("Legs", vec!["1", "3"]), ("Other", vec!["2"])])]
    #[case("PRESS", vec![("Legs", vec!["1"])])]
    #[case("row", vec![("Other", vec!["2"])])]
    #[case("bench", vec![])]
    fn test_group_by_category(#[case] search: &str, #[case] expected: Vec<(&str, Vec<&str>)>) {
        let machines = [
            machine("1", "Leg Press", Some("Legs")),
            machine("2", "Rowing", None),
            machine("3", "Leg Curl", Some("Legs")),
        ];

        assert_eq!(
            group_by_category(&machines, search)
                .into_iter()
                .map(|(category, machines)| (
                    category,
                    machines.iter().map(|m| m.id.to_string()).collect::<Vec<_>>()
                ))
                .collect::<Vec<_>>(),
            expected
                .into_iter()
                .map(|(category, ids)| (
                    category.to_string(),
                    ids.into_iter().map(ToString::to_string).collect::<Vec<_>>()
                ))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_machine_form_apply_keeps_media() {
        let mut original = machine("1", "Leg Press", None);
        original.media_url = Some("https://example.com/press.jpg".to_string());
        let mut form = MachineForm::from_machine(&original);
        form.name = FieldValue::new(domain::Name::new("Leg Press 2").unwrap());
        form.category = " Legs ".to_string();

        let machine = form.apply(&original).unwrap();

        assert_eq!(machine.name.as_str(), "Leg Press 2");
        assert_eq!(machine.category, Some("Legs".to_string()));
        assert_eq!(machine.media_url, original.media_url);
    }
}
