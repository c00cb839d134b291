use dioxus::prelude::*;

use ironlog_domain as domain;
use ironlog_domain::SessionService;
use ironlog_web_app as web_app;
use ironlog_web_app::SettingsService;

use crate::{
    DATA_CHANGED, DOMAIN_SERVICE, NO_CONNECTION, Route, ServiceWorkerEvents, WEB_APP_SERVICE,
    component::element::{Color, Dialog, ElementWithDescription, ErrorMessage, Icon, Loading},
    notify, signal_changed_data,
};

#[component]
pub fn Navbar() -> Element {
    let mut menu_visible = use_signal(|| false);
    let mut settings_visible = use_signal(|| false);
    let session = use_resource(|| async {
        let _ = DATA_CHANGED.read();
        DOMAIN_SERVICE.read().get_session().await
    });
    let mut settings = use_resource(|| async { WEB_APP_SERVICE.read().get_settings().await });
    let navigator = use_navigator();

    use_effect(move || {
        if let Some(Ok(settings)) = &*settings.read() {
            apply_theme(settings.current_theme());
        }
    });

    let session = match *session.read() {
        Some(Ok(ref session)) => Some(session.clone()),
        Some(Err(domain::ReadError::Storage(domain::StorageError::NoConnection))) => {
            *NO_CONNECTION.write() = true;
            None
        }
        Some(Err(_)) | None => None,
    };
    let is_admin = session.as_ref().is_some_and(domain::Session::is_admin);
    let route = use_route::<Route>();
    let page_title = match route {
        Route::Root {} | Route::Login {} | Route::NotFound { .. } => "IronLog",
        Route::Home {} => "Home",
        Route::History {} => "History",
        Route::Machines { .. } => "Machines",
        Route::Machine { .. } => "Machine",
        Route::Table {} => "Training table",
        Route::Feedback {} => "Feedback",
        Route::Profile {} => "Profile",
        Route::Admin {} => "Administration",
    };
    let go_up_target = match route {
        Route::Root {} | Route::Login {} | Route::Home {} => None,
        Route::Machine { .. } => Some(Route::Machines {
            search: String::new(),
        }),
        Route::History {}
        | Route::Machines { .. }
        | Route::Table {}
        | Route::Feedback {}
        | Route::Profile {}
        | Route::Admin {}
        | Route::NotFound { .. } => Some(Route::Root {}),
    };
    let mut go = move |route: Route| {
        *menu_visible.write() = false;
        navigator.push(route);
    };

    rsx! {
        nav {
            class: "navbar is-fixed-top is-primary has-shadow has-text-weight-bold",
            div {
                class: "container",
                div {
                    class: "navbar-brand is-flex-grow-1",
                    a {
                        class: "navbar-item is-size-5",
                        class: if go_up_target.is_none() { "has-text-primary" },
                        Icon {
                            name: "chevron-left",
                            onclick: {
                                let go_up_target = go_up_target.clone();
                                move |_| {
                                    if let Some(go_up_target) = &go_up_target {
                                        navigator.push(go_up_target.clone());
                                    }
                                }
                            },
                        }
                    }
                    div { class: "navbar-item is-size-5", "{page_title}" }
                    div { class: "mx-auto" }
                    if NO_CONNECTION() {
                        a {
                            class: "navbar-item",
                            class: "is-size-5",
                            class: "mx-1",
                            ElementWithDescription {
                                description: "No connection to server",
                                right_aligned: true,
                                Icon { name: "plug-circle-xmark" }
                            }
                        }
                    }
                    a {
                        aria_expanded: menu_visible(),
                        aria_label: "menu",
                        class: "navbar-burger ml-0",
                        class: if menu_visible() { "is-active" },
                        role: "button",
                        onclick: move |_| { *menu_visible.write() = !menu_visible() },
                        span { aria_hidden: "true" }
                        span { aria_hidden: "true" }
                        span { aria_hidden: "true" }
                        span { aria_hidden: "true" }
                    }
                }
                div {
                    class: "navbar-menu is-flex-grow-0",
                    class: if menu_visible() { "is-active" },
                    div {
                        class: "navbar-end",
                        if session.is_some() {
                            a {
                                class: "navbar-item",
                                onclick: move |_| go(Route::Home {}),
                                Icon { name: "house", px: 5 }
                                "Home"
                            }
                            a {
                                class: "navbar-item",
                                onclick: move |_| go(Route::History {}),
                                Icon { name: "chart-line", px: 5 }
                                "History"
                            }
                            a {
                                class: "navbar-item",
                                onclick: move |_| go(Route::Machines { search: String::new() }),
                                Icon { name: "dumbbell", px: 5 }
                                "Machines"
                            }
                            a {
                                class: "navbar-item",
                                onclick: move |_| go(Route::Table {}),
                                Icon { name: "table-list", px: 5 }
                                "Training table"
                            }
                            a {
                                class: "navbar-item",
                                onclick: move |_| go(Route::Feedback {}),
                                Icon { name: "comment", px: 5 }
                                "Feedback"
                            }
                            a {
                                class: "navbar-item",
                                onclick: move |_| go(Route::Profile {}),
                                Icon { name: "user", px: 5 }
                                "Profile"
                            }
                            if is_admin {
                                a {
                                    class: "navbar-item",
                                    onclick: move |_| go(Route::Admin {}),
                                    Icon { name: "gears", px: 5 }
                                    "Administration"
                                }
                            }
                        }
                        a {
                            class: "navbar-item",
                            onclick: move |_| {
                                *settings_visible.write() = true;
                                *menu_visible.write() = false;
                            },
                            Icon { name: "gear", px: 5 }
                            "Settings"
                        }
                        if let Some(session) = session {
                            a {
                                class: "navbar-item",
                                onclick: move |_| async move {
                                    match DOMAIN_SERVICE.read().sign_out().await {
                                        Ok(()) => {
                                            signal_changed_data();
                                            navigator.push(Route::Login {});
                                        }
                                        Err(err) => notify(format!("Failed to sign out: {err}")),
                                    }
                                    *menu_visible.write() = false;
                                },
                                Icon { name: "sign-out-alt", px: 5 }
                                "Sign out ({session.email})"
                            }
                        }
                    }
                }
            }
        }

        if *settings_visible.read() {
            Settings {
                settings_resource: settings,
                close: move |()| {
                    *settings_visible.write() = false;
                    settings.restart();
                },
            }
        }

        ServiceWorkerEvents {}

        Outlet::<Route> {}
    }
}

fn apply_theme(theme: web_app::Theme) {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    let value = match theme {
        web_app::Theme::Dark => "dark",
        web_app::Theme::Light | web_app::Theme::System => "light",
    };
    if let Err(err) = element.set_attribute("data-theme", value) {
        log::warn!("failed to apply theme: {err:?}");
    }
}

#[component]
fn Settings(
    settings_resource: Resource<Result<web_app::Settings, String>>,
    close: EventHandler<()>,
) -> Element {
    let save = move |settings: web_app::Settings| async move {
        if let Err(err) = WEB_APP_SERVICE.write().set_settings(settings).await {
            notify(format!("Failed to save settings: {err}"));
        }
        let mut settings_resource = settings_resource;
        settings_resource.restart();
    };

    match settings_resource.read().clone() {
        Some(Ok(settings)) => rsx! {
            Dialog {
                color: Color::Primary,
                title: rsx! { "Settings" },
                close_event: move |_| close.call(()),
                div {
                    class: "mb-5",
                    h1 { class: "subtitle", "Theme" }
                    div {
                        class: "field has-addons",
                        for (theme, icon, name) in [
                            (web_app::Theme::Light, "sun", "Light"),
                            (web_app::Theme::Dark, "moon", "Dark"),
                            (web_app::Theme::System, "circle-half-stroke", "System"),
                        ] {
                            p {
                                class: "control",
                                button {
                                    class: "button",
                                    class: if settings.theme == theme { "is-link" },
                                    onclick: move |_| {
                                        let mut settings = settings;
                                        settings.theme = theme;
                                        save(settings)
                                    },
                                    Icon { name: icon, is_small: true }
                                    span { "{name}" }
                                }
                            }
                        }
                    }
                }
                div {
                    class: "mb-5",
                    h1 { class: "subtitle", "History interval" }
                    div {
                        class: "field has-addons",
                        for interval in web_app::Interval::ALL {
                            p {
                                class: "control",
                                button {
                                    class: "button",
                                    class: if settings.default_interval == interval { "is-link" },
                                    onclick: move |_| {
                                        let mut settings = settings;
                                        settings.default_interval = interval;
                                        save(settings)
                                    },
                                    "{interval.label()}"
                                }
                            }
                        }
                    }
                }
                div {
                    class: "mb-5",
                    onclick: move |_| {
                        let mut settings = settings;
                        settings.notifications = !settings.notifications;
                        save(settings)
                    },
                    h1 { class: "subtitle", "Notifications" }
                    if settings.notifications {
                        button { class: "button is-link", "Enabled" }
                    } else {
                        button { class: "button", "Disabled" }
                    }
                }
            }
        },
        Some(Err(err)) => rsx! {
            ErrorMessage { message: "Failed to get settings: {err}" }
        },
        None => rsx! { Loading {} },
    }
}
