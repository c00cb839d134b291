#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use dioxus::prelude::*;
use futures_util::StreamExt;
use gloo_timers::future::IntervalStream;
use log::{debug, error, warn};

use ironlog_domain as domain;
use ironlog_storage as storage;
use ironlog_web_app as web_app;
use ironlog_web_app::cache::CacheService;

use component::{
    element::{Color, Dialog},
    navbar::Navbar,
};
use page::{
    admin::Admin, feedback::Feedback, history::History, home::Home, login::Login,
    machine::Machine, machines::Machines, not_found::NotFound, profile::Profile, root::Root,
    table::Table,
};

mod component;
mod page;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Navbar)]
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/home")]
    Home {},
    #[route("/history")]
    History {},
    #[route("/machines?:search")]
    Machines { search: String },
    #[route("/machine#:id")]
    Machine { id: String },
    #[route("/table")]
    Table {},
    #[route("/feedback")]
    Feedback {},
    #[route("/profile")]
    Profile {},
    #[route("/admin")]
    Admin {},
    #[route("/:..route")]
    NotFound { route: Vec<String> },
}

const FAVICON: Asset = asset!("/assets/favicon.svg");
const MAIN_CSS: Asset = asset!("/assets/main.css");
const SERVICE_WORKER: &str = "/service-worker.js";

/// Interval of the removal of expired cache entries.
const CACHE_CLEANUP_INTERVAL_MS: u32 = 60 * 60 * 1000;

static DOMAIN_SERVICE: GlobalSignal<
    domain::Service<storage::cached::CachedFirebase<storage::http::GlooNetSendRequest>>,
> = Signal::global(|| domain::Service::new(storage::cached::CachedFirebase::new()));
static WEB_APP_SERVICE: GlobalSignal<web_app::Service<storage::local_storage::LocalStorage>> =
    Signal::global(|| web_app::Service::new(storage::local_storage::LocalStorage));
static NOTIFICATIONS: GlobalSignal<Vec<String>> = Signal::global(Vec::new);
static NO_CONNECTION: GlobalSignal<bool> = Signal::global(|| false);
static DATA_CHANGED: GlobalSignal<usize> = Signal::global(|| 0);

fn main() {
    init_logging();
    dioxus::launch(App);
}

fn init_logging() {
    let _ = web_app::log::init(Arc::new(Mutex::new(storage::local_storage::LocalStorage)));
}

#[component]
fn App() -> Element {
    std::panic::set_hook(Box::new(|info| {
        error!("{info}");
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("main"))
            .map(|el| {
                el.set_inner_html(&format!("
                    <section class=\"section\">
                        <div class=\"container\">
                            <div class=\"message is-danger\">
                                <div class=\"message-header\">
                                    <p>Something went wrong</p>
                                </div>
                                <div class=\"message-body\">
                                    <div class=\"block\">
                                        An unexpected error occurred and the application cannot continue.
                                    </div>
                                    <div class=\"block\">
                                        <pre>{info}</pre>
                                    </div>
                                    <div class=\"block field is-grouped is-grouped-centered\">
                                        <button class=\"button\" onclick=\"location.reload()\">
                                            <span class=\"icon\">
                                                <i class=\"fa fa-arrow-rotate-right\"></i>
                                            </span>
                                            <span>Reload page</span>
                                        </button>
                                    </div>
                                </div>
                            </div>
                        </div>
                    </section>
                "));
                Some(())
            });
    }));

    use_hook(|| {
        if let Err(err) = web_app::service_worker::register(SERVICE_WORKER) {
            warn!("failed to register service worker: {err}");
        }
    });

    use_coroutine(|_: UnboundedReceiver<()>| async move {
        let mut interval = IntervalStream::new(CACHE_CLEANUP_INTERVAL_MS);
        loop {
            cleanup_cache();
            interval.next().await;
        }
    });

    rsx! {
        document::Link { rel: "icon", href: FAVICON }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        div {
            class: "container is-max-desktop py-4",
            Router::<Route> {},
            Notification {}
        }
    }
}

fn cleanup_cache() {
    match WEB_APP_SERVICE.read().cleanup_cache(Utc::now()) {
        Ok(removed) => debug!("cache cleanup removed {removed} entries"),
        Err(err) => warn!("cache cleanup failed: {err}"),
    }
}

/// Forwards service worker events to the router.
///
/// Must be rendered inside the router, as navigation requires its context.
#[component]
fn ServiceWorkerEvents() -> Element {
    let navigator = use_navigator();
    let links = use_coroutine(move |mut rx: UnboundedReceiver<String>| async move {
        while let Some(link) = rx.next().await {
            navigator.push(link);
        }
    });

    use_hook(move || {
        let tx = links.tx();
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
        let result = web_app::service_worker::listen(move |event| match event {
            web_app::service_worker::Event::Push { payload } => {
                if let Err(err) = web_app::service_worker::post(&payload.to_message()) {
                    warn!("failed to show push notification: {err}");
                }
            }
            web_app::service_worker::Event::Navigate { link } => {
                match web_app::service_worker::resolve_link(&origin, &link) {
                    web_app::service_worker::Link::Internal(path) => {
                        if let Err(err) = tx.unbounded_send(path) {
                            warn!("failed to navigate to {link}: {err}");
                        }
                    }
                    web_app::service_worker::Link::External(url) => {
                        if let Some(window) = web_sys::window() {
                            if let Err(err) = window.location().set_href(&url) {
                                warn!("failed to open {url}: {err:?}");
                            }
                        }
                    }
                }
            }
        });
        if let Err(err) = result {
            debug!("service worker events unavailable: {err}");
        }
    });

    rsx! {}
}

#[component]
fn Notification() -> Element {
    let notification = NOTIFICATIONS.read().last().cloned();

    rsx! {
        if let Some(message) = notification {
            Dialog {
                color: Color::Danger,
                title: rsx! { "Error" },
                close_event: move |_| { let _ = NOTIFICATIONS.write().pop(); },
                div {
                    class: "block",
                    "{message}"
                }
                div {
                    class: "field is-grouped is-grouped-centered",
                    div {
                        class: "control",
                        button {
                            class: "button is-danger",
                            onclick: move |_| { let _ = NOTIFICATIONS.write().pop(); },
                            "Close"
                        }
                    }
                }
            }
        }
    }
}

/// Redirects to the login page if nobody is signed in.
#[macro_export]
macro_rules! ensure_session {
    () => {{
        let session = use_resource(|| async {
            let _ = DATA_CHANGED.read();
            DOMAIN_SERVICE.read().get_session().await
        });
        match *session.read() {
            Some(Err(domain::ReadError::Storage(domain::StorageError::NoConnection))) => {
                *NO_CONNECTION.write() = true;
            }
            Some(Err(_)) => {
                navigator().push(Route::Login {});
            }
            _ => {}
        }
        session
    }};
}

/// Redirects members to the home page and anonymous visitors to the login page.
#[macro_export]
macro_rules! ensure_admin {
    () => {{
        let session = ensure_session!();
        if let Some(Ok(ref session)) = *session.read() {
            if !session.is_admin() {
                navigator().push(Route::Home {});
            }
        }
        session
    }};
}

fn signal_changed_data() {
    *DATA_CHANGED.write() += 1;
}

fn notify(message: String) {
    NOTIFICATIONS.write().push(message);
}
