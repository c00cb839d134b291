use std::collections::HashMap;

use serde::Deserialize;
use wasm_bindgen::{JsCast, closure::Closure};

pub const DEFAULT_TITLE: &str = "IronLog";

#[derive(serde::Serialize, Debug, PartialEq)]
#[serde(tag = "task", content = "content")]
pub enum Message {
    UpdateCache,
    ShowNotification {
        title: String,
        options: HashMap<String, String>,
    },
    CloseNotifications,
}

#[allow(clippy::missing_errors_doc)]
pub fn post(message: &Message) -> Result<(), String> {
    let Some(window) = web_sys::window() else {
        return Err("failed to get window".to_string());
    };
    let Some(service_worker) = window.navigator().service_worker().controller() else {
        return Err("failed to get service worker".to_string());
    };
    match serde_wasm_bindgen::to_value(message) {
        Ok(json_message) => {
            let Err(err) = service_worker.post_message(&json_message) else {
                return Ok(());
            };
            Err(format!("failed to post message to service worker: {err:?}"))
        }
        Err(err) => Err(format!(
            "failed to prepare message for service worker: {err}"
        )),
    }
}

/// Messages sent by the service worker to open pages.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// A push message that arrived while a page was focused.
    Push { payload: PushPayload },
    /// A notification was clicked and this page was focused to show its link.
    Navigate { link: String },
}

/// Push message as delivered by the hosted messaging service.
#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct PushPayload {
    #[serde(default)]
    pub notification: Option<PushNotification>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct PushNotification {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
}

impl PushPayload {
    #[must_use]
    pub fn title(&self) -> String {
        self.notification
            .as_ref()
            .and_then(|n| n.title.clone())
            .or_else(|| self.data.get("title").cloned())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    #[must_use]
    pub fn body(&self) -> Option<String> {
        self.notification
            .as_ref()
            .and_then(|n| n.body.clone())
            .or_else(|| self.data.get("body").cloned())
    }

    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.data.get("link").map(String::as_str)
    }

    #[must_use]
    pub fn to_message(&self) -> Message {
        let mut options = HashMap::new();
        if let Some(body) = self.body() {
            options.insert("body".to_string(), body);
        }
        if let Some(icon) = self.notification.as_ref().and_then(|n| n.icon.clone()) {
            options.insert("icon".to_string(), icon);
        }
        if let Some(link) = self.link() {
            options.insert("data".to_string(), link.to_string());
        }
        Message::ShowNotification {
            title: self.title(),
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// A path within the app, e.g. `/table`.
    Internal(String),
    External(String),
}

/// Classifies a notification link relative to the origin of the app.
#[must_use]
pub fn resolve_link(origin: &str, link: &str) -> Link {
    let origin = origin.trim_end_matches('/');
    if link.starts_with('/') && !link.starts_with("//") {
        return Link::Internal(link.to_string());
    }
    match link.strip_prefix(origin) {
        Some("") => Link::Internal("/".to_string()),
        Some(path) if path.starts_with('/') => Link::Internal(path.to_string()),
        _ => Link::External(link.to_string()),
    }
}

/// Registers the worker script, which must be served from the root to control all pages.
#[allow(clippy::missing_errors_doc)]
pub fn register(script_url: &str) -> Result<(), String> {
    let Some(window) = web_sys::window() else {
        return Err("failed to get window".to_string());
    };
    // The registration completes in the background and is retried on every start.
    let _registration = window.navigator().service_worker().register(script_url);
    Ok(())
}

/// Calls `handler` for every message the service worker sends to this page.
///
/// The listener lives as long as the page.
#[allow(clippy::missing_errors_doc)]
pub fn listen(handler: impl Fn(Event) + 'static) -> Result<(), String> {
    let Some(window) = web_sys::window() else {
        return Err("failed to get window".to_string());
    };
    let container = window.navigator().service_worker();
    let closure = Closure::<dyn Fn(web_sys::MessageEvent)>::new(move |event: web_sys::MessageEvent| {
        match serde_wasm_bindgen::from_value::<Event>(event.data()) {
            Ok(event) => handler(event),
            Err(err) => log::warn!("ignoring unknown service worker message: {err}"),
        }
    });
    container.set_onmessage(Some(closure.as_ref().unchecked_ref()));
    closure.forget();
    Ok(())
}
