use chrono::{Days, NaiveDate};
use log::error;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub theme: Theme,
    pub notifications: bool,
    #[serde(default)]
    pub default_interval: Interval,
}

impl Settings {
    #[must_use]
    pub fn current_theme(&self) -> Theme {
        match self.theme {
            Theme::System => {
                let Some(window) = web_sys::window() else {
                    error!("failed to access window to determine preferred color scheme");
                    return Theme::Light;
                };
                match window.match_media("(prefers-color-scheme: dark)") {
                    Ok(Some(media_query_list)) => {
                        if media_query_list.matches() {
                            Theme::Dark
                        } else {
                            Theme::Light
                        }
                    }
                    Ok(None) => {
                        error!("failed to determine preferred color scheme");
                        Theme::Light
                    }
                    Err(_) => {
                        error!("failed to match media to determine preferred color scheme");
                        Theme::Light
                    }
                }
            }
            Theme::Light | Theme::Dark => self.theme,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            notifications: false,
            default_interval: Interval::default(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    System,
    Light,
    Dark,
}

/// The date range preselected on the history page.
#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
    All,
}

impl Interval {
    pub const ALL: [Interval; 5] = [
        Interval::Week,
        Interval::Month,
        Interval::Quarter,
        Interval::Year,
        Interval::All,
    ];

    #[must_use]
    pub fn days(self) -> Option<u64> {
        match self {
            Interval::Week => Some(7),
            Interval::Month => Some(31),
            Interval::Quarter => Some(92),
            Interval::Year => Some(365),
            Interval::All => None,
        }
    }

    /// First date included in the interval ending today.
    #[must_use]
    pub fn first(self, today: NaiveDate) -> Option<NaiveDate> {
        self.days()
            .and_then(|days| today.checked_sub_days(Days::new(days - 1)))
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Interval::Week => "1W",
            Interval::Month => "1M",
            Interval::Quarter => "3M",
            Interval::Year => "1Y",
            Interval::All => "All",
        }
    }
}
