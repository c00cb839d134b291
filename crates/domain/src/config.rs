use crate::{Email, ReadError, UpdateError};

pub const DEFAULT_GYM_NAME: &str = "IronLog Gym";

#[allow(async_fn_in_trait)]
pub trait ConfigService {
    /// The stored configuration, or the defaults if none has been stored yet.
    async fn get_config(&self) -> Result<Config, ReadError>;
    async fn replace_config(&self, config: Config) -> Result<Config, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait ConfigRepository {
    async fn read_config(&self) -> Result<Config, ReadError>;
    async fn replace_config(&self, config: Config) -> Result<Config, UpdateError>;
}

/// Gym-wide display settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gym_name: String,
    pub contact_email: Option<Email>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gym_name: DEFAULT_GYM_NAME.to_string(),
            contact_email: None,
        }
    }
}
