use std::path::PathBuf;

use fleetdesk_core::binding::parse_initial_values;

/// Default backend origin.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// Backend origin that relative listing URLs resolve against.
    pub base_url: String,
    /// Detail URL of the listing to inspect.
    pub listing_url: String,
    /// Optional JSON array of city entries used for geocoding destinations.
    pub cities_file: Option<PathBuf>,
    /// Destination seeds for the trip list.
    pub destinations: Vec<String>,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl ConsoleConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                          | Default                  |
    /// |----------------------------------|--------------------------|
    /// | `FLEETDESK_BASE_URL`             | `http://localhost:5000`  |
    /// | `FLEETDESK_LISTING_URL`          | required                 |
    /// | `FLEETDESK_CITIES_FILE`          | unset                    |
    /// | `FLEETDESK_DESTINATIONS`         | `[]` (JSON array)        |
    /// | `FLEETDESK_REQUEST_TIMEOUT_SECS` | `30`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let base_url = non_empty("FLEETDESK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let listing_url =
            non_empty("FLEETDESK_LISTING_URL").ok_or(ConfigError::Missing("FLEETDESK_LISTING_URL"))?;

        let cities_file = non_empty("FLEETDESK_CITIES_FILE").map(PathBuf::from);

        let destinations = parse_initial_values(non_empty("FLEETDESK_DESTINATIONS").as_deref());

        let request_timeout_secs = match non_empty("FLEETDESK_REQUEST_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "FLEETDESK_REQUEST_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            base_url,
            listing_url,
            cities_file,
            destinations,
            request_timeout_secs,
        })
    }
}
