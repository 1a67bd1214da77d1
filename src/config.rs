use anyhow::{Context, Result};
use std::{env, path::PathBuf, sync::OnceLock, time::Duration};

/// Application configuration loaded and validated at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Controller the UI talks to
    pub device: DeviceConfig,

    /// Poll controller defaults
    pub poll: PollConfig,

    /// Page behaviour
    pub ui: UiConfig,

    /// Local state (the `loggedIn` flag)
    pub paths: PathConfig,
}

#[derive(Clone, Debug)]
pub struct DeviceConfig {
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub backoff: Duration,
    pub request_timeout: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiConfig {
    pub banner_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct PathConfig {
    pub state_dir: PathBuf,
    pub session_file: PathBuf,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            backoff: Duration::from_millis(2000),
            request_timeout: Duration::from_millis(4000),
        }
    }
}

impl AppConfig {
    /// Get or load the application configuration
    ///
    /// On first call all values are read from environment variables; later calls return
    /// the cached instance.
    ///
    /// # Panics
    /// Panics if configuration loading fails. Use [`AppConfig::load`] to handle the
    /// error instead.
    pub fn get() -> &'static Self {
        static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
        APP_CONFIG.get_or_init(|| Self::load().expect("failed to load application configuration"))
    }

    pub fn load() -> Result<Self> {
        Ok(Self {
            device: DeviceConfig::load()?,
            poll: PollConfig::load()?,
            ui: UiConfig::load()?,
            paths: PathConfig::load()?,
        })
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map(Duration::from_millis)
            .with_context(|| format!("failed to parse {name}: invalid format")),
        Err(_) => Ok(default),
    }
}

impl DeviceConfig {
    fn load() -> Result<Self> {
        let url = env::var("DEVICE_URL").unwrap_or_else(|_| "http://192.168.4.1".to_string());

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
        })
    }
}

impl PollConfig {
    fn load() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            interval: millis_var("POLL_INTERVAL_MS", defaults.interval)?,
            backoff: millis_var("POLL_BACKOFF_MS", defaults.backoff)?,
            request_timeout: millis_var("REQUEST_TIMEOUT_MS", defaults.request_timeout)?,
        })
    }
}

impl UiConfig {
    fn load() -> Result<Self> {
        Ok(Self {
            banner_timeout: millis_var(
                "BANNER_TIMEOUT_MS",
                crate::ui::banner::SHOW_BANNER_TIME,
            )?,
        })
    }
}

impl PathConfig {
    fn load() -> Result<Self> {
        let state_dir = env::var("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join(env!("CARGO_PKG_NAME")));

        std::fs::create_dir_all(&state_dir).context("failed to create state directory")?;

        let session_file = state_dir.join("session.json");

        Ok(Self {
            state_dir,
            session_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_defaults_match_controller_constants() {
        let poll = PollConfig::default();

        assert_eq!(poll.interval, Duration::from_millis(1000));
        assert_eq!(poll.backoff, Duration::from_millis(2000));
        assert_eq!(poll.request_timeout, Duration::from_millis(4000));
    }

    #[test]
    fn millis_var_falls_back_to_default() {
        let value = millis_var(
            "RGBW_UI_TEST_UNSET_VARIABLE",
            Duration::from_millis(1234),
        )
        .unwrap();

        assert_eq!(value, Duration::from_millis(1234));
    }
}
