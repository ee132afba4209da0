use log::LevelFilter;
use pool_api::DEFAULT_BASE_URL;
use std::time::Duration;

pub const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub api_base_url: String,
    pub refresh_interval: Duration,
    pub log_level: LevelFilter,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_owned(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            log_level: LevelFilter::Warn,
        }
    }
}

impl AppSettings {
    /// A zero refresh interval is bumped to one second.
    pub fn new(api_base_url: &str, refresh_secs: u64, verbose: bool) -> Self {
        let api_base_url = api_base_url.trim();
        Self {
            api_base_url: if api_base_url.is_empty() {
                DEFAULT_BASE_URL.to_owned()
            } else {
                api_base_url.to_owned()
            },
            refresh_interval: Duration::from_secs(refresh_secs.max(1)),
            log_level: if verbose { LevelFilter::Debug } else { LevelFilter::Warn },
        }
    }

    /// `RUST_LOG`, when set, overrides the level chosen here.
    pub fn init_logging(&self) {
        env_logger::Builder::new()
            .filter_level(self.log_level)
            .parse_default_env()
            .init();
    }
}
