use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Review feed pagination and auto-advance behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Reviews requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Auto-advance tick interval in milliseconds
    #[serde(default = "default_auto_advance_interval")]
    pub auto_advance_interval_ms: u64,
    /// Quiet period after user interaction before auto-advance resumes
    #[serde(default = "default_quiescence")]
    pub quiescence_ms: u64,
    /// Fraction of the viewport moved by one auto-advance tick
    #[serde(default = "default_step_fraction")]
    pub step_fraction: f64,
    /// Fraction of the viewport moved by a manual page scroll
    #[serde(default = "default_page_fraction")]
    pub page_fraction: f64,
    /// Distance from the end treated as "at the end" for wrap-around
    #[serde(default = "default_wrap_epsilon")]
    pub wrap_epsilon_px: f64,
    /// Near-end distance that triggers loading the next page on scroll
    #[serde(default = "default_near_end_threshold")]
    pub near_end_threshold_px: f64,
    /// Near-end distance checked on every auto-advance tick
    #[serde(default = "default_tick_prefetch_threshold")]
    pub tick_prefetch_threshold_px: f64,
    /// Minimum scroll distance before a left/right affordance is shown
    #[serde(default = "default_affordance_margin")]
    pub affordance_margin_px: f64,
    /// Width of one review card when no renderer measures content
    #[serde(default = "default_card_extent")]
    pub card_extent: f64,
    /// Gap between review cards
    #[serde(default = "default_card_gap")]
    pub card_gap: f64,
    /// Initial viewport width until a renderer reports one
    #[serde(default = "default_viewport_extent")]
    pub viewport_extent: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            auto_advance_interval_ms: default_auto_advance_interval(),
            quiescence_ms: default_quiescence(),
            step_fraction: default_step_fraction(),
            page_fraction: default_page_fraction(),
            wrap_epsilon_px: default_wrap_epsilon(),
            near_end_threshold_px: default_near_end_threshold(),
            tick_prefetch_threshold_px: default_tick_prefetch_threshold(),
            affordance_margin_px: default_affordance_margin(),
            card_extent: default_card_extent(),
            card_gap: default_card_gap(),
            viewport_extent: default_viewport_extent(),
        }
    }
}

impl FeedConfig {
    pub fn auto_advance_interval(&self) -> Duration {
        Duration::from_millis(self.auto_advance_interval_ms)
    }

    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Auto-dismiss delay in milliseconds
    #[serde(default = "default_notification_display")]
    pub display_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_ms: default_notification_display(),
        }
    }
}

impl NotificationConfig {
    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }
}

/// Backoff applied to automatic page fetches after failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay after the first failure, doubled for each further failure
    #[serde(default = "default_base_backoff")]
    pub base_backoff_ms: u64,
    /// Upper bound for the backoff delay
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Consecutive failures after which automatic fetching stops (0 = never stop)
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_backoff_ms: default_base_backoff(),
            max_backoff_ms: default_max_backoff(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local SQLite database under the data directory
    #[default]
    Sqlite,
    /// Hosted REST table (PostgREST dialect)
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    /// Base URL of the hosted project, e.g. "https://xyz.supabase.co"
    #[serde(default)]
    pub rest_url: Option<String>,
    /// Anonymous API key sent as `apikey` and bearer token
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            rest_url: None,
            api_key: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Width of one review card in terminal columns
    #[serde(default = "default_card_columns")]
    pub card_columns: u16,
    /// Show review dates on cards
    #[serde(default = "default_true")]
    pub show_dates: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            card_columns: default_card_columns(),
            show_dates: default_true(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reviewdeck")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> u32 {
    6
}

fn default_auto_advance_interval() -> u64 {
    3000
}

fn default_quiescence() -> u64 {
    3000
}

fn default_step_fraction() -> f64 {
    0.4
}

fn default_page_fraction() -> f64 {
    0.8
}

fn default_wrap_epsilon() -> f64 {
    10.0
}

fn default_near_end_threshold() -> f64 {
    200.0
}

fn default_tick_prefetch_threshold() -> f64 {
    300.0
}

fn default_affordance_margin() -> f64 {
    10.0
}

/// Finite and greater than zero
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn default_card_extent() -> f64 {
    320.0 // w-80
}

fn default_card_gap() -> f64 {
    32.0
}

fn default_viewport_extent() -> f64 {
    1024.0
}

fn default_notification_display() -> u64 {
    3000
}

fn default_base_backoff() -> u64 {
    1000
}

fn default_max_backoff() -> u64 {
    30_000
}

fn default_max_consecutive_failures() -> u32 {
    5
}

fn default_timeout() -> u64 {
    30
}

fn default_tick_rate() -> u64 {
    100
}

fn default_card_columns() -> u16 {
    36
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Reject values the feed controller cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let feed = &self.feed;
        if feed.page_size == 0 {
            return Err(crate::Error::Config("feed.page_size must be positive".into()));
        }
        if feed.auto_advance_interval_ms == 0 || feed.quiescence_ms == 0 {
            return Err(crate::Error::Config(
                "feed intervals must be positive".into(),
            ));
        }
        if !is_positive(feed.step_fraction) || !is_positive(feed.page_fraction) {
            return Err(crate::Error::Config(
                "feed step fractions must be positive".into(),
            ));
        }
        if !is_positive(feed.card_extent) || !is_positive(feed.viewport_extent) {
            return Err(crate::Error::Config(
                "feed.card_extent and feed.viewport_extent must be positive".into(),
            ));
        }
        if feed.card_gap.is_nan() || feed.card_gap < 0.0 {
            return Err(crate::Error::Config("feed.card_gap must not be negative".into()));
        }
        if self.notification.display_ms == 0 {
            return Err(crate::Error::Config(
                "notification.display_ms must be positive".into(),
            ));
        }
        if self.backend.kind == BackendKind::Rest && self.backend.rest_url.is_none() {
            return Err(crate::Error::Config(
                "backend.rest_url is required for the rest backend".into(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/reviewdeck/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("reviewdeck")
            .join("config.toml")
    }

    /// Get the database file path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("reviewdeck.db")
    }

    /// Get the log file path used while the TUI owns the terminal
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}
