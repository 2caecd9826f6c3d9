//! Suite configuration read from the environment

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{E2eError, E2eResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Delay between driver actions when `SHOW_UI` is set, in milliseconds.
pub const SHOW_UI_SLOW_MO_MS: f64 = 500.0;

/// Browser engine to launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Chromium => "chromium",
            Engine::Firefox => "firefox",
            Engine::Webkit => "webkit",
        }
    }

    /// Lenient parse used for environment values: unknown names fall back to
    /// Chromium.
    pub fn from_env_value(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("Unknown browser '{}', falling back to chromium", value);
            Engine::Chromium
        })
    }
}

impl FromStr for Engine {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Engine::Chromium),
            "firefox" => Ok(Engine::Firefox),
            "webkit" => Ok(Engine::Webkit),
            other => Err(E2eError::InvalidConfig(format!(
                "unknown browser engine: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl From<Viewport> for playwright_rs::Viewport {
    fn from(v: Viewport) -> Self {
        playwright_rs::Viewport {
            width: v.width,
            height: v.height,
        }
    }
}

/// Everything needed to build a browser session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub engine: Engine,

    /// Run without a visible window
    pub headless: bool,

    pub viewport: Viewport,

    /// Application root, without a trailing slash
    pub base_url: String,

    /// Headful and slowed down for visual debugging
    pub show_ui: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Chromium,
            headless: false,
            viewport: Viewport::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            show_ui: false,
        }
    }
}

impl BrowserConfig {
    /// Read `BROWSER`, `HEADLESS`, `SCREEN_WIDTH`, `SCREEN_HEIGHT`,
    /// `APP_URL` (or `BASE_URL`) and `SHOW_UI`.
    pub fn from_env() -> E2eResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BrowserConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let engine = lookup("BROWSER")
            .map(|v| Engine::from_env_value(&v))
            .unwrap_or(defaults.engine);
        let headless = lookup("HEADLESS")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.headless);
        let width = lookup("SCREEN_WIDTH")
            .map(|v| parse_dimension("SCREEN_WIDTH", &v))
            .transpose()?
            .unwrap_or(defaults.viewport.width);
        let height = lookup("SCREEN_HEIGHT")
            .map(|v| parse_dimension("SCREEN_HEIGHT", &v))
            .transpose()?
            .unwrap_or(defaults.viewport.height);
        let base_url = lookup("APP_URL")
            .or_else(|| lookup("BASE_URL"))
            .unwrap_or(defaults.base_url);
        let show_ui = lookup("SHOW_UI").map(|v| parse_flag(&v)).unwrap_or(false);

        let config = Self {
            engine,
            headless,
            viewport: Viewport { width, height },
            base_url: normalize_base_url(&base_url),
            show_ui,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(E2eError::InvalidConfig(format!(
                "viewport must be non-zero, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::InvalidConfig(format!(
                "base url must be http(s): {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Headless unless the UI was explicitly requested.
    pub fn effective_headless(&self) -> bool {
        self.headless && !self.show_ui
    }

    pub fn slow_mo_ms(&self) -> Option<f64> {
        self.show_ui.then_some(SHOW_UI_SLOW_MO_MS)
    }
}

/// Credentials the backend accepts
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            username: std::env::var("E2E_USERNAME").unwrap_or(defaults.username),
            password: std::env::var("E2E_PASSWORD").unwrap_or(defaults.password),
        }
    }
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub browser: BrowserConfig,
    pub credentials: Credentials,
    pub fixtures_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            credentials: Credentials::default(),
            fixtures_dir: PathBuf::from("tests/fixtures"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl RunnerConfig {
    pub fn debug_dir(&self) -> PathBuf {
        self.output_dir.join("debug")
    }
}

/// `true`, `1`, `yes` and `on` are truthy; everything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_dimension(key: &str, value: &str) -> E2eResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| E2eError::InvalidConfig(format!("{} is not a number: {}", key, value)))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
