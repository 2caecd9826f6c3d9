//! Invoice Parser E2E Test Suite
//!
//! This crate drives a real browser against a running invoice parser web
//! app through Page Objects:
//! - Launches Chromium, Firefox or WebKit via Playwright
//! - Wraps every screen in a page object owning its selectors
//! - Mocks the `/extract` backend to exercise success and failure paths
//! - Runs tagged scenarios and writes JSON results
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ScenarioRunner (Rust)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  run_all / run_tagged / run_named                           │
//! │    └── BrowserFactory::scoped(config, scenario)             │
//! │          ├── Playwright -> Browser -> Context -> Page        │
//! │          └── teardown page -> context -> browser -> driver  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page Objects (BasePage + NavigationComponent)              │
//! │    LoginPage ──login──> DashboardPage                       │
//! │    DashboardPage ──quick upload──> UploadPage               │
//! │    UploadPage ──upload_invoice──> UploadOutcome             │
//! │        ├── Succeeded(InvoicePage)                           │
//! │        ├── Failed { UploadPage, message }                   │
//! │        └── TimedOut(UploadPage)                             │
//! │    InvoicesPage <──nav──> any page                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod browser;
pub mod config;
pub mod detect;
pub mod error;
pub mod fixtures;
pub mod mock;
pub mod pages;
pub mod routes;
pub mod runner;
pub mod scenarios;
pub mod wait;

pub use browser::{BrowserFactory, BrowserSession, SessionHandle};
pub use config::{BrowserConfig, Credentials, Engine, RunnerConfig, Viewport};
pub use error::{E2eError, E2eResult};
pub use runner::{ScenarioRunner, SuiteResult};
pub use scenarios::{Scenario, ScenarioContext};
