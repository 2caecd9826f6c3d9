//! Scenario runner: session per scenario, bookkeeping, JSON results

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::browser::BrowserFactory;
use crate::config::RunnerConfig;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::FixtureSet;
use crate::scenarios::{self, Scenario, ScenarioContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl ScenarioResult {
    fn from_outcome(name: &str, outcome: E2eResult<()>, duration_ms: u64) -> Self {
        let (status, error) = match outcome {
            Ok(()) => (ScenarioStatus::Passed, None),
            Err(e) if e.is_skip() => (ScenarioStatus::Skipped, Some(e.to_string())),
            Err(e) => (ScenarioStatus::Failed, Some(e.to_string())),
        };
        Self {
            name: name.to_string(),
            status,
            duration_ms,
            error,
        }
    }
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn from_results(results: Vec<ScenarioResult>, duration_ms: u64) -> Self {
        let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(ScenarioStatus::Passed),
            failed: count(ScenarioStatus::Failed),
            skipped: count(ScenarioStatus::Skipped),
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

pub struct ScenarioRunner {
    config: RunnerConfig,
    scenarios: Vec<Scenario>,
}

impl ScenarioRunner {
    /// Runner over every registered scenario
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_scenarios(config, scenarios::all())
    }

    pub fn with_scenarios(config: RunnerConfig, scenarios: Vec<Scenario>) -> Self {
        Self { config, scenarios }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub async fn run_all(&self) -> E2eResult<SuiteResult> {
        let selected: Vec<Scenario> = self.scenarios.clone();
        self.run_scenarios(&selected).await
    }

    pub async fn run_tagged(&self, tag: &str) -> E2eResult<SuiteResult> {
        let selected: Vec<Scenario> = self
            .scenarios
            .iter()
            .filter(|s| s.has_tag(tag))
            .cloned()
            .collect();
        if selected.is_empty() {
            warn!("No scenario tagged '{}'", tag);
        }
        self.run_scenarios(&selected).await
    }

    pub async fn run_named(&self, name: &str) -> E2eResult<SuiteResult> {
        let scenario = self
            .scenarios
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| E2eError::InvalidConfig(format!("Scenario not found: {}", name)))?;
        self.run_scenarios(&[scenario]).await
    }

    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        // Scenarios needing a missing fixture are skipped, not failed.
        if let Err(e) = FixtureSet::new(&self.config.fixtures_dir).ensure() {
            warn!("Could not prepare fixtures: {}", e);
        }

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            match result.status {
                ScenarioStatus::Passed => {
                    info!("✓ {} ({} ms)", result.name, result.duration_ms)
                }
                ScenarioStatus::Skipped => info!(
                    "- {} skipped: {}",
                    result.name,
                    result.error.as_deref().unwrap_or("no reason given")
                ),
                ScenarioStatus::Failed => error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            }
            results.push(result);
        }

        let suite = SuiteResult::from_results(results, start.elapsed().as_millis() as u64);

        info!("");
        info!(
            "Scenario Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );

        Ok(suite)
    }

    /// Run one scenario in its own browser session. Launch errors and
    /// panics are recorded as failures.
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let config = &self.config;
        let run = scenario.run;
        let session = BrowserFactory::scoped(&config.browser, |handle| {
            run(ScenarioContext::new(handle, config))
        });

        let outcome = match AssertUnwindSafe(session).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(E2eError::AssertionFailed(format!(
                "scenario panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };

        ScenarioResult::from_outcome(
            scenario.name,
            outcome,
            start.elapsed().as_millis() as u64,
        )
    }

    /// Write results to `<output>/test-results.json`
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Poll `base_url` until it answers. Any response below 500 counts; the
/// login page of a running app is enough.
pub async fn wait_for_app(base_url: &str, timeout: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                debug!("{} answered {}", base_url, resp.status());
                return Ok(());
            }
            Ok(resp) => warn!("App returned {}", resp.status()),
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for app at {}...", base_url);
                }
                if !e.is_connect() && !e.is_timeout() {
                    warn!("Reachability check error: {}", e);
                }
            }
        }

        if start.elapsed() >= timeout {
            break;
        }
        sleep(Duration::from_millis(250)).await;
    }

    Err(E2eError::AppUnreachable {
        url: base_url.to_string(),
        attempts,
    })
}
