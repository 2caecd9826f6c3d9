//! E2E test harness entry point
//!
//! Drives the registered scenarios against a running invoice parser.
//! Run with: cargo test --package invoice-e2e --test e2e -- --tag smoke
//!
//! When the app is not reachable the run is skipped unless
//! `--require-app` is given.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use invoice_e2e::config::{parse_flag, Credentials};
use invoice_e2e::runner::wait_for_app;
use invoice_e2e::{BrowserConfig, E2eError, E2eResult, Engine, RunnerConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "invoice-e2e")]
#[command(about = "E2E scenarios for the invoice parser web app")]
#[command(ignore_errors = true)]
struct Args {
    /// Browser engine (chrome, chromium, firefox, webkit); overrides BROWSER
    #[arg(long)]
    browser: Option<String>,

    /// Run without a window; overrides HEADLESS
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    headless: Option<String>,

    /// Viewport width; overrides SCREEN_WIDTH
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height; overrides SCREEN_HEIGHT
    #[arg(long)]
    height: Option<u32>,

    /// Application root; overrides APP_URL / BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Headful with slowed-down interaction; overrides SHOW_UI
    #[arg(long)]
    show_ui: bool,

    /// Run only scenarios with this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Output directory for results and debug artifacts
    #[arg(short, long, env = "E2E_OUTPUT_DIR", default_value = "test-results")]
    output: PathBuf,

    /// Directory holding upload fixtures
    #[arg(long, env = "E2E_FIXTURES_DIR", default_value = "tests/fixtures")]
    fixtures: PathBuf,

    /// Fail instead of skipping when the app is unreachable
    #[arg(long)]
    require_app: bool,

    /// How long to wait for the app before giving up
    #[arg(long, default_value = "5")]
    app_wait_secs: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn browser_config(args: &Args) -> E2eResult<BrowserConfig> {
    let mut config = BrowserConfig::from_env()?;

    if let Some(browser) = &args.browser {
        config.engine = browser.parse::<Engine>()?;
    }
    if let Some(headless) = &args.headless {
        config.headless = parse_flag(headless);
    }
    if let Some(width) = args.width {
        config.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.viewport.height = height;
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    config.show_ui |= args.show_ui;

    config.validate()?;
    Ok(config)
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = RunnerConfig {
        browser: browser_config(&args)?,
        credentials: Credentials::from_env(),
        fixtures_dir: args.fixtures.clone(),
        output_dir: args.output.clone(),
    };

    let wait = Duration::from_secs(args.app_wait_secs);
    match wait_for_app(&config.browser.base_url, wait).await {
        Ok(()) => info!("App reachable at {}", config.browser.base_url),
        Err(e @ E2eError::AppUnreachable { .. }) if !args.require_app => {
            warn!("Skipping E2E scenarios: {}", e);
            return Ok(true);
        }
        Err(e) => return Err(e),
    }

    let runner = ScenarioRunner::new(config);

    let results = if let Some(name) = &args.name {
        runner.run_named(name).await?
    } else if let Some(tag) = &args.tag {
        runner.run_tagged(tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    Ok(results.success())
}
