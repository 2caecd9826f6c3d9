//! Browser lifecycle: Playwright driver, browser, context and page

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use playwright_rs::{
    Browser, BrowserContext, BrowserContextOptions, LaunchOptions, Page, Playwright,
};
use tracing::{debug, info, warn};

use crate::config::{BrowserConfig, Engine};
use crate::error::E2eResult;

/// Handle to a fully launched browser stack
///
/// Resources are strictly nested: the page lives in the context, the context
/// in the browser, the browser in the driver. [`BrowserSession::close`]
/// releases them innermost first.
pub struct BrowserSession {
    config: BrowserConfig,
    playwright: Playwright,
    browser: Browser,
    context: BrowserContext,
    page: Page,
    closed: bool,
}

/// Cheap, cloneable view of a session handed to scenario code
#[derive(Clone)]
pub struct SessionHandle {
    pub page: Page,
    pub context: BrowserContext,
    pub config: BrowserConfig,
}

impl SessionHandle {
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

pub struct BrowserFactory;

impl BrowserFactory {
    /// Launch the driver, the configured engine, one context with the
    /// configured viewport and base URL, and one page in it.
    pub async fn launch(config: &BrowserConfig) -> E2eResult<BrowserSession> {
        config.validate()?;

        info!(
            "Launching {} ({}x{}, headless={}) against {}",
            config.engine,
            config.viewport.width,
            config.viewport.height,
            config.effective_headless(),
            config.base_url
        );

        let playwright = Playwright::launch().await?;

        let browser = match launch_engine(&playwright, config).await {
            Ok(browser) => browser,
            Err(e) => {
                teardown(None, None, None, Some(&playwright)).await;
                return Err(e.into());
            }
        };

        let options = BrowserContextOptions::builder()
            .viewport(config.viewport.into())
            .base_url(config.base_url.clone())
            .build();
        let context = match browser.new_context_with_options(options).await {
            Ok(context) => context,
            Err(e) => {
                teardown(None, None, Some(&browser), Some(&playwright)).await;
                return Err(e.into());
            }
        };

        let page = match context.new_page().await {
            Ok(page) => page,
            Err(e) => {
                teardown(None, Some(&context), Some(&browser), Some(&playwright)).await;
                return Err(e.into());
            }
        };

        debug!("Browser {} {} ready", browser.name(), browser.version());

        Ok(BrowserSession {
            config: config.clone(),
            playwright,
            browser,
            context,
            page,
            closed: false,
        })
    }

    /// Run `f` against a fresh session and always tear it down afterwards,
    /// including when `f` fails or panics. A panic is resumed after teardown.
    pub async fn scoped<F, Fut, T>(config: &BrowserConfig, f: F) -> E2eResult<T>
    where
        F: FnOnce(SessionHandle) -> Fut,
        Fut: Future<Output = E2eResult<T>>,
    {
        let mut session = Self::launch(config).await?;
        let outcome = AssertUnwindSafe(f(session.handle())).catch_unwind().await;
        session.close().await;

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl BrowserSession {
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn context(&self) -> &BrowserContext {
        &self.context
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn browser_name(&self) -> &str {
        self.browser.name()
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            page: self.page.clone(),
            context: self.context.clone(),
            config: self.config.clone(),
        }
    }

    /// Close page, context, browser and driver in that order. Safe to call
    /// more than once; resources that are already gone are skipped.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        teardown(
            Some(&self.page),
            Some(&self.context),
            Some(&self.browser),
            Some(&self.playwright),
        )
        .await;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!("BrowserSession dropped without close(); driver process may linger");
        }
    }
}

async fn launch_engine(
    playwright: &Playwright,
    config: &BrowserConfig,
) -> playwright_rs::Result<Browser> {
    let mut options = LaunchOptions::new().headless(config.effective_headless());
    if let Some(ms) = config.slow_mo_ms() {
        options = options.slow_mo(ms);
    }

    match config.engine {
        Engine::Firefox => playwright.firefox().launch_with_options(options).await,
        Engine::Webkit => playwright.webkit().launch_with_options(options).await,
        Engine::Chromium => playwright.chromium().launch_with_options(options).await,
    }
}

/// Release whichever resources exist, innermost first. Errors are logged and
/// never stop the remaining steps.
async fn teardown(
    page: Option<&Page>,
    context: Option<&BrowserContext>,
    browser: Option<&Browser>,
    playwright: Option<&Playwright>,
) {
    if let Some(page) = page {
        if let Err(e) = page.close().await {
            debug!("page already closed: {}", e);
        }
    }
    if let Some(context) = context {
        if let Err(e) = context.close().await {
            debug!("context already closed: {}", e);
        }
    }
    if let Some(browser) = browser {
        if let Err(e) = browser.close().await {
            debug!("browser already closed: {}", e);
        }
    }
    if let Some(playwright) = playwright {
        if let Err(e) = playwright.shutdown().await {
            warn!("Playwright driver shutdown failed: {}", e);
        }
    }
}
