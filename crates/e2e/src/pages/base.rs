//! Shared page-object plumbing

use std::path::Path;

use async_trait::async_trait;
use playwright_rs::{Locator, Page, ScreenshotOptions};
use tracing::{debug, warn};

use crate::error::{E2eError, E2eResult};
use crate::routes::{join_url, AppRoute};
use crate::wait::{wait_for_url, ROUTE_TIMEOUT};

/// A browser tab plus the application root it serves
#[derive(Clone)]
pub struct BasePage {
    page: Page,
    base_url: String,
}

impl BasePage {
    pub fn new(page: Page, base_url: impl Into<String>) -> Self {
        Self {
            page,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, route: &AppRoute) -> String {
        join_url(&self.base_url, &route.path())
    }

    pub fn current_url(&self) -> String {
        self.page.url()
    }

    /// Resolve a selector. Locators are never cached.
    pub async fn locator(&self, selector: &str) -> Locator {
        self.page.locator(selector).await
    }

    pub async fn goto(&self, route: &AppRoute) -> E2eResult<()> {
        let url = self.url_for(route);
        debug!("goto {}", url);
        self.page.goto(&url, None).await?;
        Ok(())
    }

    pub async fn goto_root(&self) -> E2eResult<()> {
        self.page.goto(&self.base_url, None).await?;
        Ok(())
    }

    pub async fn reload(&self) -> E2eResult<()> {
        self.page.reload(None).await?;
        Ok(())
    }

    /// Wait for the URL to match `route`, then confirm it carries the
    /// route's marker.
    pub async fn verify_route(&self, route: &AppRoute) -> E2eResult<()> {
        let mismatch = || E2eError::RouteMismatch {
            expected: route.path(),
            actual: self.page.url(),
        };

        wait_for_url(&self.page, &route.url_glob(), ROUTE_TIMEOUT)
            .await
            .map_err(|_| mismatch())?;

        if self.page.url().to_lowercase().contains(route.marker()) {
            Ok(())
        } else {
            Err(mismatch())
        }
    }

    /// Clear `localStorage` and `sessionStorage`. Affects every page in the
    /// browser context sharing this origin.
    pub async fn clear_storage(&self) -> E2eResult<()> {
        self.page.evaluate_expression("localStorage.clear()").await?;
        self.page.evaluate_expression("sessionStorage.clear()").await?;
        Ok(())
    }

    pub async fn set_local_storage(&self, key: &str, value: &str) -> E2eResult<()> {
        let script = format!(
            "localStorage.setItem({}, {})",
            serde_json::to_string(key)?,
            serde_json::to_string(value)?
        );
        self.page.evaluate_expression(&script).await?;
        Ok(())
    }

    /// Full-page screenshot for post-mortem use. Failures are only logged;
    /// the PNG bytes come back on success.
    pub async fn take_debug_screenshot(&self, path: &Path) -> Option<Vec<u8>> {
        let options = ScreenshotOptions::builder().full_page(true).build();
        match self.page.screenshot_to_file(path, Some(options)).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("debug screenshot to {} failed: {}", path.display(), e);
                None
            }
        }
    }
}

/// Common contract of every page wrapper
#[async_trait]
pub trait PageObject: Send + Sync {
    fn base(&self) -> &BasePage;

    /// Fail unless the browser is on this page's route.
    async fn verify_page_loaded(&self) -> E2eResult<()>;

    async fn clear_storage(&self) -> E2eResult<()> {
        self.base().clear_storage().await
    }

    fn current_url(&self) -> String {
        self.base().current_url()
    }

    async fn take_debug_screenshot(&self, path: &Path) -> Option<Vec<u8>> {
        self.base().take_debug_screenshot(path).await
    }
}
