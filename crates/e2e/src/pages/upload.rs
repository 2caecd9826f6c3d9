//! Invoice upload form
//!
//! Upload flow:
//!
//! ```text
//! Idle --select_file--> FileSelected --click--> Submitting
//! Submitting --success text | /invoice/{id}--> Succeeded (InvoicePage)
//! Submitting --error text---------------------> Failed   (UploadPage)
//! Submitting --nothing within UPLOAD_TIMEOUT--> TimedOut (UploadPage)
//! ```
//!
//! There is no retry; the caller decides what a timeout means.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::base::{BasePage, PageObject};
use super::navigation::NavigationComponent;
use super::{DashboardPage, InvoicePage, InvoicesPage};
use crate::detect::TOAST_SELECTOR;
use crate::error::{E2eError, E2eResult};
use crate::routes::AppRoute;
use crate::wait::{
    is_visible_within, url_matches, wait_for_selector, wait_for_url, ERROR_WAIT, POLL_INTERVAL,
    SHORT_WAIT, SUCCESS_WAIT, UPLOAD_TIMEOUT,
};

pub const HEADING: &str = "h1:has-text('Upload Invoice')";
pub const FILE_INPUT: &str = r#"input[type="file"]"#;
pub const UPLOAD_BUTTON: &str = r#"button:has-text("Upload & Extract")"#;
pub const REMOVE_BUTTON: &str = r#"button:has-text("Remove")"#;
pub const SUCCESS_MESSAGE: &str = "text=/successfully/i";
pub const ERROR_MESSAGE: &str = "text=/error|unavailable|failed/i";
pub const FILE_NAME_DISPLAY: &str = r"text=/invoice.*\.pdf/i";

/// Result of [`UploadPage::upload_invoice`]
pub enum UploadOutcome {
    Succeeded(InvoicePage),
    /// The app reported an error; `message` is its text when readable.
    Failed {
        page: UploadPage,
        message: Option<String>,
    },
    /// No success or error signal within the upload timeout.
    TimedOut(UploadPage),
}

impl UploadOutcome {
    pub fn kind(&self) -> UploadSignal {
        match self {
            UploadOutcome::Succeeded(_) => UploadSignal::Succeeded,
            UploadOutcome::Failed { .. } => UploadSignal::Failed,
            UploadOutcome::TimedOut(_) => UploadSignal::TimedOut,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Succeeded(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSignal {
    Succeeded,
    Failed,
    TimedOut,
}

/// Signals observed in one poll of a submitted upload
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadObservation {
    pub success_text: bool,
    pub at_invoice_url: bool,
    pub error_text: bool,
}

impl UploadObservation {
    /// Success text outranks the redirect, which outranks an error.
    pub fn resolve(&self) -> Option<UploadSignal> {
        if self.success_text || self.at_invoice_url {
            Some(UploadSignal::Succeeded)
        } else if self.error_text {
            Some(UploadSignal::Failed)
        } else {
            None
        }
    }
}

pub struct UploadPage {
    base: BasePage,
    navigation: NavigationComponent,
}

impl UploadPage {
    /// Wrap the tab and verify it is on `/upload`.
    pub async fn new(base: BasePage) -> E2eResult<Self> {
        let page = Self {
            navigation: NavigationComponent::new(base.clone()),
            base,
        };
        page.verify_page_loaded().await?;
        Ok(page)
    }

    /// Navigate to `/upload` first.
    pub async fn open(base: BasePage) -> E2eResult<Self> {
        base.goto(&AppRoute::Upload).await?;
        Self::new(base).await
    }

    pub async fn is_heading_visible(&self) -> bool {
        is_visible_within(self.base.locator(HEADING).await, SHORT_WAIT).await
    }

    pub async fn is_file_input_present(&self) -> E2eResult<bool> {
        Ok(self.base.locator(FILE_INPUT).await.count().await? > 0)
    }

    pub async fn is_upload_button_visible(&self) -> E2eResult<bool> {
        Ok(self.base.locator(UPLOAD_BUTTON).await.is_visible().await?)
    }

    pub async fn is_upload_button_enabled(&self) -> E2eResult<bool> {
        Ok(self.base.locator(UPLOAD_BUTTON).await.is_enabled().await?)
    }

    pub async fn select_file(&self, path: &Path) -> E2eResult<&Self> {
        if !path.exists() {
            return Err(E2eError::FixtureMissing(path.to_path_buf()));
        }
        debug!("selecting {}", path.display());
        let path: PathBuf = path.to_path_buf();
        self.base
            .locator(FILE_INPUT)
            .await
            .set_input_files(&path, None)
            .await?;
        Ok(self)
    }

    pub async fn click_upload(&self) -> E2eResult<&Self> {
        self.base.locator(UPLOAD_BUTTON).await.click(None).await?;
        Ok(self)
    }

    /// Click "Remove" when the form shows it. Returns whether it did.
    pub async fn remove_file_if_present(&self) -> E2eResult<bool> {
        let remove = self.base.locator(REMOVE_BUTTON).await;
        if remove.count().await? > 0 {
            remove.first().click(None).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub async fn is_file_name_displayed(&self) -> bool {
        is_visible_within(self.base.locator(FILE_NAME_DISPLAY).await.first(), SHORT_WAIT).await
    }

    pub async fn is_success_message_visible(&self) -> bool {
        is_visible_within(self.base.locator(SUCCESS_MESSAGE).await.first(), SUCCESS_WAIT).await
    }

    pub async fn is_error_message_visible(&self) -> bool {
        is_visible_within(self.base.locator(ERROR_MESSAGE).await.first(), ERROR_WAIT).await
    }

    /// Text of the first toast once one is visible.
    pub async fn wait_toast(&self, timeout: Duration) -> E2eResult<String> {
        let toast = wait_for_selector(self.base.page(), TOAST_SELECTOR, timeout).await?;
        Ok(toast.inner_text().await?)
    }

    pub async fn wait_invoice_url(&self, invoice_id: &str, timeout: Duration) -> E2eResult<InvoicePage> {
        let route = AppRoute::Invoice(Some(invoice_id.to_string()));
        wait_for_url(self.base.page(), &route.url_glob(), timeout).await?;
        Ok(InvoicePage::new(self.base.clone()))
    }

    async fn observe(&self) -> UploadObservation {
        let visible = |selector: &'static str| async move {
            match self.base.locator(selector).await.first().is_visible().await {
                Ok(v) => v,
                Err(e) => {
                    debug!("{} visibility check failed: {}", selector, e);
                    false
                }
            }
        };

        UploadObservation {
            success_text: visible(SUCCESS_MESSAGE).await,
            at_invoice_url: url_matches(
                &AppRoute::Invoice(None).url_glob(),
                &self.base.current_url(),
            ),
            error_text: visible(ERROR_MESSAGE).await,
        }
    }

    async fn error_text(&self) -> Option<String> {
        self.base
            .locator(ERROR_MESSAGE)
            .await
            .first()
            .inner_text()
            .await
            .ok()
    }

    /// Select `path`, submit it and wait for the outcome.
    pub async fn upload_invoice(self, path: &Path) -> E2eResult<UploadOutcome> {
        self.upload_invoice_within(path, UPLOAD_TIMEOUT).await
    }

    pub async fn upload_invoice_within(
        self,
        path: &Path,
        timeout: Duration,
    ) -> E2eResult<UploadOutcome> {
        self.select_file(path).await?;
        self.click_upload().await?;
        info!("Uploaded {}, waiting up to {:?}", path.display(), timeout);

        let start = Instant::now();
        loop {
            match self.observe().await.resolve() {
                Some(UploadSignal::Succeeded) => {
                    info!("Upload succeeded at {}", self.base.current_url());
                    return Ok(UploadOutcome::Succeeded(InvoicePage::new(self.base.clone())));
                }
                Some(UploadSignal::Failed) => {
                    let message = self.error_text().await;
                    warn!("Upload failed: {:?}", message);
                    return Ok(UploadOutcome::Failed {
                        page: self,
                        message,
                    });
                }
                Some(UploadSignal::TimedOut) | None => {}
            }

            if start.elapsed() >= timeout {
                break;
            }
            sleep(POLL_INTERVAL).await;
        }

        if self.is_error_message_visible().await {
            let message = self.error_text().await;
            return Ok(UploadOutcome::Failed {
                page: self,
                message,
            });
        }

        warn!("Upload produced no signal within {:?}", timeout);
        Ok(UploadOutcome::TimedOut(self))
    }

    pub async fn navigate_to_invoices(&self) -> E2eResult<InvoicesPage> {
        self.navigation.navigate_to_invoices().await
    }

    pub async fn navigate_to_dashboard(&self) -> E2eResult<DashboardPage> {
        self.navigation.navigate_to_dashboard().await
    }
}

#[async_trait]
impl PageObject for UploadPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    async fn verify_page_loaded(&self) -> E2eResult<()> {
        self.base.verify_route(&AppRoute::Upload).await
    }
}
