//! Login form

use async_trait::async_trait;
use tracing::debug;

use super::base::{BasePage, PageObject};
use super::DashboardPage;
use crate::detect::{Detection, Detector, DetectorChain};
use crate::error::E2eResult;
use crate::routes::AppRoute;
use crate::wait::SHORT_WAIT;

pub const USERNAME_INPUT: &str = r#"input[id="username"]"#;
pub const PASSWORD_INPUT: &str = r#"input[id="password"]"#;
pub const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
pub const ERROR_MESSAGE: &str = "text=Invalid credentials";

pub struct LoginPage {
    base: BasePage,
}

impl LoginPage {
    pub fn new(base: BasePage) -> Self {
        Self { base }
    }

    /// Load `/login` and verify the route.
    pub async fn navigate(self) -> E2eResult<Self> {
        self.base.goto(&AppRoute::Login).await?;
        self.verify_page_loaded().await?;
        Ok(self)
    }

    pub async fn is_username_input_visible(&self) -> E2eResult<bool> {
        Ok(self.base.locator(USERNAME_INPUT).await.is_visible().await?)
    }

    pub async fn is_password_input_visible(&self) -> E2eResult<bool> {
        Ok(self.base.locator(PASSWORD_INPUT).await.is_visible().await?)
    }

    pub async fn is_submit_button_visible(&self) -> E2eResult<bool> {
        Ok(self.base.locator(SUBMIT_BUTTON).await.is_visible().await?)
    }

    async fn submit(&self, username: &str, password: &str) -> E2eResult<()> {
        debug!("submitting login for '{}'", username);
        self.base.locator(USERNAME_INPUT).await.fill(username, None).await?;
        self.base.locator(PASSWORD_INPUT).await.fill(password, None).await?;
        self.base.locator(SUBMIT_BUTTON).await.click(None).await?;
        Ok(())
    }

    /// Log in and land on the dashboard. Fails if no redirect happens.
    pub async fn login_as_valid_user(
        &self,
        username: &str,
        password: &str,
    ) -> E2eResult<DashboardPage> {
        self.submit(username, password).await?;
        DashboardPage::new(self.base.clone()).await
    }

    /// Submit credentials expected to be rejected; the page stays put.
    pub async fn login_with_invalid_credentials(
        self,
        username: &str,
        password: &str,
    ) -> E2eResult<Self> {
        self.submit(username, password).await?;
        Ok(self)
    }

    /// Inline "Invalid credentials" text first, then a toast mentioning
    /// "invalid" or "error".
    pub fn error_detectors() -> DetectorChain {
        DetectorChain::new()
            .then(Detector::new("inline", ERROR_MESSAGE, SHORT_WAIT))
            .then(Detector::toast(&["invalid", "error"], SHORT_WAIT))
    }

    pub async fn detect_error(&self) -> Option<Detection> {
        Self::error_detectors().first_match(self.base.page()).await
    }

    pub async fn is_error_message_visible(&self) -> bool {
        self.detect_error().await.is_some()
    }
}

#[async_trait]
impl PageObject for LoginPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    async fn verify_page_loaded(&self) -> E2eResult<()> {
        self.base.verify_route(&AppRoute::Login).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_detectors_priority() {
        let chain = LoginPage::error_detectors();
        assert_eq!(chain.names(), vec!["inline", "toast"]);
        assert_eq!(chain.budget(), Duration::from_secs(6));
    }
}
