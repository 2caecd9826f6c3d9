//! Persistent navigation bar

use tracing::debug;

use super::base::BasePage;
use super::{DashboardPage, InvoicesPage, UploadPage};
use crate::error::E2eResult;

pub const DASHBOARD_LINK: &str = r#"nav a[href="/dashboard"]"#;
pub const UPLOAD_LINK: &str = r#"nav a[href="/upload"]"#;
pub const INVOICES_LINK: &str = r#"nav a[href="/invoices"]"#;

#[derive(Clone)]
pub struct NavigationComponent {
    base: BasePage,
}

impl NavigationComponent {
    pub fn new(base: BasePage) -> Self {
        Self { base }
    }

    async fn link_visible(&self, selector: &str) -> E2eResult<bool> {
        Ok(self.base.locator(selector).await.first().is_visible().await?)
    }

    async fn click_link(&self, selector: &str) -> E2eResult<()> {
        debug!("nav click {}", selector);
        self.base.locator(selector).await.first().click(None).await?;
        Ok(())
    }

    pub async fn is_upload_link_visible(&self) -> E2eResult<bool> {
        self.link_visible(UPLOAD_LINK).await
    }

    pub async fn is_invoices_link_visible(&self) -> E2eResult<bool> {
        self.link_visible(INVOICES_LINK).await
    }

    pub async fn is_dashboard_link_visible(&self) -> E2eResult<bool> {
        self.link_visible(DASHBOARD_LINK).await
    }

    pub async fn navigate_to_upload(&self) -> E2eResult<UploadPage> {
        self.click_link(UPLOAD_LINK).await?;
        UploadPage::new(self.base.clone()).await
    }

    pub async fn navigate_to_invoices(&self) -> E2eResult<InvoicesPage> {
        self.click_link(INVOICES_LINK).await?;
        InvoicesPage::new(self.base.clone()).await
    }

    pub async fn navigate_to_dashboard(&self) -> E2eResult<DashboardPage> {
        self.click_link(DASHBOARD_LINK).await?;
        DashboardPage::new(self.base.clone()).await
    }
}
