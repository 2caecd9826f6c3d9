//! Landing page after login

use async_trait::async_trait;

use super::base::{BasePage, PageObject};
use super::navigation::NavigationComponent;
use super::{InvoicesPage, UploadPage};
use crate::error::E2eResult;
use crate::routes::AppRoute;
use crate::wait::{is_visible_within, SHORT_WAIT};

pub const HEADING: &str = "h1:has-text('Dashboard')";
pub const QUICK_UPLOAD: &str = "text=Upload Invoice";

pub struct DashboardPage {
    base: BasePage,
    navigation: NavigationComponent,
}

impl DashboardPage {
    /// Wrap the tab and verify it is on `/dashboard`.
    pub async fn new(base: BasePage) -> E2eResult<Self> {
        let page = Self {
            navigation: NavigationComponent::new(base.clone()),
            base,
        };
        page.verify_page_loaded().await?;
        Ok(page)
    }

    pub fn navigation(&self) -> &NavigationComponent {
        &self.navigation
    }

    pub async fn is_heading_visible(&self) -> bool {
        is_visible_within(self.base.locator(HEADING).await, SHORT_WAIT).await
    }

    /// The dashboard's "Upload Invoice" quick action.
    pub async fn click_quick_upload(&self) -> E2eResult<UploadPage> {
        self.base.locator(QUICK_UPLOAD).await.first().click(None).await?;
        UploadPage::new(self.base.clone()).await
    }

    pub async fn navigate_to_upload(&self) -> E2eResult<UploadPage> {
        self.navigation.navigate_to_upload().await
    }

    pub async fn navigate_to_invoices(&self) -> E2eResult<InvoicesPage> {
        self.navigation.navigate_to_invoices().await
    }
}

#[async_trait]
impl PageObject for DashboardPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    async fn verify_page_loaded(&self) -> E2eResult<()> {
        self.base.verify_route(&AppRoute::Dashboard).await
    }
}
