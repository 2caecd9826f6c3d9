//! Invoice list view

use async_trait::async_trait;

use super::base::{BasePage, PageObject};
use super::navigation::NavigationComponent;
use super::{DashboardPage, UploadPage};
use crate::error::E2eResult;
use crate::routes::AppRoute;
use crate::wait::{is_visible_within, SHORT_WAIT};

pub const HEADING: &str = "h1:has-text('Invoices')";

pub struct InvoicesPage {
    base: BasePage,
    navigation: NavigationComponent,
}

impl InvoicesPage {
    pub async fn new(base: BasePage) -> E2eResult<Self> {
        let page = Self {
            navigation: NavigationComponent::new(base.clone()),
            base,
        };
        page.verify_page_loaded().await?;
        Ok(page)
    }

    pub async fn is_heading_visible(&self) -> bool {
        is_visible_within(self.base.locator(HEADING).await, SHORT_WAIT).await
    }

    pub async fn navigate_to_dashboard(&self) -> E2eResult<DashboardPage> {
        self.navigation.navigate_to_dashboard().await
    }

    pub async fn navigate_to_upload(&self) -> E2eResult<UploadPage> {
        self.navigation.navigate_to_upload().await
    }
}

#[async_trait]
impl PageObject for InvoicesPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    async fn verify_page_loaded(&self) -> E2eResult<()> {
        self.base.verify_route(&AppRoute::Invoices).await
    }
}
