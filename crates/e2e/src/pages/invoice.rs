//! Invoice detail view at `/invoice/{id}`

use async_trait::async_trait;

use super::base::{BasePage, PageObject};
use super::navigation::NavigationComponent;
use super::{DashboardPage, InvoicesPage};
use crate::error::{E2eError, E2eResult};

pub struct InvoicePage {
    base: BasePage,
    navigation: NavigationComponent,
}

impl InvoicePage {
    /// The id is dynamic, so construction does not verify the route; call
    /// [`PageObject::verify_page_loaded`] for the loose check.
    pub fn new(base: BasePage) -> Self {
        Self {
            navigation: NavigationComponent::new(base.clone()),
            base,
        }
    }

    /// Id segment following `/invoice/` in the current URL.
    pub fn invoice_id(&self) -> Option<String> {
        invoice_id_from_url(&self.base.current_url())
    }

    pub async fn navigate_to_invoices(&self) -> E2eResult<InvoicesPage> {
        self.navigation.navigate_to_invoices().await
    }

    pub async fn navigate_to_dashboard(&self) -> E2eResult<DashboardPage> {
        self.navigation.navigate_to_dashboard().await
    }
}

#[async_trait]
impl PageObject for InvoicePage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    async fn verify_page_loaded(&self) -> E2eResult<()> {
        let url = self.base.current_url();
        if url.to_lowercase().contains("invoice") {
            Ok(())
        } else {
            Err(E2eError::RouteMismatch {
                expected: "/invoice/{id}".to_string(),
                actual: url,
            })
        }
    }
}

pub fn invoice_id_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/invoice/")?;
    let id = rest.split(['/', '?', '#']).next().unwrap_or_default();
    (!id.is_empty()).then(|| id.to_string())
}
