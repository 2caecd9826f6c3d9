//! Network mocking for the extraction backend
//!
//! The upload form POSTs the file to `/extract`. Intercepting that call lets
//! scenarios drive the success and failure branches of the UI without a
//! working model behind it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use playwright_rs::{FulfillOptions, Page};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::E2eResult;

pub const EXTRACT_PATTERN: &str = "**/extract";

/// Invoice fields as the backend returns them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractedInvoice {
    pub invoice_id: String,
    pub vendor_name: String,
    pub invoice_total: f64,
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

impl ExtractedInvoice {
    pub fn fake() -> Self {
        Self {
            invoice_id: "FAKE-123".to_string(),
            vendor_name: "Mock Vendor".to_string(),
            invoice_total: 123.45,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub data: ExtractedInvoice,
}

#[derive(Debug, Clone)]
pub enum ExtractMock {
    Success(ExtractedInvoice),
    Failure { status: u16, body: String },
}

/// Live interception; counts fulfilled POSTs
#[derive(Debug, Clone, Default)]
pub struct MockHandle {
    hits: Arc<AtomicUsize>,
}

impl MockHandle {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl ExtractMock {
    pub fn fake_success() -> Self {
        ExtractMock::Success(ExtractedInvoice::fake())
    }

    pub fn server_error() -> Self {
        ExtractMock::Failure {
            status: 500,
            body: "Internal Error".to_string(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ExtractMock::Success(_) => 200,
            ExtractMock::Failure { status, .. } => *status,
        }
    }

    /// Response body exactly as the browser will receive it.
    pub fn body(&self) -> E2eResult<Vec<u8>> {
        match self {
            ExtractMock::Success(invoice) => Ok(serde_json::to_vec(&ExtractResponse {
                data: invoice.clone(),
            })?),
            ExtractMock::Failure { body, .. } => Ok(body.clone().into_bytes()),
        }
    }

    fn fulfill_options(&self) -> E2eResult<FulfillOptions> {
        let builder = FulfillOptions::builder()
            .status(self.status())
            .body(self.body()?);
        let builder = match self {
            ExtractMock::Success(_) => builder.content_type("application/json"),
            ExtractMock::Failure { .. } => builder.content_type("text/plain"),
        };
        Ok(builder.build())
    }

    /// Intercept `**/extract` on `page`. POSTs get the mocked response, any
    /// other method passes through. Lives as long as the page.
    pub async fn install(&self, page: &Page) -> E2eResult<MockHandle> {
        let options = self.fulfill_options()?;
        let handle = MockHandle::default();
        let hits = handle.hits.clone();

        page.route(EXTRACT_PATTERN, move |route| {
            let options = options.clone();
            let hits = hits.clone();
            async move {
                let request = route.request();
                if request.method().eq_ignore_ascii_case("POST") && request.url().contains("/extract")
                {
                    hits.fetch_add(1, Ordering::SeqCst);
                    debug!("fulfilling mocked {} {}", request.method(), request.url());
                    route.fulfill(Some(options)).await
                } else {
                    route.continue_(None).await
                }
            }
        })
        .await?;

        debug!("extract mock installed (status {})", self.status());
        Ok(handle)
    }
}
