//! End-to-end scenarios against a running invoice parser
//!
//! Every scenario receives a fresh tab through [`ScenarioContext`] and talks
//! to the app only through the page objects in [`crate::pages`].

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{info, warn};

use crate::artifacts::{CapturedArtifacts, DebugArtifacts};
use crate::browser::SessionHandle;
use crate::config::{Credentials, RunnerConfig, Viewport};
use crate::detect::TextPolicy;
use crate::error::{ensure, E2eError, E2eResult};
use crate::fixtures::FixtureSet;
use crate::mock::{ExtractMock, ExtractedInvoice};
use crate::pages::{
    BasePage, DashboardPage, LoginPage, NavigationComponent, PageObject, UploadOutcome, UploadPage,
};
use crate::routes::AppRoute;
use crate::wait::{INVOICE_REDIRECT_TIMEOUT, SHORT_WAIT, SUCCESS_WAIT};

pub type ScenarioFn = fn(ScenarioContext) -> BoxFuture<'static, E2eResult<()>>;

/// A named, tagged scenario
#[derive(Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub run: ScenarioFn,
}

impl Scenario {
    pub fn new(name: &'static str, tags: &'static [&'static str], run: ScenarioFn) -> Self {
        Self { name, tags, run }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Everything a scenario may touch
#[derive(Clone)]
pub struct ScenarioContext {
    pub session: SessionHandle,
    pub credentials: Credentials,
    pub fixtures: FixtureSet,
    pub artifacts: DebugArtifacts,
}

impl ScenarioContext {
    pub fn new(session: SessionHandle, config: &RunnerConfig) -> Self {
        Self {
            session,
            credentials: config.credentials.clone(),
            fixtures: FixtureSet::new(&config.fixtures_dir),
            artifacts: DebugArtifacts::new(config.debug_dir()),
        }
    }

    pub fn base(&self) -> BasePage {
        BasePage::new(self.session.page.clone(), self.session.base_url())
    }

    pub async fn login_page(&self) -> E2eResult<LoginPage> {
        LoginPage::new(self.base()).navigate().await
    }

    pub async fn login(&self) -> E2eResult<DashboardPage> {
        self.login_page()
            .await?
            .login_as_valid_user(&self.credentials.username, &self.credentials.password)
            .await
    }

    /// Set the app's demo auth flag so protected routes render without
    /// going through the login form.
    pub async fn seed_auth(&self) -> E2eResult<()> {
        let base = self.base();
        base.goto_root().await?;
        base.set_local_storage("isAuthenticated", "true").await?;
        base.reload().await
    }

    pub async fn open_upload(&self) -> E2eResult<UploadPage> {
        self.seed_auth().await?;
        UploadPage::open(self.base()).await
    }

    pub async fn capture(&self, name: &str) -> CapturedArtifacts {
        self.artifacts.capture(&self.base(), name).await
    }
}

/// Every registered scenario, in execution order.
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario::new("login_page_renders", &["login", "smoke"], |ctx| {
            login_page_renders(ctx).boxed()
        }),
        Scenario::new("login_valid_credentials", &["login", "smoke"], |ctx| {
            login_valid_credentials(ctx).boxed()
        }),
        Scenario::new("login_invalid_credentials", &["login"], |ctx| {
            login_invalid_credentials(ctx).boxed()
        }),
        Scenario::new("protected_routes_redirect", &["auth"], |ctx| {
            protected_routes_redirect(ctx).boxed()
        }),
        Scenario::new("dashboard_quick_upload", &["dashboard"], |ctx| {
            dashboard_quick_upload(ctx).boxed()
        }),
        Scenario::new("upload_page_renders", &["upload", "smoke"], |ctx| {
            upload_page_renders(ctx).boxed()
        }),
        Scenario::new("upload_button_follows_selection", &["upload"], |ctx| {
            upload_button_follows_selection(ctx).boxed()
        }),
        Scenario::new("upload_rejects_non_pdf", &["upload", "validation"], |ctx| {
            upload_rejects_non_pdf(ctx).boxed()
        }),
        Scenario::new("upload_rejects_oversize", &["upload", "validation"], |ctx| {
            upload_rejects_oversize(ctx).boxed()
        }),
        Scenario::new("upload_server_error_toast", &["upload", "mock"], |ctx| {
            upload_server_error_toast(ctx).boxed()
        }),
        Scenario::new("upload_success_redirects", &["upload", "mock"], |ctx| {
            upload_success_redirects(ctx).boxed()
        }),
        Scenario::new("complete_user_journey", &["journey", "slow"], |ctx| {
            complete_user_journey(ctx).boxed()
        }),
        Scenario::new("matrix_config_valid", &["matrix"], |ctx| {
            matrix_config_valid(ctx).boxed()
        }),
        Scenario::new("matrix_viewport_applied", &["matrix"], |ctx| {
            matrix_viewport_applied(ctx).boxed()
        }),
        Scenario::new("matrix_renders_data_url", &["matrix"], |ctx| {
            matrix_renders_data_url(ctx).boxed()
        }),
    ]
}

async fn expect_toast(
    upload: &UploadPage,
    needles: &[&str],
    timeout: Duration,
) -> E2eResult<String> {
    let text = upload.wait_toast(timeout).await?;
    ensure(
        TextPolicy::contains_any(needles).accepts(Some(&text)),
        format!("toast '{}' mentions none of {:?}", text, needles),
    )?;
    Ok(text)
}

async fn login_page_renders(ctx: ScenarioContext) -> E2eResult<()> {
    let login = ctx.login_page().await?;
    ensure(login.is_username_input_visible().await?, "username input visible")?;
    ensure(login.is_password_input_visible().await?, "password input visible")?;
    ensure(login.is_submit_button_visible().await?, "submit button visible")
}

async fn login_valid_credentials(ctx: ScenarioContext) -> E2eResult<()> {
    let dashboard = ctx.login().await?;
    ensure(
        dashboard.current_url().contains("/dashboard"),
        "redirected to /dashboard",
    )?;
    ensure(dashboard.is_heading_visible().await, "dashboard heading visible")
}

async fn login_invalid_credentials(ctx: ScenarioContext) -> E2eResult<()> {
    let login = ctx
        .login_page()
        .await?
        .login_with_invalid_credentials("wrong", "wrong")
        .await?;

    let outcome = async {
        login.verify_page_loaded().await?;
        match login.detect_error().await {
            Some(detection) => {
                info!("invalid login reported via {}", detection.detector);
                Ok(())
            }
            None => Err(E2eError::AssertionFailed(
                "no error shown for invalid credentials".to_string(),
            )),
        }
    }
    .await;

    if outcome.is_err() {
        ctx.capture("login_invalid_credentials").await;
    }
    outcome
}

async fn protected_routes_redirect(ctx: ScenarioContext) -> E2eResult<()> {
    let base = ctx.base();
    base.goto(&AppRoute::Login).await?;
    base.clear_storage().await?;

    for route in AppRoute::protected() {
        base.goto(&route).await?;
        base.verify_route(&AppRoute::Login).await.map_err(|_| {
            E2eError::AssertionFailed(format!(
                "{} did not redirect to /login (at {})",
                route,
                base.current_url()
            ))
        })?;
    }
    Ok(())
}

async fn dashboard_quick_upload(ctx: ScenarioContext) -> E2eResult<()> {
    ctx.seed_auth().await?;
    let base = ctx.base();
    base.goto(&AppRoute::Dashboard).await?;

    let upload = DashboardPage::new(base).await?.click_quick_upload().await?;
    ensure(upload.current_url().contains("/upload"), "quick action opened /upload")
}

async fn upload_page_renders(ctx: ScenarioContext) -> E2eResult<()> {
    let upload = ctx.open_upload().await?;
    ensure(upload.is_heading_visible().await, "upload heading visible")?;
    ensure(upload.is_file_input_present().await?, "file input present")?;
    ensure(upload.is_upload_button_visible().await?, "upload button visible")?;

    let nav = NavigationComponent::new(upload.base().clone());
    ensure(nav.is_dashboard_link_visible().await?, "dashboard link visible")?;
    ensure(nav.is_invoices_link_visible().await?, "invoices link visible")?;

    let invoices = upload.navigate_to_invoices().await?;
    ensure(invoices.is_heading_visible().await, "invoices heading visible")
}

async fn upload_button_follows_selection(ctx: ScenarioContext) -> E2eResult<()> {
    let sample = ctx.fixtures.require("sample.pdf")?;
    let upload = ctx.open_upload().await?;

    ensure(
        !upload.is_upload_button_enabled().await?,
        "upload disabled before selection",
    )?;

    upload.select_file(&sample).await?;
    ensure(
        upload.is_upload_button_enabled().await?,
        "upload enabled after selecting a pdf",
    )?;

    if upload.remove_file_if_present().await? {
        ensure(
            !upload.is_upload_button_enabled().await?,
            "upload disabled after removing the file",
        )?;
    } else {
        warn!("no Remove control rendered; skipping the removal check");
    }
    Ok(())
}

async fn upload_rejects_non_pdf(ctx: ScenarioContext) -> E2eResult<()> {
    let bad = ctx.fixtures.require("bad.txt")?;
    let upload = ctx.open_upload().await?;
    upload.select_file(&bad).await?;
    expect_toast(&upload, &["invalid", "pdf"], SHORT_WAIT).await?;
    Ok(())
}

async fn upload_rejects_oversize(ctx: ScenarioContext) -> E2eResult<()> {
    let big = ctx.fixtures.require("big.pdf")?;
    let upload = ctx.open_upload().await?;
    upload.select_file(&big).await?;
    expect_toast(&upload, &["size", "10mb"], SHORT_WAIT).await?;
    Ok(())
}

async fn upload_server_error_toast(ctx: ScenarioContext) -> E2eResult<()> {
    let sample = ctx.fixtures.require("sample.pdf")?;
    let mock = ExtractMock::server_error()
        .install(&ctx.session.page)
        .await?;

    let upload = ctx.open_upload().await?;
    upload.select_file(&sample).await?;
    upload.click_upload().await?;
    expect_toast(&upload, &["error", "failed"], SUCCESS_WAIT).await?;

    ensure(mock.hits() > 0, "extract request was intercepted")
}

async fn upload_success_redirects(ctx: ScenarioContext) -> E2eResult<()> {
    let sample = ctx.fixtures.require("sample.pdf")?;
    let invoice = ExtractedInvoice::fake();
    let mock = ExtractMock::Success(invoice.clone())
        .install(&ctx.session.page)
        .await?;

    let upload = ctx.open_upload().await?;
    upload.select_file(&sample).await?;
    upload.click_upload().await?;

    let page = match upload
        .wait_invoice_url(&invoice.invoice_id, INVOICE_REDIRECT_TIMEOUT)
        .await
    {
        Ok(page) => page,
        Err(e) => {
            ctx.capture("upload_success_redirects").await;
            return Err(e);
        }
    };

    ensure(
        page.current_url().contains(&invoice.invoice_id),
        format!("url contains {}", invoice.invoice_id),
    )?;
    ensure(
        page.invoice_id().as_deref() == Some(invoice.invoice_id.as_str()),
        format!("invoice page shows {}", invoice.invoice_id),
    )?;
    ensure(mock.hits() > 0, "extract request was intercepted")
}

/// Login, upload a sample, then walk invoices and back to the dashboard.
/// The upload may succeed or fail depending on the backend; both continue.
async fn complete_user_journey(ctx: ScenarioContext) -> E2eResult<()> {
    let sample = ctx.fixtures.require("sample.pdf")?;

    let base = ctx.base();
    base.goto(&AppRoute::Login).await?;
    base.clear_storage().await?;

    let dashboard = ctx.login().await?;
    ensure(dashboard.is_heading_visible().await, "dashboard heading visible")?;

    let upload = dashboard.navigate_to_upload().await?;
    let invoices = match upload.upload_invoice(&sample).await? {
        UploadOutcome::Succeeded(invoice) => {
            info!("journey uploaded invoice {:?}", invoice.invoice_id());
            invoice.navigate_to_invoices().await?
        }
        UploadOutcome::Failed { page, message } => {
            warn!("journey upload failed: {:?}", message);
            page.navigate_to_invoices().await?
        }
        UploadOutcome::TimedOut(page) => {
            ctx.capture("complete_user_journey_upload").await;
            warn!("journey upload timed out");
            page.navigate_to_invoices().await?
        }
    };

    ensure(invoices.is_heading_visible().await, "invoices heading visible")?;
    let dashboard = invoices.navigate_to_dashboard().await?;
    ensure(dashboard.is_heading_visible().await, "back on dashboard")
}

async fn matrix_config_valid(ctx: ScenarioContext) -> E2eResult<()> {
    ctx.session.config.validate()?;
    info!(
        "matrix cell {} {}x{}",
        ctx.session.config.engine,
        ctx.session.config.viewport.width,
        ctx.session.config.viewport.height
    );
    Ok(())
}

async fn matrix_viewport_applied(ctx: ScenarioContext) -> E2eResult<()> {
    let page = &ctx.session.page;
    page.goto(DATA_URL_PAGE, None).await?;

    let width = page.evaluate_value("window.innerWidth").await?;
    let height = page.evaluate_value("window.innerHeight").await?;
    let actual = Viewport {
        width: parse_dimension(&width)?,
        height: parse_dimension(&height)?,
    };

    let expected = ctx.session.config.viewport;
    ensure(
        actual == expected,
        format!(
            "viewport {}x{}, configured {}x{}",
            actual.width, actual.height, expected.width, expected.height
        ),
    )
}

const DATA_URL_PAGE: &str = "data:text/html,%3Ch1%3EMatrix%20Check%3C%2Fh1%3E";

async fn matrix_renders_data_url(ctx: ScenarioContext) -> E2eResult<()> {
    let page = &ctx.session.page;
    page.goto(DATA_URL_PAGE, None).await?;

    let heading = page.locator("h1").await.inner_text().await?;
    ensure(
        heading.trim() == "Matrix Check",
        format!("heading rendered as '{}'", heading),
    )
}

/// Browsers may report `1920` or `1920.0`.
fn parse_dimension(raw: &str) -> E2eResult<u32> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32)
        .ok_or_else(|| E2eError::AssertionFailed(format!("not a dimension: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test]
    fn test_scenario_names_unique() {
        let scenarios = all();
        let names: HashSet<_> = scenarios.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn test_every_scenario_is_tagged() {
        assert!(all().iter().all(|s| !s.tags.is_empty()));
    }

    #[test_case("login", 3 ; "login")]
    #[test_case("matrix", 3 ; "matrix")]
    #[test_case("MOCK", 2 ; "case insensitive")]
    #[test_case("nope", 0 ; "unknown")]
    fn test_tag_filter(tag: &str, expected: usize) {
        assert_eq!(all().iter().filter(|s| s.has_tag(tag)).count(), expected);
    }

    #[test_case("1920", 1920)]
    #[test_case("1080.0", 1080)]
    #[test_case(" 800 ", 800)]
    fn test_parse_dimension(raw: &str, expected: u32) {
        assert_eq!(parse_dimension(raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_dimension_rejects_garbage() {
        assert!(parse_dimension("undefined").is_err());
        assert!(parse_dimension("-5").is_err());
    }
}
