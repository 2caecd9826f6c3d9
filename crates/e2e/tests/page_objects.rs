//! Page objects against local static pages
//!
//! Needs a Playwright driver and Chromium. Tests return early when no
//! browser can be launched.

mod test_server;

use std::time::Duration;

use invoice_e2e::fixtures::FixtureSet;
use invoice_e2e::pages::{BasePage, LoginPage, UploadOutcome, UploadPage, UploadSignal};
use invoice_e2e::{BrowserConfig, BrowserFactory, BrowserSession, Engine};
use tempfile::TempDir;
use test_server::TestServer;

async fn launch(server: &TestServer) -> Option<BrowserSession> {
    let config = BrowserConfig {
        engine: Engine::Chromium,
        headless: true,
        base_url: server.url(),
        ..Default::default()
    };
    match BrowserFactory::launch(&config).await {
        Ok(session) => Some(session),
        Err(e) => {
            eprintln!("skipping: cannot launch browser: {}", e);
            None
        }
    }
}

async fn open(session: &BrowserSession, url: &str) -> BasePage {
    let base = BasePage::new(session.page().clone(), session.config().base_url.clone());
    session.page().goto(url, None).await.expect("Failed to navigate");
    base
}

fn sample_pdf(tmp: &TempDir) -> std::path::PathBuf {
    let fixtures = FixtureSet::new(tmp.path());
    fixtures.ensure().expect("Failed to create fixtures");
    fixtures.sample_pdf()
}

#[tokio::test]
async fn test_login_error_prefers_inline_text() {
    let server = TestServer::start().await;
    let Some(mut session) = launch(&server).await else {
        return;
    };
    assert_eq!(session.browser_name(), "chromium");

    let base = open(&session, &format!("{}/inline-error", server.url())).await;
    let detection = LoginPage::new(base).detect_error().await;

    assert_eq!(detection.map(|d| d.detector), Some("inline"));

    session.close().await;
    server.shutdown();
}

#[tokio::test]
async fn test_login_error_falls_back_to_matching_toast() {
    let server = TestServer::start().await;
    let Some(mut session) = launch(&server).await else {
        return;
    };

    let base = open(&session, &format!("{}/toast-invalid", server.url())).await;
    let login = LoginPage::new(base);
    let detection = login.detect_error().await.expect("toast should be detected");

    assert_eq!(detection.detector, "toast");
    assert!(detection.text.unwrap().contains("Invalid login"));

    session.close().await;
    server.shutdown();
}

#[tokio::test]
async fn test_login_error_ignores_unrelated_toast() {
    let server = TestServer::start().await;
    let Some(mut session) = launch(&server).await else {
        return;
    };

    let base = open(&session, &format!("{}/toast-welcome", server.url())).await;
    let login = LoginPage::new(base);

    assert!(login.detect_error().await.is_none());
    assert!(!login.is_error_message_visible().await);

    session.close().await;
    server.shutdown();
}

#[tokio::test]
async fn test_upload_without_signal_times_out() {
    let server = TestServer::start().await;
    let Some(mut session) = launch(&server).await else {
        return;
    };
    let tmp = TempDir::new().unwrap();

    let base = open(&session, &format!("{}/silent/upload", server.url())).await;
    let upload = UploadPage::new(base).await.expect("route should verify");
    let outcome = upload
        .upload_invoice_within(&sample_pdf(&tmp), Duration::from_secs(1))
        .await
        .expect("upload should run");

    assert_eq!(outcome.kind(), UploadSignal::TimedOut);
    assert!(!outcome.is_success());

    session.close().await;
    server.shutdown();
}

#[tokio::test]
async fn test_upload_error_text_fails() {
    let server = TestServer::start().await;
    let Some(mut session) = launch(&server).await else {
        return;
    };
    let tmp = TempDir::new().unwrap();

    let base = open(&session, &format!("{}/failing/upload", server.url())).await;
    let upload = UploadPage::new(base).await.expect("route should verify");
    let outcome = upload
        .upload_invoice_within(&sample_pdf(&tmp), Duration::from_secs(1))
        .await
        .expect("upload should run");

    match outcome {
        UploadOutcome::Failed { page, message } => {
            assert_eq!(message.as_deref().map(str::trim), Some("Upload failed"));
            assert!(page.is_error_message_visible().await);
        }
        other => panic!("expected Failed, got {:?}", other.kind()),
    }

    session.close().await;
    server.shutdown();
}

#[tokio::test]
async fn test_upload_success_text_succeeds() {
    let server = TestServer::start().await;
    let Some(mut session) = launch(&server).await else {
        return;
    };
    let tmp = TempDir::new().unwrap();

    let base = open(&session, &format!("{}/working/upload", server.url())).await;
    let upload = UploadPage::new(base.clone()).await.expect("route should verify");
    let outcome = upload
        .upload_invoice_within(&sample_pdf(&tmp), Duration::from_secs(5))
        .await
        .expect("upload should run");

    assert_eq!(outcome.kind(), UploadSignal::Succeeded);

    let upload = UploadPage::new(base).await.expect("still on the form");
    assert!(upload.is_success_message_visible().await);
    assert!(!upload.is_error_message_visible().await);

    session.close().await;
    server.shutdown();
}
