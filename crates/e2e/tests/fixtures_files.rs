//! Fixture generation and mock payloads, no browser needed

use std::fs;

use invoice_e2e::fixtures::{FixtureSet, MAX_UPLOAD_BYTES};
use invoice_e2e::mock::{ExtractMock, ExtractResponse};
use invoice_e2e::{E2eError, RunnerConfig};
use tempfile::TempDir;

#[test]
fn fixtures_straddle_the_upload_limit() {
    let tmp = TempDir::new().unwrap();
    let fixtures = FixtureSet::new(tmp.path());
    fixtures.ensure().unwrap();

    let sample = fs::metadata(fixtures.require("sample.pdf").unwrap()).unwrap();
    let big = fs::metadata(fixtures.require("big.pdf").unwrap()).unwrap();
    assert!(sample.len() < MAX_UPLOAD_BYTES);
    assert!(big.len() > MAX_UPLOAD_BYTES);

    let bad = fs::read(fixtures.require("bad.txt").unwrap()).unwrap();
    assert!(!bad.starts_with(b"%PDF"));
}

#[test]
fn ensure_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let fixtures = FixtureSet::new(tmp.path().join("nested").join("fixtures"));

    fixtures.ensure().unwrap();
    let first = fs::metadata(fixtures.big_pdf()).unwrap().len();
    fixtures.ensure().unwrap();
    let second = fs::metadata(fixtures.big_pdf()).unwrap().len();

    assert_eq!(first, second);
}

#[test]
fn missing_fixture_is_a_skip() {
    let tmp = TempDir::new().unwrap();
    let err = FixtureSet::new(tmp.path()).require("sample.pdf").unwrap_err();
    assert!(matches!(err, E2eError::FixtureMissing(_)));
    assert!(err.is_skip());
}

#[test]
fn mocked_success_body_parses_as_backend_response() {
    let body = ExtractMock::fake_success().body().unwrap();
    let response: ExtractResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.data.invoice_id, "FAKE-123");
    assert_eq!(response.data.vendor_name, "Mock Vendor");
}

#[test]
fn debug_dir_lives_under_output() {
    let config = RunnerConfig::default();
    assert_eq!(config.debug_dir(), config.output_dir.join("debug"));
}
