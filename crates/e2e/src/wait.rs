//! Bounded waits
//!
//! Every wait in the suite polls with a deadline. A timeout is either mapped
//! to `false` by the visibility checks or surfaced as [`E2eError::Timeout`].

use std::future::Future;
use std::time::{Duration, Instant};

use playwright_rs::{expect, Locator, Page};
use regex::Regex;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Route verification after a navigation.
pub const ROUTE_TIMEOUT: Duration = Duration::from_secs(5);
/// Heading and inline-error checks.
pub const SHORT_WAIT: Duration = Duration::from_secs(3);
pub const ERROR_WAIT: Duration = Duration::from_secs(2);
pub const SUCCESS_WAIT: Duration = Duration::from_secs(5);
/// Backend extraction can be slow on a cold model.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
pub const INVOICE_REDIRECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Poll `check` until it returns `Ok(true)` or `timeout` elapses.
///
/// Errors from `check` count as "not yet": the page may be mid-navigation.
pub async fn wait_until<F, Fut>(what: &str, timeout: Duration, mut check: F) -> E2eResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<bool>>,
{
    let start = Instant::now();
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        match check().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => debug!("{} not ready (attempt {}): {}", what, attempts, e),
        }

        if start.elapsed() >= timeout {
            return Err(E2eError::Timeout(format!(
                "{} after {} ms",
                what,
                timeout.as_millis()
            )));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Translate a Playwright URL glob into an anchored regex.
///
/// `**` matches anything, `*` anything but `/`, `?` one character.
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    out
}

pub fn url_matches(pattern: &str, url: &str) -> bool {
    match Regex::new(&glob_to_regex(pattern)) {
        Ok(re) => re.is_match(url),
        Err(_) => pattern == url,
    }
}

/// Wait for the page URL to match a glob such as `**/dashboard`.
pub async fn wait_for_url(page: &Page, pattern: &str, timeout: Duration) -> E2eResult<()> {
    wait_until(&format!("url {}", pattern), timeout, || async move {
        Ok(url_matches(pattern, &page.url()))
    })
    .await
}

/// Wait for the locator to become visible.
pub async fn wait_for_visible(locator: Locator, timeout: Duration) -> E2eResult<()> {
    let selector = locator.selector().to_string();
    expect(locator)
        .with_timeout(timeout)
        .with_poll_interval(POLL_INTERVAL)
        .to_be_visible()
        .await
        .map_err(|e| E2eError::Timeout(format!("{} visible: {}", selector, e)))
}

/// First element matching `selector` once it is visible.
pub async fn wait_for_selector(page: &Page, selector: &str, timeout: Duration) -> E2eResult<Locator> {
    let locator = page.locator(selector).await.first();
    wait_for_visible(locator.clone(), timeout).await?;
    Ok(locator)
}

/// Non-failing variant of [`wait_for_visible`]: any failure reads as "not visible".
pub async fn is_visible_within(locator: Locator, timeout: Duration) -> bool {
    wait_for_visible(locator, timeout).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_case::test_case;

    #[test_case("**/dashboard", "http://localhost:3000/dashboard", true)]
    #[test_case("**/dashboard", "http://localhost:3000/dashboard/extra", false)]
    #[test_case("**/login", "http://localhost:3000/dashboard", false)]
    #[test_case("**/invoice/**", "http://localhost:3000/invoice/FAKE-123", true)]
    #[test_case("**/invoice/**", "http://localhost:3000/invoices", false)]
    #[test_case("**/invoice/FAKE-123", "https://app.test/invoice/FAKE-123", true)]
    #[test_case("**/upload?", "http://h/upload1", true ; "question mark")]
    #[test_case("http://h/*/x", "http://h/a/b/x", false ; "single star stops at slash")]
    fn test_url_matches(pattern: &str, url: &str, expected: bool) {
        assert_eq!(url_matches(pattern, url), expected);
    }

    #[test]
    fn test_glob_escapes_regex_metacharacters() {
        assert_eq!(glob_to_regex("**/a.b"), r"^.*/a\.b$");
        assert!(!url_matches("**/a.b", "http://h/aXb"));
    }

    #[tokio::test]
    async fn test_wait_until_succeeds_after_polls() {
        let calls = AtomicUsize::new(0);
        let result = wait_until("counter", Duration::from_secs(2), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n >= 2) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let result = wait_until("never", Duration::from_millis(250), || async { Ok(false) }).await;
        match result {
            Err(E2eError::Timeout(msg)) => assert!(msg.contains("never")),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_until_treats_errors_as_not_ready() {
        let calls = AtomicUsize::new(0);
        let result = wait_until("flaky", Duration::from_secs(2), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(E2eError::AssertionFailed("detached".into()))
                } else {
                    Ok(true)
                }
            }
        })
        .await;

        assert!(result.is_ok());
    }
}
