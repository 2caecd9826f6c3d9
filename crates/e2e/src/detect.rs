//! Priority-ordered detectors
//!
//! A page often signals the same outcome in more than one way: an inline
//! message, or a generic toast whose text has to be inspected. A
//! [`DetectorChain`] tries each [`Detector`] in order, each with its own
//! timeout, and reports the first that fires.

use std::time::Duration;

use playwright_rs::Page;
use tracing::debug;

use crate::wait::is_visible_within;

/// Generic toast container rendered by the app's notification library.
pub const TOAST_SELECTOR: &str = "[data-sonner-toast]";

/// What a visible element's text must satisfy for a detector to fire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPolicy {
    /// Presence alone is enough
    Any,
    /// Text must contain one of these (case-insensitive). Text that cannot
    /// be read counts as a match.
    ContainsAny(Vec<String>),
}

impl TextPolicy {
    pub fn contains_any(needles: &[&str]) -> Self {
        TextPolicy::ContainsAny(needles.iter().map(|n| n.to_lowercase()).collect())
    }

    /// `text` is `None` when the element was found but its text unreadable.
    pub fn accepts(&self, text: Option<&str>) -> bool {
        match (self, text) {
            (TextPolicy::Any, _) => true,
            (TextPolicy::ContainsAny(_), None) => true,
            (TextPolicy::ContainsAny(needles), Some(text)) => {
                let text = text.to_lowercase();
                needles.iter().any(|n| text.contains(n.as_str()))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Detector {
    pub name: &'static str,
    pub selector: String,
    pub timeout: Duration,
    pub text: TextPolicy,
}

impl Detector {
    pub fn new(name: &'static str, selector: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name,
            selector: selector.into(),
            timeout,
            text: TextPolicy::Any,
        }
    }

    pub fn with_text(mut self, policy: TextPolicy) -> Self {
        self.text = policy;
        self
    }

    /// Toast detector firing only on text containing one of `needles`.
    pub fn toast(needles: &[&str], timeout: Duration) -> Self {
        Self::new("toast", TOAST_SELECTOR, timeout).with_text(TextPolicy::contains_any(needles))
    }

    async fn detect(&self, page: &Page) -> Option<Detection> {
        let locator = page.locator(&self.selector).await.first();
        if !is_visible_within(locator.clone(), self.timeout).await {
            debug!("detector '{}' saw nothing within {:?}", self.name, self.timeout);
            return None;
        }

        let text = match self.text {
            TextPolicy::Any => None,
            TextPolicy::ContainsAny(_) => match locator.inner_text().await {
                Ok(text) => Some(text),
                Err(e) => {
                    debug!("detector '{}' could not read text: {}", self.name, e);
                    None
                }
            },
        };

        if self.text.accepts(text.as_deref()) {
            Some(Detection {
                detector: self.name,
                text,
            })
        } else {
            debug!(
                "detector '{}' found element but text did not match: {:?}",
                self.name, text
            );
            None
        }
    }
}

/// A detector that fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub detector: &'static str,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DetectorChain {
    detectors: Vec<Detector>,
}

impl DetectorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, detector: Detector) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name).collect()
    }

    /// Upper bound on how long [`DetectorChain::first_match`] can take.
    pub fn budget(&self) -> Duration {
        self.detectors.iter().map(|d| d.timeout).sum()
    }

    pub async fn first_match(&self, page: &Page) -> Option<Detection> {
        for detector in &self.detectors {
            if let Some(hit) = detector.detect(page).await {
                debug!("detector '{}' fired", hit.detector);
                return Some(hit);
            }
        }
        None
    }
}
