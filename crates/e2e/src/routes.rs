//! Application routes the suite navigates between

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppRoute {
    Login,
    Dashboard,
    Upload,
    Invoices,
    /// Invoice detail; `None` matches any id.
    Invoice(Option<String>),
}

impl AppRoute {
    pub fn path(&self) -> String {
        match self {
            AppRoute::Login => "/login".to_string(),
            AppRoute::Dashboard => "/dashboard".to_string(),
            AppRoute::Upload => "/upload".to_string(),
            AppRoute::Invoices => "/invoices".to_string(),
            AppRoute::Invoice(Some(id)) => format!("/invoice/{}", id),
            AppRoute::Invoice(None) => "/invoice".to_string(),
        }
    }

    /// URL glob accepted by [`crate::wait::wait_for_url`].
    pub fn url_glob(&self) -> String {
        match self {
            AppRoute::Invoice(None) => "**/invoice/**".to_string(),
            other => format!("**{}", other.path()),
        }
    }

    /// Lowercase fragment the current URL must contain once loaded.
    pub fn marker(&self) -> &'static str {
        match self {
            AppRoute::Login => "login",
            AppRoute::Dashboard => "dashboard",
            AppRoute::Upload => "upload",
            AppRoute::Invoices => "invoices",
            AppRoute::Invoice(_) => "invoice",
        }
    }

    /// Routes that redirect to login without an authenticated session.
    pub fn protected() -> [AppRoute; 3] {
        [AppRoute::Dashboard, AppRoute::Upload, AppRoute::Invoices]
    }
}

impl std::fmt::Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Join an application root and a route path.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(AppRoute::Login.path(), "/login");
        assert_eq!(AppRoute::Invoice(Some("FAKE-123".into())).path(), "/invoice/FAKE-123");
        assert_eq!(AppRoute::Invoices.to_string(), "/invoices");
    }

    #[test]
    fn test_url_globs() {
        assert_eq!(AppRoute::Dashboard.url_glob(), "**/dashboard");
        assert_eq!(AppRoute::Invoice(None).url_glob(), "**/invoice/**");
        assert_eq!(
            AppRoute::Invoice(Some("42".into())).url_glob(),
            "**/invoice/42"
        );
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:3000/", "/login"),
            "http://localhost:3000/login"
        );
        assert_eq!(
            join_url("http://localhost:3000", "upload"),
            "http://localhost:3000/upload"
        );
    }
}
