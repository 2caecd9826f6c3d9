//! Local HTTP server with static stand-ins for the app's screens

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{response::Html, routing::get, Router};
use tokio::task::JoinHandle;

pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind an ephemeral port and serve the pages below.
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/inline-error", get(|| async { Html(INLINE_ERROR) }))
            .route("/toast-invalid", get(|| async { Html(TOAST_INVALID) }))
            .route("/toast-welcome", get(|| async { Html(TOAST_WELCOME) }))
            .route("/silent/upload", get(|| async { Html(SILENT_UPLOAD) }))
            .route("/failing/upload", get(|| async { Html(FAILING_UPLOAD) }))
            .route("/working/upload", get(|| async { Html(WORKING_UPLOAD) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        TestServer { addr, handle }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

const INLINE_ERROR: &str = r#"<!DOCTYPE html>
<html><body>
  <form><input id="username" /><input id="password" type="password" />
  <button type="submit">Sign in</button></form>
  <p class="error">Invalid credentials</p>
</body></html>"#;

const TOAST_INVALID: &str = r#"<!DOCTYPE html>
<html><body>
  <ol><li data-sonner-toast>Invalid login, please try again</li></ol>
</body></html>"#;

const TOAST_WELCOME: &str = r#"<!DOCTYPE html>
<html><body>
  <ol><li data-sonner-toast>Welcome back</li></ol>
</body></html>"#;

/// Upload form whose button never produces any signal.
const SILENT_UPLOAD: &str = r#"<!DOCTYPE html>
<html><body>
  <h1>Upload Invoice</h1>
  <input type="file" />
  <button>Upload &amp; Extract</button>
</body></html>"#;

const FAILING_UPLOAD: &str = r#"<!DOCTYPE html>
<html><body>
  <h1>Upload Invoice</h1>
  <input type="file" />
  <button id="go">Upload &amp; Extract</button>
  <div id="status"></div>
  <script>
    document.getElementById('go').addEventListener('click', () => {
      document.getElementById('status').textContent = 'Upload failed';
    });
  </script>
</body></html>"#;

const WORKING_UPLOAD: &str = r#"<!DOCTYPE html>
<html><body>
  <h1>Upload Invoice</h1>
  <input type="file" />
  <button id="go">Upload &amp; Extract</button>
  <div id="status"></div>
  <script>
    document.getElementById('go').addEventListener('click', () => {
      document.getElementById('status').textContent = 'Invoice uploaded successfully';
    });
  </script>
</body></html>"#;
