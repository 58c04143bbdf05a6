//! Embedded web dashboard for dqai.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page data quality dashboard (upload, results, chat)
//! - JSON API endpoints driving one shared [`Dashboard`]
//!
//! Launched via `dqai serve` (default: `http://127.0.0.1:8765`).

pub mod api;
mod frontend;

use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use anyhow::{Context, Result};
use colored::Colorize;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::backend::AnalysisBackend;
use crate::profile::GovernanceProfile;
use crate::session::Dashboard;

pub use api::ApiReply;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared by every request thread.
pub struct AppState {
    dashboard: Mutex<Dashboard>,
    backend: Arc<dyn AnalysisBackend>,
    backend_url: String,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        backend_url: impl Into<String>,
        profile: GovernanceProfile,
    ) -> Self {
        Self {
            dashboard: Mutex::new(Dashboard::new(profile)),
            backend,
            backend_url: backend_url.into(),
        }
    }

    /// Lock the dashboard. A panicked request thread does not take the
    /// dashboard down with it.
    pub fn lock(&self) -> MutexGuard<'_, Dashboard> {
        self.dashboard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Each request runs on its own thread so a slow
/// evaluate does not hold up chat or fix requests.
pub fn serve(addr: &str, state: AppState, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!(
        "{} running at {}",
        "dqai dashboard".bold(),
        format!("http://{addr}").cyan()
    );
    println!("Backend: {}", state.backend_url);
    println!("Press Ctrl+C to stop.\n");

    if open {
        // Best-effort
        let _ = open_browser(&format!("http://{addr}"));
    }

    let state = Arc::new(state);
    for request in server.incoming_requests() {
        let state = Arc::clone(&state);
        thread::spawn(move || handle(&state, request));
    }

    Ok(())
}

fn handle(state: &AppState, mut request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();

    // Read body up-front for methods that carry one
    let mut body = Vec::new();
    if matches!(method, Method::Put | Method::Post | Method::Patch) {
        let _ = request.as_reader().read_to_end(&mut body);
    }

    let status = match dispatch(state, &method, &url, body) {
        Ok(Routed::Page(html)) => {
            let resp = Response::from_data(html.as_bytes().to_vec())
                .with_header(content_type_html())
                .with_status_code(StatusCode(200));
            let _ = request.respond(resp);
            200
        }
        Ok(Routed::Json(reply)) => {
            let status = reply.status;
            let _ = request.respond(json_response(&reply));
            status
        }
        Err(e) => {
            let reply = ApiReply {
                status: 500,
                body: serde_json::json!({ "error": format!("{e:#}") }),
            };
            let _ = request.respond(json_response(&reply));
            500
        }
    };

    // Brief access log
    println!(
        "{} {} {} {}",
        chrono::Local::now().format("%H:%M:%S"),
        method,
        url.split('?').next().unwrap_or(&url),
        status
    );
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// What a route produced.
#[derive(Debug)]
pub enum Routed {
    Page(&'static str),
    Json(ApiReply),
}

/// Dispatch a request to the appropriate handler.
pub fn dispatch(state: &AppState, method: &Method, url: &str, body: Vec<u8>) -> Result<Routed> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    let reply = match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            return Ok(Routed::Page(frontend::INDEX_HTML));
        }

        // API: dashboard state
        (&Method::Get, "/api/state") => api::get_state(state)?,
        (&Method::Post, "/api/file") => api::post_file(state, url, body)?,
        (&Method::Delete, "/api/file") => api::delete_file(state)?,
        (&Method::Post, "/api/analyze") => api::post_analyze(state, &body)?,
        (&Method::Post, "/api/reset") => api::post_reset(state)?,

        // API: recommendations
        (&Method::Post, p) if p.starts_with("/api/recommendations/") => {
            match toggle_index(p) {
                Some(index) => api::post_toggle(state, index)?,
                None => ApiReply::not_found(),
            }
        }

        // API: chat
        (&Method::Get, "/api/chat") => api::get_chat(state)?,
        (&Method::Post, "/api/chat") => api::post_chat(state, &body)?,

        // API: health
        (&Method::Get, "/api/health") => api::get_health(state)?,

        // 404
        _ => ApiReply::not_found(),
    };

    Ok(Routed::Json(reply))
}

/// `/api/recommendations/{index}/toggle` → `index`.
fn toggle_index(path: &str) -> Option<usize> {
    path.strip_prefix("/api/recommendations/")?
        .strip_suffix("/toggle")?
        .parse()
        .ok()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn json_response(reply: &ApiReply) -> Response<Cursor<Vec<u8>>> {
    Response::from_data(reply.body.to_string().into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(reply.status))
}

/// JSON content type header.
fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
