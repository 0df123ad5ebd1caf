//! Axum adapter around the synchronous dispatch core.
//!
//! # Responsibilities
//! - Accept connections and hand every path to one catch-all handler
//! - Translate the wire request (headers, cookie, form body) into the
//!   core's [`Request`] model
//! - Translate the core's [`Response`] back (status, body, Location,
//!   Set-Cookie)
//!
//! # Design Decisions
//! - The core stays synchronous; axum is a thin shell over it
//! - A destroyed session answers with an already-expired cookie so the
//!   client forgets the token

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::rejection::FormRejection,
    extract::{ConnectInfo, Form, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response as AxumResponse},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;
use crate::http::{Request, Response, ResponseKind, SessionCookie};

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
}

/// HTTP server wrapping a [`Dispatcher`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState { dispatcher };
        let router = Router::new()
            .route("/{*path}", any(serve_request))
            .route("/", any(serve_request))
            .with_state(state)
            .layer(TraceLayer::new_for_http());
        Self { router }
    }

    /// Run the server on the given listener until shutdown.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn serve_request(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AxumResponse {
    let token = cookie_value(&headers, state.dispatcher.sessions().cookie_name());
    // Non-form bodies are not an error here; the request just carries no
    // POST fields.
    let fields = form.map(|Form(fields)| fields).unwrap_or_default();
    let request = Request::new(method, uri.path(), addr.ip())
        .with_ajax(is_ajax(&headers))
        .with_session_token(token)
        .with_post_fields(fields);

    let response = state.dispatcher.handle(&request);
    into_axum(response)
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

fn into_axum(response: Response) -> AxumResponse {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    if let Some(cookie) = &response.cookie {
        if let Ok(value) = HeaderValue::from_str(&set_cookie_header(cookie)) {
            headers.insert(header::SET_COOKIE, value);
        }
    }

    match response.kind {
        ResponseKind::Page(body) => (status, headers, Html(body)).into_response(),
        ResponseKind::Redirect(location) => {
            if let Ok(value) = HeaderValue::from_str(&location) {
                headers.insert(header::LOCATION, value);
            }
            (status, headers).into_response()
        }
        ResponseKind::Empty => (status, headers).into_response(),
    }
}

fn set_cookie_header(cookie: &SessionCookie) -> String {
    if cookie.expired {
        // Destroyed sessions are cleared client-side with a cookie that
        // has already expired.
        format!(
            "{}=deleted; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            cookie.name
        )
    } else {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            cookie.name, cookie.value
        )
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_is_parsed_by_name() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; lang=en"),
        );
        assert_eq!(cookie_value(&headers, "session"), Some("abc123".into()));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn ajax_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-requested-with",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        assert!(is_ajax(&headers));
        assert!(!is_ajax(&HeaderMap::new()));
    }

    #[test]
    fn expired_cookie_clears_the_token() {
        let header = set_cookie_header(&SessionCookie {
            name: "session".into(),
            value: "gone".into(),
            expired: true,
        });
        assert!(header.contains("Expires=Thu, 01 Jan 1970"));
        assert!(!header.contains("gone"));
    }
}
