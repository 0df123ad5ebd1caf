//! Inbound request model.
//!
//! All client-supplied input reaches the core through this type. POST
//! fields are only readable through a filter, and only via the action
//! context's token-verified reader, so handlers never see raw form values
//! and never read a submission whose form token was missing or forged.

use std::collections::HashMap;
use std::net::IpAddr;

use axum::http::Method;

/// Per-field sanitization applied when reading a POST value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFilter {
    /// The value as submitted.
    Raw,
    /// Strip markup tags and control characters.
    Text,
    /// Accept only a well-formed integer, normalized (e.g. `" 07 "` → `"7"`).
    Int,
    /// Keep only characters legal in a URL.
    Url,
}

/// One inbound HTTP request as the core sees it. Constructed by the
/// server adapter (or directly in tests), immutable afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    remote_addr: IpAddr,
    ajax: bool,
    session_token: Option<String>,
    post_fields: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, remote_addr: IpAddr) -> Self {
        Self {
            method,
            path: path.into(),
            remote_addr,
            ajax: false,
            session_token: None,
            post_fields: HashMap::new(),
        }
    }

    /// Mark this request as an AJAX call (`X-Requested-With:
    /// XMLHttpRequest` on the wire).
    pub fn with_ajax(mut self, ajax: bool) -> Self {
        self.ajax = ajax;
        self
    }

    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    pub fn with_post_fields(mut self, fields: HashMap<String, String>) -> Self {
        self.post_fields = fields;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn remote_addr(&self) -> IpAddr {
        self.remote_addr
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    pub fn is_ajax(&self) -> bool {
        self.ajax
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// A POST field passed through the given filter. `None` when the
    /// field is absent or the filter rejects it. Actions read fields
    /// through the action context, which verifies the form token first.
    pub(crate) fn post_field(&self, name: &str, filter: FieldFilter) -> Option<String> {
        let value = self.post_fields.get(name)?;
        match filter {
            FieldFilter::Raw => Some(value.clone()),
            FieldFilter::Text => Some(sanitize_text(value)),
            FieldFilter::Int => value.trim().parse::<i64>().ok().map(|n| n.to_string()),
            FieldFilter::Url => Some(sanitize_url(value)),
        }
    }
}

/// Drop `<...>` tag runs and control characters.
fn sanitize_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag && !c.is_control() => out.push(c),
            _ => {}
        }
    }
    out
}

/// Keep only characters that may appear in a URL.
fn sanitize_url(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "$-_.+!*'(),;/?:@&=%#~[]".contains(*c))
        .collect()
}
