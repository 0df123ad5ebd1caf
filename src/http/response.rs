//! Outbound response model.

/// Session cookie to issue with the response. `expired` answers a
/// destroyed session: the adapter sets an already-expired cookie so the
/// client forgets the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub expired: bool,
}

/// What the body of the response is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// A rendered page.
    Page(String),
    /// A client redirect to a site-relative location.
    Redirect(String),
    /// No body (AJAX actions that render nothing).
    Empty,
}

/// The core's response: status fixed at the moment it was decided, a body
/// kind, and the session cookie to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub cookie: Option<SessionCookie>,
}

impl Response {
    pub fn page(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            kind: ResponseKind::Page(body.into()),
            cookie: None,
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            kind: ResponseKind::Redirect(location.into()),
            cookie: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            status: 200,
            kind: ResponseKind::Empty,
            cookie: None,
        }
    }

    /// Override the status while keeping the body. Used when a configured
    /// error page renders successfully: the page is normal, the status
    /// stays the one fixed when the error was raised.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_cookie(mut self, cookie: SessionCookie) -> Self {
        self.cookie = Some(cookie);
        self
    }
}
