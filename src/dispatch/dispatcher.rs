//! Request dispatch: resolution, authorization, invocation, recovery.
//!
//! # Responsibilities
//! - Assemble the immutable per-process context (config, routes,
//!   resolver, restrictions, registry, sessions, renderer)
//! - Drive one request through Resolved → Loaded → Invoked →
//!   Rendered | Redirected
//! - Translate the first redirectable error into one re-dispatch to the
//!   configured error page; never a second

use std::sync::Arc;

use serde_json::Value;

use crate::config::ConfigDoc;
use crate::dispatch::registry::{ActionContext, ActionOutcome, HandlerRegistry};
use crate::error::{FrameworkError, FrameworkResult, RedirectClass};
use crate::http::{Request, Response, SessionCookie};
use crate::routing::{RequestArgs, RequestResolver, RouteTable};
use crate::security::{AccessGate, IpRestrictions};
use crate::session::{Session, SessionConfig, SessionStore};
use crate::view::ViewRenderer;

/// The process-wide dispatch context. Everything here except the session
/// store is immutable after construction; the whole struct is shared
/// behind an `Arc` by the server adapter.
pub struct Dispatcher {
    config: Arc<ConfigDoc>,
    routes: Arc<RouteTable>,
    resolver: RequestResolver,
    restrictions: IpRestrictions,
    registry: HandlerRegistry,
    sessions: Arc<SessionStore>,
    renderer: Box<dyn ViewRenderer>,
}

impl Dispatcher {
    /// Build the dispatch context from a loaded configuration document.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Config`] when the route table cannot be built
    /// (e.g. a `"/"` pattern). Startup must abort; there is no route
    /// table to redirect with.
    pub fn new(
        config: ConfigDoc,
        registry: HandlerRegistry,
        renderer: impl ViewRenderer + 'static,
        session_config: SessionConfig,
    ) -> FrameworkResult<Self> {
        let config = Arc::new(config);
        let routes = Arc::new(RouteTable::from_config(&config)?);
        let resolver = RequestResolver::from_config(&config, Arc::clone(&routes));
        let restrictions = IpRestrictions::from_config(&config);
        let sessions = Arc::new(SessionStore::new(session_config));
        Ok(Self {
            config,
            routes,
            resolver,
            restrictions,
            registry,
            sessions,
            renderer: Box::new(renderer),
        })
    }

    pub fn config(&self) -> &Arc<ConfigDoc> {
        &self.config
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Handle one request end to end. Infallible at this boundary: every
    /// error has been translated into a response carrying its status.
    pub fn handle(&self, request: &Request) -> Response {
        let mut session = self
            .sessions
            .open(request.session_token(), request.remote_addr());

        // IP allow-lists run before routing; a blocked caller is sent to
        // the restriction's own target instead of the resolved handler.
        let args = match self
            .restrictions
            .check(request.path(), request.remote_addr())
        {
            Some(denial) => denial,
            None => self
                .resolver
                .resolve(request.path(), request.is_post(), request.is_ajax()),
        };

        tracing::debug!(
            handler = %args.handler,
            action = %args.action,
            params = args.params.len(),
            "Dispatching"
        );

        let response = match self.dispatch(&args, request, &mut session) {
            Ok(response) => response,
            Err(err) => self.recover(err, request, &mut session),
        };

        let cookie = SessionCookie {
            name: self.sessions.cookie_name().to_string(),
            value: session.id().to_string(),
            expired: session.is_destroyed(),
        };
        response.with_cookie(cookie)
    }

    /// One pass of the dispatch state machine.
    fn dispatch(
        &self,
        args: &RequestArgs,
        request: &Request,
        session: &mut Session,
    ) -> FrameworkResult<Response> {
        // Loaded
        let entry = self
            .registry
            .entry(&args.handler)
            .ok_or_else(|| FrameworkError::HandlerNotFound {
                handler: args.handler.clone(),
            })?;

        // Invoked
        let action = entry
            .action(&args.action)
            .ok_or_else(|| FrameworkError::ActionNotFound {
                handler: args.handler.clone(),
                action: args.action.clone(),
            })?;
        if !action.invokable {
            return Err(FrameworkError::ActionNotInvokable {
                handler: args.handler.clone(),
                action: args.action.clone(),
            });
        }

        let mut instance = entry.instantiate();
        let mut ctx = ActionContext::new(request, session, &args.params);
        let outcome = (action.callback)(instance.as_mut(), &mut ctx)?;

        // Rendered | Redirected
        match outcome {
            ActionOutcome::Failure(reason) => Err(FrameworkError::ActionFailed {
                handler: args.handler.clone(),
                action: args.action.clone(),
                reason,
            }),
            ActionOutcome::Redirect {
                handler,
                action,
                params,
            } => Ok(Response::redirect(self.routes.href(&handler, &action, &params))),
            ActionOutcome::Done => {
                if request.is_ajax() {
                    return Ok(Response::empty());
                }
                AccessGate::check(session, entry.access_level)?;
                let body = self
                    .renderer
                    .render(&args.handler, &args.action, &Value::Null)?;
                Ok(Response::page(body))
            }
            ActionOutcome::Render(model) => {
                AccessGate::check(session, entry.access_level)?;
                if request.is_ajax() {
                    // AJAX callers get the bare model; templates are for
                    // page requests.
                    let body = serde_json::to_string(&model)
                        .map_err(|e| FrameworkError::Internal(e.to_string()))?;
                    return Ok(Response::page(body));
                }
                let body = self.renderer.render(&args.handler, &args.action, &model)?;
                Ok(Response::page(body))
            }
        }
    }

    /// Translate a redirectable failure into one re-dispatch to the
    /// configured error page. A failure of that re-dispatch, or an error
    /// with no redirect class or no configured target, is final.
    fn recover(&self, err: FrameworkError, request: &Request, session: &mut Session) -> Response {
        let status = err.status();
        let Some(class) = err.redirect_class() else {
            return self.fatal(&err);
        };
        let Some(target) = self.error_target(class) else {
            tracing::error!(error = %err, class = class.config_key(), "No error redirect configured");
            return self.fatal(&err);
        };

        tracing::warn!(
            error = %err,
            status,
            handler = %target.handler,
            action = %target.action,
            "Redirecting to configured error page"
        );
        match self.dispatch(&target, request, session) {
            // The error page is a normal page; the status stays the one
            // fixed when the error was raised.
            Ok(response) => response.with_status(status),
            Err(second) => self.fatal(&second),
        }
    }

    /// Configured target for an error class, from
    /// `Site.ErrorRedirects.<class>`.
    fn error_target(&self, class: RedirectClass) -> Option<RequestArgs> {
        let node = self
            .config
            .resolve(&format!("Site.ErrorRedirects.{}", class.config_key()));
        if !node.exists() {
            return None;
        }
        let params_attr = node.attribute("params");
        let params = if params_attr.is_empty() {
            Vec::new()
        } else {
            params_attr.split('/').map(str::to_string).collect()
        };
        Some(RequestArgs::new(
            node.attribute("controller"),
            node.attribute("action"),
            params,
        ))
    }

    /// Last resort: a minimal 500 page, with diagnostics only when the
    /// site asks for them.
    fn fatal(&self, err: &FrameworkError) -> Response {
        tracing::error!(error = %err, "Unrecoverable dispatch failure");
        let body = if self.config.show_exceptions() {
            format!("{err}")
        } else {
            "Internal error".to_string()
        };
        Response::page(body).with_status(500)
    }
}
