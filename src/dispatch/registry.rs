//! Handler registry: explicit (handler, action) → callable tables.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;

use crate::error::{FrameworkError, FrameworkResult};
use crate::http::{FieldFilter, Request};
use crate::session::Session;

/// POST field carrying the form token issued by
/// [`Session::issue_form_token`].
pub const FORM_TOKEN_FIELD: &str = "form_token";

/// What an action produced.
#[derive(Debug)]
pub enum ActionOutcome {
    /// A model for the view renderer.
    Render(Value),
    /// Finished with nothing to render (AJAX side effects, streaming done
    /// elsewhere).
    Done,
    /// Send the client to another handler/action.
    Redirect {
        handler: String,
        action: String,
        params: Vec<String>,
    },
    /// The action ran and failed; translated to a 404-class error.
    Failure(String),
}

impl ActionOutcome {
    /// Build a [`ActionOutcome::Render`] from any serializable model.
    pub fn model<M: Serialize>(model: M) -> FrameworkResult<Self> {
        let value =
            serde_json::to_value(model).map_err(|e| FrameworkError::Internal(e.to_string()))?;
        Ok(ActionOutcome::Render(value))
    }

    pub fn redirect(
        handler: impl Into<String>,
        action: impl Into<String>,
        params: Vec<String>,
    ) -> Self {
        ActionOutcome::Redirect {
            handler: handler.into(),
            action: action.into(),
            params,
        }
    }
}

/// Everything an action may touch while it runs.
///
/// POST fields are only reachable through [`ActionContext::post_field`],
/// which verifies the submitted form token before handing out the first
/// value.
pub struct ActionContext<'a> {
    pub request: &'a Request,
    pub session: &'a mut Session,
    /// Positional URI parameters, in order.
    pub params: &'a [String],
    form_verified: bool,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        request: &'a Request,
        session: &'a mut Session,
        params: &'a [String],
    ) -> Self {
        Self {
            request,
            session,
            params,
            form_verified: false,
        }
    }

    /// Read a POST field through the given filter.
    ///
    /// The first read of a POST request checks the [`FORM_TOKEN_FIELD`]
    /// value against the session's outstanding tokens and fails with
    /// [`FrameworkError::InvalidFormToken`] when it is absent or unknown.
    /// The verification is cached for the rest of the request, so a page
    /// submission that spends the token set still reads its remaining
    /// fields.
    pub fn post_field(
        &mut self,
        name: &str,
        filter: FieldFilter,
    ) -> FrameworkResult<Option<String>> {
        if self.request.is_post() && !self.form_verified {
            let presented = self
                .request
                .post_field(FORM_TOKEN_FIELD, FieldFilter::Raw)
                .ok_or(FrameworkError::InvalidFormToken)?;
            self.session
                .check_form_token(&presented, self.request.is_ajax())?;
            self.form_verified = true;
        }
        Ok(self.request.post_field(name, filter))
    }
}

type BoxedAction =
    Box<dyn Fn(&mut (dyn Any + Send), &mut ActionContext<'_>) -> FrameworkResult<ActionOutcome> + Send + Sync>;

pub(crate) struct ActionEntry {
    pub(crate) invokable: bool,
    pub(crate) callback: BoxedAction,
}

pub(crate) struct HandlerEntry {
    factory: Box<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>,
    pub(crate) access_level: u32,
    actions: HashMap<String, ActionEntry>,
}

impl HandlerEntry {
    /// Fresh instance for one request; instances are never reused.
    pub(crate) fn instantiate(&self) -> Box<dyn Any + Send> {
        (self.factory)()
    }

    pub(crate) fn action(&self, name: &str) -> Option<&ActionEntry> {
        self.actions.get(name)
    }
}

/// All registered handlers, built once at startup and immutable while
/// serving. Existence and visibility of an action are plain map lookups.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerEntry>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name` with a per-request factory, then
    /// declare its actions on the returned scope:
    ///
    /// ```ignore
    /// registry
    ///     .handler("blog", BlogHandler::default)
    ///     .access_level(1)
    ///     .action("list", |h, ctx| h.list(ctx))
    ///     .internal("reindex", |h, ctx| h.reindex(ctx));
    /// ```
    pub fn handler<H, F>(&mut self, name: &str, factory: F) -> HandlerScope<'_, H>
    where
        H: Send + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let new_entry = HandlerEntry {
            factory: Box::new(move || Box::new(factory())),
            access_level: 0,
            actions: HashMap::new(),
        };
        let entry = match self.handlers.entry(name.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(new_entry);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(new_entry),
        };
        HandlerScope {
            entry,
            _marker: PhantomData,
        }
    }

    pub(crate) fn entry(&self, name: &str) -> Option<&HandlerEntry> {
        self.handlers.get(name)
    }
}

/// Builder scope for one handler's actions.
pub struct HandlerScope<'r, H> {
    entry: &'r mut HandlerEntry,
    _marker: PhantomData<fn(H)>,
}

impl<H: Send + 'static> HandlerScope<'_, H> {
    /// Access level the session must hold before this handler's views
    /// render. Declared here, read by the gate on every dispatch.
    pub fn access_level(self, level: u32) -> Self {
        self.entry.access_level = level;
        self
    }

    /// Declare an externally invokable action.
    pub fn action<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&mut H, &mut ActionContext<'_>) -> FrameworkResult<ActionOutcome>
            + Send
            + Sync
            + 'static,
    {
        self.add(name, true, f)
    }

    /// Declare an action that exists but may not be reached from a URI.
    pub fn internal<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&mut H, &mut ActionContext<'_>) -> FrameworkResult<ActionOutcome>
            + Send
            + Sync
            + 'static,
    {
        self.add(name, false, f)
    }

    fn add<F>(self, name: &str, invokable: bool, f: F) -> Self
    where
        F: Fn(&mut H, &mut ActionContext<'_>) -> FrameworkResult<ActionOutcome>
            + Send
            + Sync
            + 'static,
    {
        let callback: BoxedAction = Box::new(move |instance, ctx| {
            let handler = instance.downcast_mut::<H>().ok_or_else(|| {
                FrameworkError::Internal("handler instance type mismatch".to_string())
            })?;
            f(handler, ctx)
        });
        self.entry
            .actions
            .insert(name.to_string(), ActionEntry { invokable, callback });
        self
    }
}
