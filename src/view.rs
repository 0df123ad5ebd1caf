//! View rendering contract.
//!
//! Template engines live outside the core; the dispatcher only needs
//! "render the view for this handler/action with this model". The gate on
//! access level runs before any renderer is invoked.

use serde_json::Value;

use crate::error::FrameworkResult;

/// Renders the page for a resolved handler/action pair from a model.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, handler: &str, action: &str, model: &Value) -> FrameworkResult<String>;
}

/// Renderer that emits the model as pretty JSON, labeled with the view it
/// stands in for. Good enough for demos and tests; real sites plug in a
/// template engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ViewRenderer for JsonRenderer {
    fn render(&self, handler: &str, action: &str, model: &Value) -> FrameworkResult<String> {
        let body = serde_json::to_string_pretty(model)
            .map_err(|e| crate::error::FrameworkError::Internal(e.to_string()))?;
        Ok(format!("<!-- {handler}/{action} -->\n{body}\n"))
    }
}
