//! Route table: pattern → (handler, action) rules and reverse lookup.

use crate::config::ConfigDoc;
use crate::error::{FrameworkError, FrameworkResult};

/// One configured route: a URI prefix mapped to a handler and action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: String,
    pub handler: String,
    pub action: String,
}

/// All configured routes, frozen in document order at startup.
#[derive(Debug, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

/// Result of a successful prefix match.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub rule: &'a RouteRule,
    pub params: Vec<String>,
}

impl RouteTable {
    /// Build the table from `Site.Routes.Route[]`.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Config`] when any rule's pattern is `"/"` or
    /// absent: such a rule would prefix-match every URI and shadow the
    /// whole site.
    pub fn from_config(doc: &ConfigDoc) -> FrameworkResult<Self> {
        let mut table = Self::default();
        for route in doc.resolve("Site.Routes.Route").iter() {
            table.add(
                route.attribute("pattern"),
                route.attribute("controller"),
                route.attribute("action"),
            )?;
        }
        tracing::debug!(rules = table.rules.len(), "Route table built");
        Ok(table)
    }

    fn add(&mut self, pattern: &str, handler: &str, action: &str) -> FrameworkResult<()> {
        // "" and "/" both prefix every URI and would shadow the whole site.
        if pattern.is_empty() || pattern == "/" {
            return Err(FrameworkError::Config(format!(
                "route pattern {pattern:?} would shadow all URIs; remove it"
            )));
        }
        let handler = if handler.is_empty() { "index" } else { handler };
        let action = if action.is_empty() { "index" } else { action };
        self.rules.push(RouteRule {
            pattern: pattern.to_string(),
            handler: handler.to_string(),
            action: action.to_string(),
        });
        Ok(())
    }

    /// Longest-prefix match against a URI. Among all rules whose pattern
    /// prefixes `uri`, the longest pattern wins; equal lengths fall to the
    /// earlier rule. Params are the remainder after the pattern, trimmed of
    /// leading `/` and split on `/`.
    pub fn match_uri(&self, uri: &str) -> Option<RouteMatch<'_>> {
        let mut best: Option<&RouteRule> = None;
        for rule in &self.rules {
            if uri.starts_with(&rule.pattern)
                && best.is_none_or(|b| rule.pattern.len() > b.pattern.len())
            {
                best = Some(rule);
            }
        }
        best.map(|rule| {
            let remainder = uri[rule.pattern.len()..].trim_start_matches('/');
            let params = if remainder.is_empty() {
                Vec::new()
            } else {
                remainder.split('/').map(str::to_string).collect()
            };
            RouteMatch { rule, params }
        })
    }

    /// Pattern registered for the given handler and action, if any.
    /// Handler names use `_` internally where URIs use `/`, so the name is
    /// normalized before comparison. First matching rule wins.
    pub fn reverse_route(&self, handler: &str, action: &str) -> Option<&str> {
        let handler = handler.replace('/', "_");
        self.rules
            .iter()
            .find(|r| r.handler == handler && r.action == action)
            .map(|r| r.pattern.as_str())
    }

    /// Build a site-relative link for a handler/action/params triple: the
    /// registered route pattern when one exists, positional segments
    /// otherwise. Trailing `index` segments are elided the way URIs omit
    /// them.
    pub fn href(&self, handler: &str, action: &str, params: &[String]) -> String {
        // Prefixed handlers ("blog_admin") become path segments again; a
        // trailing "index" segment is dropped when the action is index too.
        let mut segments: Vec<&str> = handler.split('_').collect();
        if action == "index" && segments.len() > 1 && segments.last() == Some(&"index") {
            segments.pop();
        }
        let handler_path = segments.join("/");

        if let Some(pattern) = self.reverse_route(&handler_path, action) {
            return if params.is_empty() {
                pattern.to_string()
            } else {
                format!("{pattern}/{}", params.join("/"))
            };
        }

        let mut link = String::new();
        if handler_path != "index" || action != "index" || !params.is_empty() {
            link.push('/');
            link.push_str(&handler_path);
        }
        if action != "index" || !params.is_empty() {
            link.push('/');
            link.push_str(action);
        }
        if !params.is_empty() {
            link.push('/');
            link.push_str(&params.join("/"));
        }
        if link.is_empty() {
            link.push('/');
        }
        link
    }
}
