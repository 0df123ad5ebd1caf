//! URI → (handler, action, params) resolution.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::ConfigDoc;

use super::table::RouteTable;

/// Canonical per-request resolution result. Constructed once per inbound
/// request, immutable, consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestArgs {
    pub handler: String,
    pub action: String,
    pub params: Vec<String>,
}

impl RequestArgs {
    /// Build request args, substituting `"index"` for empty handler or
    /// action names. Params are always a concrete sequence, never absent.
    pub fn new(
        handler: impl Into<String>,
        action: impl Into<String>,
        params: Vec<String>,
    ) -> Self {
        let handler = non_empty_or_index(handler.into());
        let action = non_empty_or_index(action.into());
        Self {
            handler,
            action,
            params,
        }
    }
}

fn non_empty_or_index(s: String) -> String {
    if s.is_empty() {
        "index".to_string()
    } else {
        s
    }
}

/// Append call-style suffixes to an action name: `Ajax` for AJAX requests,
/// `Post` for POST requests. Both apply independently, encoding the four
/// verb/style combinations as four distinct action names.
pub fn suffix_action(base: &str, is_ajax: bool, is_post: bool) -> String {
    let mut name = base.to_string();
    if is_ajax {
        name.push_str("Ajax");
    }
    if is_post {
        name.push_str("Post");
    }
    name
}

/// Resolves a raw URI into [`RequestArgs`], first via the route table and
/// otherwise by positional segment decomposition.
#[derive(Debug)]
pub struct RequestResolver {
    table: Arc<RouteTable>,
    prefixes: Vec<String>,
}

impl RequestResolver {
    /// Build the resolver, reading handler-name prefixes from
    /// `Site.Prefixes.Prefix[]`.
    pub fn from_config(doc: &ConfigDoc, table: Arc<RouteTable>) -> Self {
        let prefixes = doc
            .resolve("Site.Prefixes.Prefix")
            .iter()
            .map(|p| p.string_value().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { table, prefixes }
    }

    #[cfg(test)]
    fn with_prefixes(table: Arc<RouteTable>, prefixes: Vec<String>) -> Self {
        Self { table, prefixes }
    }

    /// Resolve a URI under the given method and call style.
    pub fn resolve(&self, uri: &str, is_post: bool, is_ajax: bool) -> RequestArgs {
        if let Some(m) = self.table.match_uri(uri) {
            let action = suffix_action(&m.rule.action, is_ajax, is_post);
            tracing::debug!(
                uri,
                pattern = %m.rule.pattern,
                handler = %m.rule.handler,
                action = %action,
                "Route matched"
            );
            return RequestArgs::new(m.rule.handler.clone(), action, m.params);
        }

        let trimmed = uri.trim_start_matches('/');
        let mut segments: VecDeque<&str> = if trimmed.is_empty() {
            VecDeque::new()
        } else {
            trimmed.split('/').collect()
        };

        // Multi-segment handler namespaces ("blog/admin") count as one
        // handler-name unit: the longest configured prefix the URI starts
        // with decides how many leading segments join into the name.
        let prefix_depth = self.prefix_depth(uri);
        let mut handler = take_segment(&mut segments);
        for _ in 0..prefix_depth {
            handler.push('_');
            handler.push_str(&take_segment(&mut segments));
        }

        let action = suffix_action(&take_segment(&mut segments), is_ajax, is_post);
        let params = segments.into_iter().map(str::to_string).collect();

        tracing::debug!(uri, handler = %handler, action = %action, "Positional resolution");
        RequestArgs::new(handler, action, params)
    }

    /// Segment count of the longest configured prefix the URI begins with,
    /// or 0 when none applies.
    fn prefix_depth(&self, uri: &str) -> usize {
        let mut used = "";
        for prefix in &self.prefixes {
            if uri.starts_with(&format!("/{prefix}")) && prefix.len() > used.len() {
                used = prefix;
            }
        }
        if used.is_empty() {
            0
        } else {
            used.split('/').count()
        }
    }
}

fn take_segment(segments: &mut VecDeque<&str>) -> String {
    match segments.pop_front() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "index".to_string(),
    }
}
