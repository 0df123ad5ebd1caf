//! URI-prefix IP allow-lists, enforced before routing.

use std::net::IpAddr;

use crate::config::ConfigDoc;
use crate::routing::RequestArgs;

/// One configured restriction: URIs under `pattern` are only served to the
/// listed addresses; everyone else is sent to the denial handler.
#[derive(Debug, Clone)]
struct Restriction {
    pattern: String,
    handler: String,
    action: String,
    allowed: Vec<IpAddr>,
}

/// All configured restrictions, in document order.
#[derive(Debug, Default)]
pub struct IpRestrictions {
    rules: Vec<Restriction>,
}

impl IpRestrictions {
    /// Build from `Site.IpRestrictions.Restrict[]`. Entries whose IP list
    /// fails to parse are kept with the unparsable addresses dropped; an
    /// empty allow-list then denies everyone, which fails closed.
    pub fn from_config(doc: &ConfigDoc) -> Self {
        let mut rules = Vec::new();
        for restrict in doc.resolve("Site.IpRestrictions.Restrict").iter() {
            let allowed = restrict
                .get("IP")
                .iter()
                .filter_map(|ip| match ip.string_value().parse() {
                    Ok(addr) => Some(addr),
                    Err(_) => {
                        tracing::warn!(value = ip.string_value(), "Ignoring unparsable IP entry");
                        None
                    }
                })
                .collect();
            rules.push(Restriction {
                pattern: restrict.attribute("pattern").to_string(),
                handler: restrict.attribute("controller").to_string(),
                action: restrict.attribute("action").to_string(),
                allowed,
            });
        }
        Self { rules }
    }

    /// Check a URI against the restrictions. Returns the denial target
    /// when the first restriction whose pattern prefixes the URI does not
    /// list the caller's address; the scan stops at that first match.
    pub fn check(&self, uri: &str, remote: IpAddr) -> Option<RequestArgs> {
        let rule = self
            .rules
            .iter()
            .find(|r| !r.pattern.is_empty() && uri.starts_with(&r.pattern))?;
        if rule.allowed.contains(&remote) {
            return None;
        }
        tracing::warn!(uri, %remote, pattern = %rule.pattern, "Address not in allow-list");
        Some(RequestArgs::new(
            rule.handler.clone(),
            rule.action.clone(),
            Vec::new(),
        ))
    }
}
