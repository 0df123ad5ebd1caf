//! Environment-scoped traversal over the configuration tree.

use super::document::{ConfigNode, Environment};

/// A borrowed view over the sibling set selected by a dotted path.
///
/// Value reads (`string_value`, `attribute`) pick the first sibling in
/// document order visible under the active environment; scoped variants
/// therefore belong before their unscoped fallback in the document.
/// `count` reports all siblings regardless of environment and exists for
/// diagnostics only.
#[derive(Debug, Clone)]
pub struct ConfigCursor<'a> {
    nodes: Vec<&'a ConfigNode>,
    env: Environment,
}

impl<'a> ConfigCursor<'a> {
    pub(super) fn empty(env: Environment) -> Self {
        Self {
            nodes: Vec::new(),
            env,
        }
    }

    /// Walk `path` down from `from`, narrowing each intermediate step to
    /// the first environment-valid child and collecting the full sibling
    /// set at the final segment.
    pub(super) fn descend(from: &'a ConfigNode, path: &str, env: Environment) -> Self {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let Some((last, intermediate)) = segments.split_last() else {
            return Self::empty(env);
        };

        let mut current = from;
        for seg in intermediate {
            match current
                .children
                .iter()
                .find(|c| c.name == *seg && c.env_valid(env))
            {
                Some(child) => current = child,
                None => return Self::empty(env),
            }
        }

        let nodes = current
            .children
            .iter()
            .filter(|c| c.name == *last)
            .collect();
        Self { nodes, env }
    }

    fn first_valid(&self) -> Option<&'a ConfigNode> {
        self.nodes.iter().copied().find(|n| n.env_valid(self.env))
    }

    /// Resolve a dotted path relative to this cursor's selected node.
    pub fn get(&self, path: &str) -> ConfigCursor<'a> {
        match self.first_valid() {
            Some(node) => Self::descend(node, path, self.env),
            None => Self::empty(self.env),
        }
    }

    /// Attribute of the selected node, or `""` when no environment-valid
    /// node exists or the attribute is absent.
    pub fn attribute(&self, name: &str) -> &'a str {
        self.first_valid()
            .and_then(|n| n.attribute(name))
            .unwrap_or("")
    }

    /// Text value of the selected node, or `""` when no environment-valid
    /// node exists.
    pub fn string_value(&self) -> &'a str {
        self.first_valid().map(ConfigNode::text).unwrap_or("")
    }

    /// Total siblings at this position, whatever their environment.
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether an environment-valid node exists at this position.
    pub fn exists(&self) -> bool {
        self.first_valid().is_some()
    }

    /// Iterate the environment-valid siblings, each as its own cursor.
    pub fn iter(&self) -> impl Iterator<Item = ConfigCursor<'a>> + '_ {
        let env = self.env;
        self.nodes
            .iter()
            .copied()
            .filter(move |n| n.env_valid(env))
            .map(move |n| ConfigCursor {
                nodes: vec![n],
                env,
            })
    }
}
