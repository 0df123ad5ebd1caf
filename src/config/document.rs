//! Configuration document parsing and the owned node tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{FrameworkError, FrameworkResult};

use super::cursor::ConfigCursor;

/// Named deployment mode used to select among environment-scoped
/// configuration variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = FrameworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Environment::Production),
            "development" => Ok(Environment::Development),
            other => Err(FrameworkError::Config(format!(
                "unknown environment \"{other}\""
            ))),
        }
    }
}

/// One element of the configuration document: a name, its attributes in
/// document order, ordered children and accumulated text content.
///
/// Siblings with the same name may repeat; each may carry its own `env`
/// attribute scoping it to one [`Environment`].
#[derive(Debug, Clone)]
pub struct ConfigNode {
    pub name: String,
    attributes: Vec<(String, String)>,
    pub(super) children: Vec<ConfigNode>,
    text: String,
}

impl ConfigNode {
    /// Attribute value by name, `None` when absent.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Text content of this node, trimmed during parsing.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this node is visible under the given environment: no `env`
    /// attribute, or one that matches.
    pub(super) fn env_valid(&self, env: Environment) -> bool {
        match self.attribute("env") {
            None => true,
            Some(e) => e == env.as_str(),
        }
    }
}

/// Connection details for a named database, read from
/// `Connections.Database[]`. Consumed by data-access code outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub name: String,
    pub host: String,
    pub user: String,
    pub password: String,
}

/// The loaded configuration document: an immutable tree plus the active
/// environment. Built once at process start.
#[derive(Debug)]
pub struct ConfigDoc {
    root: ConfigNode,
    environment: Environment,
}

impl ConfigDoc {
    /// Parse a configuration document from XML text.
    ///
    /// # Errors
    ///
    /// [`FrameworkError::Config`] when the document is malformed or has no
    /// root element. This is unrecoverable: startup must abort.
    pub fn parse(xml: &str, environment: Environment) -> FrameworkResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<ConfigNode> = Vec::new();
        let mut root: Option<ConfigNode> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| FrameworkError::Config(format!("malformed document: {e}")))?;
            match event {
                Event::Start(e) => stack.push(node_from(&e)?),
                Event::Empty(e) => {
                    let node = node_from(&e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(e) => {
                    let decoded = e
                        .decode()
                        .map_err(|err| FrameworkError::Config(err.to_string()))?;
                    let unescaped = quick_xml::escape::unescape(&decoded)
                        .map_err(|err| FrameworkError::Config(err.to_string()))?;
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&unescaped);
                    }
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| FrameworkError::Config("unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Eof => break,
                // Declaration, comments, processing instructions.
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(FrameworkError::Config("unclosed element".into()));
        }
        let root =
            root.ok_or_else(|| FrameworkError::Config("document has no root element".into()))?;
        Ok(Self { root, environment })
    }

    /// The environment this document was loaded under.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Resolve a dotted path from the document root.
    ///
    /// Each intermediate step narrows to the first child (in document
    /// order) visible under the active environment. The final segment
    /// selects the whole same-named sibling set; an unmatched path yields
    /// an empty cursor, never an error.
    pub fn resolve(&self, path: &str) -> ConfigCursor<'_> {
        ConfigCursor::descend(&self.root, path, self.environment)
    }

    /// Whether fatal errors should carry diagnostic bodies
    /// (`Site.ShowExceptions` equal to `"true"`).
    pub fn show_exceptions(&self) -> bool {
        self.resolve("Site.ShowExceptions").string_value() == "true"
    }

    /// Connection details for the database registered under `name`, or
    /// `None` when the document has no such entry.
    pub fn connection(&self, name: &str) -> Option<ConnectionSettings> {
        self.resolve("Connections.Database")
            .iter()
            .find(|db| db.attribute("name") == name)
            .map(|db| ConnectionSettings {
                name: db.attribute("name").to_string(),
                host: db.attribute("host").to_string(),
                user: db.attribute("user").to_string(),
                password: db.attribute("password").to_string(),
            })
    }
}

fn node_from(e: &BytesStart<'_>) -> FrameworkResult<ConfigNode> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| FrameworkError::Config(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| FrameworkError::Config(err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(ConfigNode {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(
    stack: &mut [ConfigNode],
    root: &mut Option<ConfigNode>,
    node: ConfigNode,
) -> FrameworkResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(FrameworkError::Config(
            "multiple root elements in document".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <Config>
            <Site>
                <Domain env="development">localhost</Domain>
                <Domain>example.test</Domain>
                <ShowExceptions env="development">true</ShowExceptions>
            </Site>
            <Connections>
                <Database name="main" env="development" host="127.0.0.1" user="root" password=""/>
                <Database name="main" host="db.example.test" user="app" password="secret"/>
            </Connections>
        </Config>
    "#;

    #[test]
    fn unscoped_variant_wins_under_production() {
        let doc = ConfigDoc::parse(DOC, Environment::Production).unwrap();
        assert_eq!(doc.resolve("Site.Domain").string_value(), "example.test");
    }

    #[test]
    fn scoped_variant_wins_under_development() {
        let doc = ConfigDoc::parse(DOC, Environment::Development).unwrap();
        assert_eq!(doc.resolve("Site.Domain").string_value(), "localhost");
    }

    #[test]
    fn missing_path_is_empty_not_an_error() {
        let doc = ConfigDoc::parse(DOC, Environment::Production).unwrap();
        let cur = doc.resolve("Site.NoSuchThing.Deeper");
        assert_eq!(cur.string_value(), "");
        assert_eq!(cur.count(), 0);
    }

    #[test]
    fn show_exceptions_is_environment_scoped() {
        let prod = ConfigDoc::parse(DOC, Environment::Production).unwrap();
        let dev = ConfigDoc::parse(DOC, Environment::Development).unwrap();
        assert!(!prod.show_exceptions());
        assert!(dev.show_exceptions());
    }

    #[test]
    fn connection_respects_environment() {
        let prod = ConfigDoc::parse(DOC, Environment::Production).unwrap();
        let con = prod.connection("main").unwrap();
        assert_eq!(con.host, "db.example.test");

        let dev = ConfigDoc::parse(DOC, Environment::Development).unwrap();
        let con = dev.connection("main").unwrap();
        assert_eq!(con.host, "127.0.0.1");
        assert_eq!(con.user, "root");
    }

    #[test]
    fn malformed_document_is_fatal() {
        let err = ConfigDoc::parse("<Config><Open></Config>", Environment::Production)
            .expect_err("mismatched tags must not parse");
        assert!(matches!(err, FrameworkError::Config(_)));
    }

    #[test]
    fn empty_document_is_fatal() {
        assert!(ConfigDoc::parse("", Environment::Production).is_err());
    }
}
