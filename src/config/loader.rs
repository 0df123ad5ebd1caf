//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::error::{FrameworkError, FrameworkResult};

use super::document::{ConfigDoc, Environment};

/// Load and parse the configuration document.
///
/// # Errors
///
/// [`FrameworkError::Config`] when the file cannot be read or the document
/// is malformed. Callers must abort startup on failure.
pub fn load_document(path: &Path, environment: Environment) -> FrameworkResult<ConfigDoc> {
    let content = fs::read_to_string(path).map_err(|e| {
        FrameworkError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    let doc = ConfigDoc::parse(&content, environment)?;
    tracing::info!(
        path = %path.display(),
        environment = environment.as_str(),
        "Configuration loaded"
    );
    Ok(doc)
}
