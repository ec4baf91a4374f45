//! Error taxonomy for the world core.
//!
//! Only caller errors and content errors surface as `WorldError`. Factory
//! refusals are logged and the slot re-armed; height and raycast queries are
//! total functions and never fail.

use crate::types::AreaId;

/// Errors that can occur while configuring or registering world content.
#[derive(Debug)]
pub enum WorldError {
    /// Malformed spawn definition or unknown subtype key, reported once at
    /// content-generation time; the offending definition is skipped.
    Configuration(String),
    /// `register` was called with an identifier that is already registered.
    DuplicateAreaId(AreaId),
    /// A content table file could not be read or parsed.
    TableLoad { path: String, detail: String },
    /// IO error while exporting maps or reports.
    Io(std::io::Error),
    /// Image encoding error while exporting maps.
    Export(String),
}

impl std::fmt::Display for WorldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            WorldError::DuplicateAreaId(id) => write!(f, "duplicate area id: {}", id),
            WorldError::TableLoad { path, detail } => {
                write!(f, "failed to load content tables from {}: {}", path, detail)
            }
            WorldError::Io(e) => write!(f, "IO error: {}", e),
            WorldError::Export(msg) => write!(f, "export error: {}", msg),
        }
    }
}

impl std::error::Error for WorldError {}

impl From<std::io::Error> for WorldError {
    fn from(e: std::io::Error) -> Self {
        WorldError::Io(e)
    }
}
