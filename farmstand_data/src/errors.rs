//! Error types for loading the directory.

use std::path::PathBuf;

/// Errors that can occur while loading seed data into a [`crate::Directory`].
///
/// Dangling references between records are not errors; see
/// [`crate::Directory::dangling_references`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A seed file could not be parsed as YAML of the expected shape.
    #[error("Failed to parse {file}: {source}")]
    SeedParse {
        file: String,
        source: serde_yml::Error,
    },
    /// A seed file could not be read from disk.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Two records of the same entity share an id.
    #[error("Duplicate {entity} id: {id}")]
    DuplicateId { entity: &'static str, id: String },
}
