//! Error types for label-file operations.

use thiserror::Error;

/// Errors that can occur when reading or writing label files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A shape refers to a label with no catalog entry.
    ///
    /// Serialization rejects the whole save rather than emitting a bogus
    /// class index and corrupting the positional index stream.
    #[error("cannot serialize shape with unresolved label (class id {class_id})")]
    UnresolvedLabel {
        /// The class id that has no catalog entry
        class_id: u32,
    },
}
