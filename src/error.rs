//! Error types for the drivepath library.

use thiserror::Error;

/// Opaque error produced by a backing store or a caller-supplied callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for drivepath operations.
#[derive(Error, Debug)]
pub enum DriveError {
    /// A path segment could not be resolved. Carries the joined path up to
    /// and including the failing segment.
    #[error("`{0}' does not exist")]
    NotFound(String),

    /// More than one sibling matched a path segment. The remote graph is
    /// ambiguous for this name; it is never silently disambiguated.
    #[error("multiple entries found for `{0}'")]
    MultipleEntries(String),

    /// A directory operation hit a non-directory node.
    #[error("`{0}' is not a directory")]
    NotADirectory(String),

    /// A content operation hit a directory node.
    #[error("`{0}' is a directory")]
    IsADirectory(String),

    /// Creation failed because an ancestor along the path is a file.
    #[error("unable to create {what} in `{parent}': `{name}' is not a directory")]
    CreateUnder {
        /// What was being created ("directory" or "file").
        what: &'static str,
        /// Joined path of the offending ancestor.
        parent: String,
        /// Name of the offending ancestor.
        name: String,
    },

    /// Invalid caller input: empty paths or names, root-targeted mutations,
    /// unusable open modes.
    #[error("{0}")]
    InvalidArgument(String),

    /// A caller-supplied iteration callback failed. Kept distinct from
    /// store errors so callers can tell their own failures apart.
    #[error("callback failed: {0}")]
    Callback(#[source] BoxError),

    /// Opaque backing-store failure, passed through without interpretation.
    #[error("store error: {0}")]
    Store(#[source] BoxError),

    /// The store answered, but the response violates the contract in a way
    /// the core can report (e.g. a file without a checksum).
    #[error("invalid store response: {0}")]
    InvalidResponse(String),
}

impl DriveError {
    /// Wrap an opaque store failure.
    pub fn store<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        DriveError::Store(err.into())
    }
}

/// Result type alias for drivepath operations.
pub type Result<T> = std::result::Result<T, DriveError>;
