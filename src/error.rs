/// Error types for GridView
///
/// Caller-supplied closures (filter, search, sort) are never caught or
/// wrapped: a panic inside one unwinds straight to the caller of the view
/// operation that invoked it. Out-of-range reads are not errors either;
/// accessors return `None`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// `find_next`/`find_previous` was called with no search session open.
    #[error("no active search: call find() before navigating matches")]
    NoActiveSearch,

    /// `find` was called on a view built without a search function.
    #[error("no search function configured for this view")]
    NoSearchFunction,

    /// A JSON value used as a row was not an object.
    #[error("expected a JSON object for a row, got {0}")]
    InvalidRecord(String),

    /// View configuration could not be parsed.
    #[error("invalid view configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ViewError>;
