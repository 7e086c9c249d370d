use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions while loading the source table. Per-cell problems never
/// show up here; the cleaner substitutes defaults for those.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("the file '{}' was not found", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(
        "'{}' line {line}: found {found} fields, but the header has {expected}",
        .path.display()
    )]
    TooManyFields {
        path: PathBuf,
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("'{}' has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Invalid arguments to a view derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("window of {window} years is outside 1..={max}")]
    WindowOutOfRange { window: u32, max: u32 },
}
