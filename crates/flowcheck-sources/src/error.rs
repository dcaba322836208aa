//! Error types for the source adapters.

use thiserror::Error;

/// Errors raised while loading a policy set or traffic inputs.
///
/// Every variant is fatal: the caller stops before evaluating anything.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("specify exactly one of --config, --excel, or --db-conn")]
    RuleSourceSelection,

    #[error("{path}: CSV file missing required header: {header}")]
    MissingHeader { path: String, header: String },

    #[error("{path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid network segment {value:?}: {reason}")]
    InvalidNetwork { value: String, reason: String },

    #[error("malformed port spec on line {line}: {content:?} (expected label,port/protocol)")]
    MalformedPortSpec { line: usize, content: String },

    #[error("config syntax error on line {line}: {message}")]
    ConfigSyntax { line: usize, message: String },

    #[error("failed to open workbook {path}: {source}")]
    Workbook {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook has no {0:?} sheet")]
    MissingSheet(String),

    #[error("sheet {sheet:?} is missing column {column:?}")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet {sheet:?} row {row}: invalid {column} value {value:?}")]
    InvalidCell {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }
}
