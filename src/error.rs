use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("http {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("invalid json from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("payload is missing key `{key}`")]
    MissingKey { key: String },
    #[error("payload key `{key}` is not an array")]
    NotAnArray { key: String },
    #[error("{table} row {row} is missing field `{field}`")]
    MissingField {
        table: &'static str,
        row: usize,
        field: &'static str,
    },
    #[error("{table} table has no column `{column}`")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// Anything that prevents the tables from being built for a render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
