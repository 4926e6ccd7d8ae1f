use thiserror::Error;

#[derive(Error, Debug)]
pub enum AbmError {
    #[error("unknown facet '{0}'")]
    UnknownFacet(String),
    #[error("unknown aptitude band '{0}'")]
    UnknownBand(String),
    #[error("invalid aptitude rule table: {0}")]
    InvalidRules(String),
    #[error("failed to read dataset '{path}': {source}")]
    Dataset {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AbmError>;
