use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    /// A step ended with a fatal error; `source` is the error that stopped it.
    #[error("Step {name} failed: {source}")]
    Step {
        name: String,
        #[source]
        source: Box<BatchError>,
    },

    #[error("Tasklet from: {0}")]
    Tasklet(String),

    #[error("Configuration: {0}")]
    Configuration(String),

    /// A line could not be turned into a record: missing field or bad date.
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// An author token is not made of exactly two words.
    #[error("Malformed author {0:?}, expected \"Name Surname\"")]
    MalformedAuthor(String),

    #[error("No {kind} in store: {key}")]
    MissingReference { kind: &'static str, key: String },

    #[error("Store: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// Returns the innermost error, unwrapping step failures.
    pub fn root_cause(&self) -> &BatchError {
        match self {
            BatchError::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<mongodb::error::Error> for BatchError {
    fn from(error: mongodb::error::Error) -> Self {
        BatchError::Store(error.to_string())
    }
}

impl From<csv::Error> for BatchError {
    fn from(error: csv::Error) -> Self {
        BatchError::ItemReader(error.to_string())
    }
}

impl From<serde_json::Error> for BatchError {
    fn from(error: serde_json::Error) -> Self {
        BatchError::Configuration(error.to_string())
    }
}
