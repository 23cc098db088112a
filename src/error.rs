use thiserror::Error;

/// Main error type for GraphChat
#[derive(Error, Debug)]
pub enum GraphChatError {
    /// Graph engine or model endpoint unreachable, or credentials rejected
    #[error("Connection error: {0}")]
    Connection(String),

    /// An installed query or vertex scan failed on the graph engine
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// Malformed transport input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hosted model API errors
    #[error("Model API error: {0}")]
    Llm(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type using GraphChatError
pub type Result<T> = std::result::Result<T, GraphChatError>;
