use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItineraError {
    // Chain errors
    #[error("Chain request failed: {0}")]
    ChainRequest(String),

    #[error("Chain response parse error: {0}")]
    ChainParse(String),

    // Tool errors
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool execution failed: {tool}: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Tool timeout after {timeout_secs}s: {tool}")]
    ToolTimeout { tool: String, timeout_secs: u64 },

    #[error("Tool input validation failed: {0}")]
    ToolValidation(String),

    // Graph errors
    #[error("Node '{0}' not found in graph")]
    NodeNotFound(String),

    #[error("Node '{0}' has no outgoing edge")]
    RouteMissing(String),

    #[error("Extraction did not converge after {0} attempts")]
    ExtractionExhausted(usize),

    #[error("Tool loop did not settle after {0} iterations")]
    ToolLoopExhausted(usize),

    #[error("Conversation cancelled")]
    Cancelled,

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ItineraError>;
