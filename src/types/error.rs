use thiserror::Error;

/// cloudcost error types
#[derive(Error, Debug)]
pub enum CloudCostError {
    /// Provider records violate the input contract (negative cost, duplicate name, ...)
    #[error("validation error: {0}")]
    Validation(String),

    /// A cost point's stored total disagrees with the sum of its provider costs
    #[error("inconsistent total for {period}: expected {expected:.2}, got {actual:.2}")]
    InconsistentTotal {
        period: String,
        expected: f64,
        actual: f64,
    },

    /// Failed to parse a snapshot or config file
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Data provider failed to produce a snapshot
    #[error("provider error: {0}")]
    Provider(String),
}

/// Result type alias for cloudcost
pub type Result<T> = std::result::Result<T, CloudCostError>;
