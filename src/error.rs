use thiserror::Error;

/// Errors raised while compiling a user-supplied formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("syntax error at position {position}: unexpected {token}")]
    Syntax { position: usize, token: String },

    #[error("formula is {length} bytes long, the limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("formula nests deeper than {limit} levels at position {position}")]
    TooDeep { position: usize, limit: usize },

    #[error("identifier '{name}' is not the variable x, a declared parameter or an allowed constant")]
    UnknownIdentifier { name: String },

    #[error("function '{name}' is not allowed")]
    UnknownFunction { name: String },

    #[error("{function}() takes {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("'{name}' is not a valid parameter name")]
    InvalidParameterName { name: String },

    #[error("parameter '{name}' is declared more than once")]
    DuplicateParameter { name: String },

    #[error("'{name}' is reserved and cannot be used as a parameter name")]
    ReservedParameterName { name: String },

    #[error("formula expects {expected} parameter(s), got {got}")]
    ParameterCount { expected: usize, got: usize },
}

/// Error types for the fitlab-rs library.
#[derive(Error, Debug)]
pub enum FitLabError {
    /// Bad registry entry or invalid tunable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown model identifier or a model that cannot be evaluated.
    #[error("Equation error: {0}")]
    Equation(String),

    /// Invalid or unsafe custom formula.
    #[error("Equation error: {0}")]
    Formula(#[from] FormulaError),

    /// Reloading a dataset from its source failed.
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// A dataset violates its shape or value invariants.
    #[error("Data validation error: {0}")]
    DataValidation(String),

    /// The optimizer could not produce a fit.
    #[error("Fitting error: {0}")]
    Fitting(String),

    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse error taxonomy shared by every failure the core reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Equation,
    DataLoad,
    DataValidation,
    Fitting,
}

impl FitLabError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FitLabError::Configuration(_) | FitLabError::Json(_) => ErrorKind::Configuration,
            FitLabError::Equation(_) | FitLabError::Formula(_) => ErrorKind::Equation,
            FitLabError::DataLoad(_) | FitLabError::Io(_) => ErrorKind::DataLoad,
            FitLabError::DataValidation(_) => ErrorKind::DataValidation,
            FitLabError::Fitting(_) | FitLabError::DimensionMismatch(_) => ErrorKind::Fitting,
        }
    }

    /// Prefix the message with the unit (model or dataset) it concerns.
    ///
    /// Structured variants are flattened into their kind's string variant.
    pub fn context(self, unit: &str) -> Self {
        let message = match &self {
            FitLabError::Configuration(m)
            | FitLabError::Equation(m)
            | FitLabError::DataLoad(m)
            | FitLabError::DataValidation(m)
            | FitLabError::Fitting(m)
            | FitLabError::DimensionMismatch(m) => m.clone(),
            FitLabError::Formula(e) => e.to_string(),
            FitLabError::Io(e) => e.to_string(),
            FitLabError::Json(e) => e.to_string(),
        };
        let message = format!("[{}] {}", unit, message);
        match self.kind() {
            ErrorKind::Configuration => FitLabError::Configuration(message),
            ErrorKind::Equation => FitLabError::Equation(message),
            ErrorKind::DataLoad => FitLabError::DataLoad(message),
            ErrorKind::DataValidation => FitLabError::DataValidation(message),
            ErrorKind::Fitting => FitLabError::Fitting(message),
        }
    }
}

/// Result type alias for fitlab-rs operations.
pub type Result<T> = std::result::Result<T, FitLabError>;
