use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovtermError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Code coverage disabled ({0})")]
    MeasurementUnavailable(String),

    #[error("Code coverage disabled, too many specs to cover (Max {max})")]
    SuiteTooLarge { count: usize, max: usize },

    #[error("Cannot read source file {path}: {source}")]
    SourceUnreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed coverage record for {path} line {line}")]
    MalformedCoverageRecord { path: String, line: u32 },
}

pub type Result<T> = std::result::Result<T, CovtermError>;
