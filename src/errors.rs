use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV processing
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid input record during ingestion
    #[error("Invalid record in {file} at line {line}: {reason}")]
    InvalidRecord {
        file: String,
        line: usize,
        reason: String,
    },

    /// Report computation failed as a whole
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A blocking worker task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Task(String),
}

impl AppError {
    /// Short kind label, used when recording a failed report job
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DatabaseError",
            AppError::Io(_) => "IoError",
            AppError::Csv(_) => "CsvError",
            AppError::Config(_) => "ConfigError",
            AppError::InvalidData(_) => "InvalidData",
            AppError::InvalidRecord { .. } => "InvalidRecord",
            AppError::Engine(e) => e.kind(),
            AppError::NotFound(_) => "NotFound",
            AppError::Task(_) => "TaskError",
        }
    }
}

/// Errors that fail one store's computation only
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Business-hour row with an unparseable local time or out-of-range weekday
    #[error("Malformed schedule rule (day_of_week={day_of_week}, value={value:?}): {reason}")]
    MalformedScheduleRule {
        day_of_week: i64,
        value: String,
        reason: String,
    },

    /// Timezone assignment present but not a recognised IANA name
    #[error("Unknown timezone {timezone:?}")]
    UnknownTimezone { timezone: String },
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::MalformedScheduleRule { .. } => "MalformedScheduleRule",
            StoreError::UnknownTimezone { .. } => "UnknownTimezone",
        }
    }
}

/// Errors that fail a whole report run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No store identifier resolvable anywhere in the snapshot
    #[error("No store identifiers found in dataset")]
    NoStores,

    /// First per-store failure, surfaced under the abort-run policy
    #[error("Store {store_id} failed: {source}")]
    StoreFailed {
        store_id: String,
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NoStores => "NoStores",
            EngineError::StoreFailed { source, .. } => source.kind(),
        }
    }
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Task(err.to_string())
    }
}
