use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty name, unknown input format, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Input format could not be determined from the file name.
    #[error("input '{input}': cannot infer format from '{file}' (expected .csv or .json)")]
    UnknownFormat { input: String, file: String },
    /// Missing required column in CSV input.
    #[error("input '{input}': missing column '{column}'")]
    MissingColumn { input: String, column: String },
    /// Score cell is not a non-negative integer.
    #[error("match '{record_id}': cannot parse score '{value}'")]
    ScoreParse { record_id: String, value: String },
    /// Malformed CSV.
    #[error("input '{input}': {message}")]
    Csv { input: String, message: String },
    /// Malformed JSON.
    #[error("input '{input}': invalid JSON: {message}")]
    Json { input: String, message: String },
    /// IO error (file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
}
