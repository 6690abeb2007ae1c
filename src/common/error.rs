use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Email delivery failed: {message}")]
    Email { message: String },

    #[error("Object storage error: {message}")]
    Storage { message: String },
}

impl From<libsql::Error> for BackendError {
    fn from(e: libsql::Error) -> Self {
        BackendError::Database {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
