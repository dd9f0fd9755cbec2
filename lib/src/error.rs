use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UmaVoiceError {
    #[error("Not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to open ciphered database: {0}")]
    CipherOpen(String),
    #[error("Failed to decode asset object graph: {0}")]
    AssetDecode(String),
    #[error("Failed to extract audio: {0}")]
    AudioExtract(String),
    #[error("Checksum mismatch for story {story_id}: expected {expected}, got {actual}")]
    Integrity {
        story_id: String,
        expected: i64,
        actual: i64,
    },
    #[error("Invalid config: {0}")]
    Config(String),
    #[error("{0}")]
    Custom(String),
    #[error("Additional context for error: {0}, {1}")]
    Context(String, #[source] Box<UmaVoiceError>),
    #[error("I/O error: {0}, {1}")]
    Io(String, #[source] std::io::Error),
    #[error("sqlite error: {0}, {1}")]
    Sql(String, #[source] rusqlite::Error),
    #[error("csv error: {0}, {1}")]
    Csv(String, #[source] csv::Error),
}

impl serde::de::Error for UmaVoiceError {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        UmaVoiceError::Custom(msg.to_string())
    }
}

impl UmaVoiceError {
    /// Wrap this error with additional context, mirroring how call sites chain
    /// `.map_err(|e| e.context(...))` at each layer boundary.
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::Context(message.into(), Box::new(self))
    }
}
