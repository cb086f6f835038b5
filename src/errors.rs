use thiserror::Error;

#[derive(Error, Debug)]
pub enum VedaRagError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Profile not found: user {0}")]
    ProfileNotFound(String),

    #[error("Contact not found: user {0}, name {1}")]
    ContactNotFound(String, String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Chart computation error: {0}")]
    ChartComputation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VedaRagError>;
