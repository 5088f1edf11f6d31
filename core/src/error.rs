use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: f64, available: f64 },

    #[error("Unknown {kind} '{id}'")]
    UnknownEntity { kind: &'static str, id: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn unknown_unit(id: &str) -> Self {
        Self::UnknownEntity { kind: "unit", id: id.to_string() }
    }

    pub fn unknown_upgrade(id: &str) -> Self {
        Self::UnknownEntity { kind: "upgrade", id: id.to_string() }
    }
}

pub type SimResult<T> = Result<T, SimError>;
