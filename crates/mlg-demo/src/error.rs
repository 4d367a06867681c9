//! Error type for the demo harness.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("engine error: {0}")]
    Engine(#[from] mlg_core::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
}

impl DemoError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
