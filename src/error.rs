use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WgError {
    #[error("failed to open control interface: {0}")]
    Open(#[source] ControlError),

    #[error("failed to get device {name:?}: {source}")]
    Device {
        name: String,
        #[source]
        source: ControlError,
    },

    #[error("failed to get devices: {0}")]
    Devices(#[source] ControlError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("{0}")]
    Open(String),

    #[error("no such device: {0}")]
    DeviceNotFound(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ControlError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ControlError::DeviceNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, WgError>;

pub type ControlResult<T> = std::result::Result<T, ControlError>;
