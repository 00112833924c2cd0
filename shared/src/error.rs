use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, LocateError>;
