use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlendError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid weights: {0}")]
    InvalidWeight(String),
    #[error("Dataset {dataset} is empty but has weight {weight}")]
    EmptySource { dataset: usize, weight: f64 },
    #[error("Index {index} out of range for blend of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BlendError>;

#[cfg(feature = "python")]
impl From<BlendError> for pyo3::PyErr {
    fn from(err: BlendError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIndexError, PyValueError};
        match err {
            BlendError::IndexOutOfRange { .. } => PyIndexError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
