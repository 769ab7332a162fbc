use thiserror::Error;

/// Per-pixel failure of the retrieval.
///
/// Both kinds are recoverable: the pixel is flagged and filled with the
/// no-data value, the rest of the scene keeps going.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum QaaError {
    /// A square root or logarithm argument would leave the real numbers.
    #[error("Will produce an imaginary number: {value}")]
    ImaginaryNumber { value: f64 },

    /// The euphotic-depth solver produced a root that is not a valid depth.
    #[error("Will produce a negative number: {value}")]
    NegativeNumber { value: f64 },
}

impl QaaError {
    pub fn value(&self) -> f64 {
        match self {
            QaaError::ImaginaryNumber { value } | QaaError::NegativeNumber { value } => *value,
        }
    }
}
