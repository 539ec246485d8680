#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    InvalidImageData { expected_len: usize, actual_len: usize },
    DimensionMismatch { expected: (usize, usize), actual: (usize, usize), index: usize },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidImageData { expected_len, actual_len } => {
                write!(f, "Image data length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            CoreError::DimensionMismatch { expected, actual, index } => {
                write!(
                    f,
                    "Dimension mismatch for channel {}: expected {}x{}, got {}x{}",
                    index, expected.0, expected.1, actual.0, actual.1
                )
            }
        }
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;
