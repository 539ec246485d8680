#[derive(Debug, Clone, PartialEq)]
pub enum FastError {
    InvalidThreshold(u8),
    InvalidPatchSize { patch_size: usize },
    InvalidScaleFactor(f32),
    InvalidLevelCount(usize),
    InvalidNmsDistance(f32),
}

impl std::fmt::Display for FastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FastError::InvalidThreshold(t) => {
                write!(f, "Invalid threshold: {} (must be 1-127)", t)
            }
            FastError::InvalidPatchSize { patch_size } => {
                write!(f, "Invalid patch size {} (must be odd and at least 7)", patch_size)
            }
            FastError::InvalidScaleFactor(s) => {
                write!(f, "Invalid pyramid scale factor {} (must be > 1)", s)
            }
            FastError::InvalidLevelCount(n) => {
                write!(f, "Invalid pyramid level count {} (must be 1-16)", n)
            }
            FastError::InvalidNmsDistance(d) => {
                write!(f, "Invalid NMS distance {} (must be finite and >= 0)", d)
            }
        }
    }
}

impl std::error::Error for FastError {}

pub type FastResult<T> = Result<T, FastError>;
