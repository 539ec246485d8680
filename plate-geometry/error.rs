#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    InsufficientCorrespondences { needed: usize, src_len: usize, dst_len: usize },
    DegenerateConfiguration,
    InsufficientInliers { found: usize, needed: usize, total: usize },
    SingularTransform,
    InvalidParameter { name: &'static str, value: f64 },
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::InsufficientCorrespondences { needed, src_len, dst_len } => {
                write!(f, "Need at least {} matching point pairs, got {} source and {} destination points", needed, src_len, dst_len)
            }
            GeometryError::DegenerateConfiguration => {
                write!(f, "Every sampled point subset was collinear or degenerate")
            }
            GeometryError::InsufficientInliers { found, needed, total } => {
                write!(f, "Only {} of {} correspondences are inliers (need {})", found, total, needed)
            }
            GeometryError::SingularTransform => write!(f, "Transform is singular and cannot be inverted"),
            GeometryError::InvalidParameter { name, value } => {
                write!(f, "Invalid value for {}: {}", name, value)
            }
        }
    }
}

impl std::error::Error for GeometryError {}

pub type GeometryResult<T> = Result<T, GeometryError>;
