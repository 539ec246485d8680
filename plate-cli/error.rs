use std::path::PathBuf;

use plate_core::CoreError;
use plate_fast::FastError;
use plate_geometry::GeometryError;

/// Pipeline step an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Split,
    Extract,
    Filter,
    Estimate,
    Warp,
    Composite,
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Split => "split",
            Stage::Extract => "extract",
            Stage::Filter => "filter",
            Stage::Estimate => "estimate",
            Stage::Warp => "warp",
            Stage::Composite => "composite",
            Stage::Output => "output",
        };
        f.write_str(name)
    }
}

/// Channel registered against the green reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPair {
    BlueGreen,
    RedGreen,
}

impl ChannelPair {
    pub fn label(&self) -> &'static str {
        match self {
            ChannelPair::BlueGreen => "blue-green",
            ChannelPair::RedGreen => "red-green",
        }
    }
}

impl std::fmt::Display for ChannelPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub enum AlignError {
    ImageLoad { path: PathBuf, source: image::ImageError },
    DegenerateInput { band: &'static str, width: usize, height: usize },
    InsufficientCorrespondences { pair: ChannelPair, found: usize, needed: usize },
    Geometry { pair: ChannelPair, stage: Stage, source: GeometryError },
    Image { stage: Stage, source: CoreError },
    Detector(FastError),
    InvalidConfig(String),
    Config { path: PathBuf, message: String },
    Sink { label: String, message: String },
}

impl std::fmt::Display for AlignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignError::ImageLoad { path, source } => {
                write!(f, "Failed to load image {}: {}", path.display(), source)
            }
            AlignError::DegenerateInput { band, width, height } => {
                write!(f, "The {} band is empty ({}x{})", band, width, height)
            }
            AlignError::InsufficientCorrespondences { pair, found, needed } => {
                write!(f, "[{}] only {} matches survived filtering, need {}", pair, found, needed)
            }
            AlignError::Geometry { pair, stage, source } => write!(f, "[{}] {} failed: {}", pair, stage, source),
            AlignError::Image { stage, source } => write!(f, "{} failed: {}", stage, source),
            AlignError::Detector(e) => write!(f, "Detector error: {}", e),
            AlignError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            AlignError::Config { path, message } => {
                write!(f, "Configuration file {}: {}", path.display(), message)
            }
            AlignError::Sink { label, message } => write!(f, "Could not output '{}': {}", label, message),
        }
    }
}

impl std::error::Error for AlignError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AlignError::ImageLoad { source, .. } => Some(source),
            AlignError::Geometry { source, .. } => Some(source),
            AlignError::Image { source, .. } => Some(source),
            AlignError::Detector(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FastError> for AlignError {
    fn from(err: FastError) -> Self {
        AlignError::Detector(err)
    }
}

impl AlignError {
    /// Stage the failure belongs to
    pub fn stage(&self) -> Stage {
        match self {
            AlignError::ImageLoad { .. } | AlignError::Config { .. } | AlignError::InvalidConfig(_) => Stage::Load,
            AlignError::DegenerateInput { .. } => Stage::Split,
            AlignError::Detector(_) => Stage::Extract,
            AlignError::InsufficientCorrespondences { .. } => Stage::Filter,
            AlignError::Geometry { stage, .. } | AlignError::Image { stage, .. } => *stage,
            AlignError::Sink { .. } => Stage::Output,
        }
    }

    /// Channel pair the failure belongs to, if any
    pub fn pair(&self) -> Option<ChannelPair> {
        match self {
            AlignError::InsufficientCorrespondences { pair, .. } | AlignError::Geometry { pair, .. } => Some(*pair),
            _ => None,
        }
    }
}

pub type AlignResult<T> = Result<T, AlignError>;
