/// Scale information for pyramid levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLevel {
    pub level: usize,
    /// Base-image pixels per level pixel
    pub scale: f32,
    pub width: usize,
    pub height: usize,
}

/// Which side of the center a FAST arc lies on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CornerType {
    Bright,
    Dark,
}
