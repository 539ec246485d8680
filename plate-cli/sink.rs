use std::path::{Path, PathBuf};

use plate_core::{ColorImage, Image};

use crate::image_io::{to_gray_image, to_rgb_image};

/// Something the pipeline wants shown
#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    Gray(&'a Image),
    /// Channels stored blue, green, red
    Bgr(&'a ColorImage),
    Rgb(&'a ColorImage),
}

impl Artifact<'_> {
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Artifact::Gray(img) => img.dimensions(),
            Artifact::Bgr(img) | Artifact::Rgb(img) => img.dimensions(),
        }
    }

    pub fn into_owned(self) -> OwnedArtifact {
        match self {
            Artifact::Gray(img) => OwnedArtifact::Gray(img.clone()),
            Artifact::Bgr(img) => OwnedArtifact::Bgr(img.clone()),
            Artifact::Rgb(img) => OwnedArtifact::Rgb(img.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedArtifact {
    Gray(Image),
    Bgr(ColorImage),
    Rgb(ColorImage),
}

pub type SinkResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Receives labelled pipeline outputs (band previews, match plots, the composite)
pub trait DisplaySink {
    fn show(&mut self, label: &str, artifact: Artifact<'_>) -> SinkResult;
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show(&mut self, _label: &str, _artifact: Artifact<'_>) -> SinkResult {
        Ok(())
    }
}

/// Keeps a copy of everything shown, in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub shown: Vec<(String, OwnedArtifact)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.shown.iter().map(|(label, _)| label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&OwnedArtifact> {
        self.shown.iter().find(|(l, _)| l == label).map(|(_, a)| a)
    }
}

impl DisplaySink for RecordingSink {
    fn show(&mut self, label: &str, artifact: Artifact<'_>) -> SinkResult {
        self.shown.push((label.to_string(), artifact.into_owned()));
        Ok(())
    }
}

/// Writes every artifact as `<dir>/<label>.png`
#[derive(Debug)]
pub struct PngSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(Self { dir: dir.as_ref().to_path_buf(), written: Vec::new() })
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        let stem: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.png", stem))
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DisplaySink for PngSink {
    fn show(&mut self, label: &str, artifact: Artifact<'_>) -> SinkResult {
        let path = self.path_for(label);
        match artifact {
            Artifact::Gray(img) => to_gray_image(img).save(&path)?,
            Artifact::Bgr(img) => to_rgb_image(&img.swap_outer_channels()).save(&path)?,
            Artifact::Rgb(img) => to_rgb_image(img).save(&path)?,
        }
        log::info!("Wrote {} to {}", label, path.display());
        self.written.push(path);
        Ok(())
    }
}
