use std::fmt;
use std::path::PathBuf;

use fontdue::{Font, FontSettings};
use log::debug;

use super::{GlyphBitmap, GlyphSource};
use crate::PlayerError;

/// Named font file to try when setting up a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontCandidate {
    pub name: String,
    pub path: PathBuf,
}

impl FontCandidate {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: path.into() }
    }

    /// Candidate named after the file stem of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

impl fmt::Display for FontCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Monospace fonts in preference order, Courier New first.
pub fn default_candidates() -> Vec<FontCandidate> {
    let candidates: &[(&str, &str)] = &[
        ("Courier New", "/usr/share/fonts/truetype/msttcorefonts/Courier_New.ttf"),
        ("Courier New", "/usr/share/fonts/TTF/cour.ttf"),
        ("Courier New", "/Library/Fonts/Courier New.ttf"),
        ("Courier New", "/System/Library/Fonts/Supplemental/Courier New.ttf"),
        ("Courier New", "C:\\Windows\\Fonts\\cour.ttf"),
        ("DejaVu Sans Mono", "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"),
        ("DejaVu Sans Mono", "/usr/share/fonts/TTF/DejaVuSansMono.ttf"),
        ("DejaVu Sans Mono", "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf"),
        ("Liberation Mono", "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf"),
        ("Liberation Mono", "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf"),
        ("Menlo", "/System/Library/Fonts/Menlo.ttc"),
        ("Consolas", "C:\\Windows\\Fonts\\consola.ttf"),
    ];
    candidates.iter().map(|(name, path)| FontCandidate::new(*name, *path)).collect()
}

/// The candidate a session ended up using.
pub type FontChoice = FontCandidate;

/// `fontdue` backed glyph source.
pub struct FontFace {
    font: Font,
    choice: FontChoice,
}

impl FontFace {
    pub fn load(candidate: &FontCandidate) -> Result<Self, PlayerError> {
        let bytes = std::fs::read(&candidate.path)
            .map_err(|err| PlayerError::Font(format!("{candidate}: {err}")))?;
        Self::from_bytes(bytes, candidate.clone())
    }

    pub fn from_bytes(bytes: Vec<u8>, choice: FontChoice) -> Result<Self, PlayerError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|err| PlayerError::Font(format!("{choice}: {err}")))?;
        Ok(Self { font, choice })
    }

    /// Loads the first usable candidate, in order.
    pub fn first_available(candidates: &[FontCandidate]) -> Result<Self, PlayerError> {
        let mut failures = Vec::new();
        for candidate in candidates {
            match Self::load(candidate) {
                Ok(face) => return Ok(face),
                Err(err) => {
                    debug!("skipping font {err}");
                    failures.push(err.to_string());
                },
            }
        }

        if failures.is_empty() {
            return Err(PlayerError::Font("no font candidates configured".into()));
        }
        Err(PlayerError::Font(format!("no usable font: {}", failures.join("; "))))
    }

    pub fn choice(&self) -> &FontChoice {
        &self.choice
    }
}

impl GlyphSource for FontFace {
    fn advance(&self, ch: char, size: f32) -> u32 {
        self.font.metrics(ch, size).advance_width.ceil().max(0.0) as u32
    }

    fn line_height(&self, size: f32) -> u32 {
        self.font
            .horizontal_line_metrics(size)
            .map(|metrics| metrics.new_line_size)
            .unwrap_or(size * 1.2)
            .ceil() as u32
    }

    fn rasterize(&self, ch: char, size: f32) -> GlyphBitmap {
        let ascent =
            self.font.horizontal_line_metrics(size).map(|metrics| metrics.ascent).unwrap_or(size);
        let (metrics, coverage) = self.font.rasterize(ch, size);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            left: metrics.xmin,
            top: (ascent - (metrics.height as f32 + metrics.ymin as f32)).round() as i32,
            coverage,
        }
    }
}
