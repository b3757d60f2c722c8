//! Plays decoded video as a grid of colored monospace glyphs.
//!
//! Each cycle pulls a [`Frame`] from a [`VideoSource`], converts it to a
//! [`GlyphGrid`] with the [`GlyphMapper`], has the [`Compositor`] draw the
//! grid, preview overlay and status onto a [`Surface`], and hands the pixels
//! to a [`Display`]. The [`PlaybackController`] runs that loop.

mod ascii;
mod config;
mod image_pipeline;
mod playback;
mod render;
#[cfg(test)]
mod testing;

use std::path::PathBuf;

pub use ascii::{
    charset::{CharacterSet, CharsetVariant, EXTENDED_CHARS, STANDARD_CHARS},
    grid::{Cell, GlyphGrid},
    mapping::GlyphMapper,
};
pub use config::{PlayerConfig, FALLBACK_FRAME_INTERVAL_MS, PAUSED_POLL_INTERVAL_MS};
pub use image_pipeline::{
    adjust::{equalize_histogram, extract_luma},
    ffmpeg::FfmpegSource,
    frame::Frame,
    layout::{CellMetrics, Geometry, LayoutCalculator, Rect, MAX_SURFACE_PIXELS},
    loader::{open_source, FrameSequence, VideoInfo, VideoSource},
};
pub use playback::{
    input::{Command, InputEvent, Key, CONTROLS_HELP},
    pacing::{frame_interval, Clock, FramePacer, SystemClock},
    prepare_session,
    state::{PlaybackState, PlayerSession},
    Display, PlaybackController, PreparedSession,
};
pub use render::{
    canvas::Canvas,
    compositor::{status_text, Compositor},
    font::{default_candidates, FontCandidate, FontChoice, FontFace},
    GlyphBitmap, GlyphSource, Surface, TextSize, REFERENCE_GLYPH,
};

/// Fixed window title.
pub const WINDOW_TITLE: &str = "ASCII Video Player";

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("failed to open video {}: {reason}", path.display())]
    VideoSource { path: PathBuf, reason: String },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("playback failed: {0}")]
    Playback(String),
    #[error("font unavailable: {0}")]
    Font(String),
    #[error("display failed: {0}")]
    Display(String),
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = PlayerError> = std::result::Result<T, E>;
