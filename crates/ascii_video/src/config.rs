use crate::ascii::charset::CharsetVariant;
use crate::render::font::{default_candidates, FontCandidate};

/// Frame interval used when a source reports no usable frame rate.
pub const FALLBACK_FRAME_INTERVAL_MS: u64 = 30;
/// Polling interval while paused.
pub const PAUSED_POLL_INTERVAL_MS: u64 = 100;

/// Settings fixed for the lifetime of a playback session.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    /// Glyph columns.
    pub width: i64,
    /// Glyph rows. Derived from the source aspect ratio when `None`.
    pub height: Option<i64>,
    pub color: bool,
    pub charset: CharsetVariant,
    /// Initial preview state; can be toggled during playback.
    pub preview: bool,
    /// Body text size in pixels.
    pub font_size: f32,
    /// Fonts tried in order until one loads.
    pub fonts: Vec<FontCandidate>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 120,
            height: None,
            color: true,
            charset: CharsetVariant::Standard,
            preview: true,
            font_size: 10.0,
            fonts: default_candidates(),
        }
    }
}
