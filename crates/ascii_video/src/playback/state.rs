use crate::config::PlayerConfig;
use crate::image_pipeline::layout::Geometry;
use crate::render::font::FontChoice;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Playing,
    Paused,
    /// Terminal; resources have been or are being released.
    Stopped,
}

/// Everything a playback session owns besides its collaborators.
#[derive(Clone, Debug)]
pub struct PlayerSession {
    pub config: PlayerConfig,
    pub geometry: Geometry,
    pub state: PlaybackState,
    pub show_preview: bool,
    /// Font the session settled on.
    pub font: Option<FontChoice>,
}

impl PlayerSession {
    pub fn new(config: PlayerConfig, geometry: Geometry) -> Self {
        let show_preview = config.preview;
        Self { config, geometry, state: PlaybackState::Playing, show_preview, font: None }
    }

    pub fn is_stopped(&self) -> bool {
        self.state == PlaybackState::Stopped
    }

    /// Flips between playing and paused. No effect once stopped.
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Stopped => PlaybackState::Stopped,
        };
    }

    pub fn toggle_preview(&mut self) -> bool {
        self.show_preview = !self.show_preview;
        self.show_preview
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
    }
}
