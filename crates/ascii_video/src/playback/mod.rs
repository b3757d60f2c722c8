//! Playback state machine.
//!
//! One [`PlaybackController`] owns the session and every collaborator and
//! drives them from a single loop: poll input, apply transitions, then either
//! convert and draw the next frame or idle while paused.

pub mod input;
pub mod pacing;
pub mod state;

use std::path::Path;
use std::time::Duration;

use log::{debug, info};

use crate::ascii::charset::CharacterSet;
use crate::ascii::mapping::GlyphMapper;
use crate::config::{PlayerConfig, PAUSED_POLL_INTERVAL_MS};
use crate::image_pipeline::layout::LayoutCalculator;
use crate::image_pipeline::loader::{open_source, VideoSource};
use crate::render::canvas::Canvas;
use crate::render::compositor::{status_text, Compositor};
use crate::render::font::FontFace;
use crate::render::{Surface, REFERENCE_GLYPH};
use crate::PlayerError;

use input::{Command, InputEvent, CONTROLS_HELP};
use pacing::{frame_interval, Clock, FramePacer, SystemClock};
use state::{PlaybackState, PlayerSession};

/// Presentation half of the rendering provider: shows finished surfaces and
/// reports input.
pub trait Display {
    /// Shows `pixels` (`0RGB`, row-major).
    fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<(), PlayerError>;

    /// Input received since the last poll. Never blocks.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Tears down the window. Called once, when playback ends.
    fn close(&mut self);
}

/// Source, session and surface ready for a display to be attached.
pub struct PreparedSession {
    pub source: Box<dyn VideoSource>,
    pub session: PlayerSession,
    pub canvas: Canvas<FontFace>,
}

/// Opens the video, picks a font and fixes the layout.
///
/// The source is opened first so an unreadable video is reported before
/// anything else is set up.
pub fn prepare_session(path: &Path, config: PlayerConfig) -> Result<PreparedSession, PlayerError> {
    let mut source = open_source(path)?;
    let info = source.info();

    let setup = (|| {
        let face = FontFace::first_available(&config.fonts)?;
        let mut canvas = Canvas::new(0, 0, face, config.font_size);
        let cell = canvas.measure_glyph(REFERENCE_GLYPH);
        let geometry =
            LayoutCalculator::new(config.width, config.height).derive(info.width, info.height, cell)?;
        canvas.resize(geometry.surface_width, geometry.surface_height);
        Ok::<_, PlayerError>((canvas, geometry))
    })();
    let (canvas, geometry) = match setup {
        Ok(setup) => setup,
        Err(err) => {
            source.release();
            return Err(err);
        },
    };

    info!("Video: {}", path.display());
    info!("Resolution: {}x{}", info.width, info.height);
    info!("FPS: {:.2}", info.fps);
    info!("Frames: {}", info.frame_count);
    info!("ASCII size: {}x{}", geometry.columns, geometry.rows);
    info!("Font: {}", canvas.glyphs().choice());

    let mut session = PlayerSession::new(config, geometry);
    session.font = Some(canvas.glyphs().choice().clone());

    Ok(PreparedSession { source, session, canvas })
}

pub struct PlaybackController<V: VideoSource, S: Surface, D: Display, C: Clock = SystemClock> {
    session: PlayerSession,
    source: V,
    surface: S,
    display: D,
    clock: C,
    mapper: GlyphMapper,
    compositor: Compositor,
    pacer: FramePacer,
    released: bool,
}

impl<V: VideoSource, S: Surface, D: Display, C: Clock> PlaybackController<V, S, D, C> {
    pub fn new(session: PlayerSession, source: V, surface: S, display: D, clock: C) -> Self {
        let charset = CharacterSet::for_variant(session.config.charset);
        let mapper = GlyphMapper::new(charset.clone(), session.config.color);
        let pacer = FramePacer::new(frame_interval(source.info().fps));

        Self {
            session,
            source,
            surface,
            display,
            clock,
            mapper,
            compositor: Compositor::new(charset),
            pacer,
            released: false,
        }
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state
    }

    pub fn source(&self) -> &V {
        &self.source
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Plays until the user quits or an error occurs. Resources are released
    /// on every exit path.
    pub fn run(&mut self) -> Result<(), PlayerError> {
        info!("Starting playback...");
        info!("Controls:");
        for (key, action) in CONTROLS_HELP {
            info!("  {key} - {action}");
        }

        while self.step()? != PlaybackState::Stopped {}
        Ok(())
    }

    /// Runs a single loop cycle and returns the resulting state.
    pub fn step(&mut self) -> Result<PlaybackState, PlayerError> {
        if self.session.is_stopped() {
            return Ok(PlaybackState::Stopped);
        }

        let result = self.cycle();
        if result.is_err() || self.session.is_stopped() {
            self.session.stop();
            self.shutdown();
        }
        result.map(|()| self.session.state)
    }

    fn cycle(&mut self) -> Result<(), PlayerError> {
        for event in self.display.poll_events() {
            if let Some(command) = Command::from_event(event) {
                self.apply(command)?;
            }
            if self.session.is_stopped() {
                return Ok(());
            }
        }

        match self.session.state {
            PlaybackState::Playing => self.play_frame(),
            PlaybackState::Paused => self.idle(),
            PlaybackState::Stopped => Ok(()),
        }
    }

    /// Applies one transport command.
    pub fn apply(&mut self, command: Command) -> Result<(), PlayerError> {
        if self.session.is_stopped() {
            return Ok(());
        }

        match command {
            Command::Quit => self.session.stop(),
            Command::TogglePause => {
                self.session.toggle_pause();
                self.pacer.reset();
            },
            Command::Restart => {
                debug!("restarting from the first frame");
                self.source.seek(0)?;
                self.session.state = PlaybackState::Playing;
                self.pacer.reset();
            },
            Command::TogglePreview => {
                let on = self.session.toggle_preview();
                info!("Preview: {}", if on { "ON" } else { "OFF" });
            },
        }
        Ok(())
    }

    fn play_frame(&mut self) -> Result<(), PlayerError> {
        let frame = match self.source.read_next()? {
            Some(frame) => frame,
            None => {
                debug!("end of stream, looping");
                self.source.seek(0)?;
                self.source.read_next()?.ok_or_else(|| {
                    PlayerError::Playback("source has no frames after rewinding".into())
                })?
            },
        };

        let grid = self.mapper.map_frame(&frame, &self.session.geometry);
        let preview = self.session.show_preview.then_some(&frame);
        let status = status_text(self.source.position(), self.source.info().frame_count);
        self.compositor.compose(&mut self.surface, &self.session.geometry, &grid, preview, &status);
        self.present()?;

        self.pacer.tick(&mut self.clock);
        Ok(())
    }

    fn idle(&mut self) -> Result<(), PlayerError> {
        self.clock.sleep(Duration::from_millis(PAUSED_POLL_INTERVAL_MS));
        self.compositor.draw_paused(&mut self.surface);
        self.present()
    }

    fn present(&mut self) -> Result<(), PlayerError> {
        let (width, height) = self.surface.size();
        self.display.present(self.surface.pixels(), width, height)
    }

    /// Releases the source and the display. Only the first call has any
    /// effect.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.session.stop();
        self.source.release();
        self.display.close();
        info!("Playback finished.");
    }
}

impl<V: VideoSource, S: Surface, D: Display, C: Clock> Drop for PlaybackController<V, S, D, C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
