//! Stand-ins for the video, font, display and clock collaborators.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::image_pipeline::frame::Frame;
use crate::image_pipeline::loader::{FrameSequence, VideoInfo, VideoSource};
use crate::playback::input::InputEvent;
use crate::playback::pacing::Clock;
use crate::playback::Display;
use crate::render::{GlyphBitmap, GlyphSource};
use crate::PlayerError;

/// Every glyph but space is a solid cell-sized block.
#[derive(Clone, Copy, Debug)]
pub struct BlockGlyphs {
    width: u32,
    height: u32,
}

impl BlockGlyphs {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl GlyphSource for BlockGlyphs {
    fn advance(&self, _ch: char, _size: f32) -> u32 {
        self.width
    }

    fn line_height(&self, _size: f32) -> u32 {
        self.height
    }

    fn rasterize(&self, ch: char, _size: f32) -> GlyphBitmap {
        if ch == ' ' {
            return GlyphBitmap::default();
        }
        let (width, height) = (self.width as usize, self.height as usize);
        GlyphBitmap { width, height, left: 0, top: 0, coverage: vec![255; width * height] }
    }
}

#[derive(Debug)]
pub struct ManualClock {
    now: Instant,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Instant::now(), sleeps: Vec::new() }
    }

    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }

    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.now += duration;
    }
}

/// Hands out one scripted batch of events per poll, then nothing.
#[derive(Debug, Default)]
pub struct ScriptedDisplay {
    script: VecDeque<Vec<InputEvent>>,
    presented: usize,
    closes: usize,
}

impl ScriptedDisplay {
    pub fn new(script: Vec<Vec<InputEvent>>) -> Self {
        Self { script: script.into(), ..Self::default() }
    }

    pub fn presented(&self) -> usize {
        self.presented
    }

    pub fn closes(&self) -> usize {
        self.closes
    }
}

impl Display for ScriptedDisplay {
    fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<(), PlayerError> {
        assert_eq!(pixels.len(), width as usize * height as usize);
        self.presented += 1;
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.script.pop_front().unwrap_or_default()
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}

/// In-memory source that records which frames were read and how often it
/// was released.
pub struct CountingSource {
    inner: FrameSequence,
    reads: Vec<u64>,
    releases: Rc<Cell<usize>>,
    fail_after: Option<usize>,
}

impl CountingSource {
    /// Horizontal gradients at 25 fps, each frame a little brighter.
    pub fn gradient(count: u8, width: u32, height: u32) -> Self {
        let frames = (0..count)
            .map(|i| {
                let mut data = Vec::with_capacity((width * height * 3) as usize);
                for _ in 0..height {
                    for x in 0..width {
                        let level = (x * 200 / width.max(1)) as u8 + i;
                        data.extend_from_slice(&[level, level / 2, 255 - level]);
                    }
                }
                Frame::from_bgr(width, height, data).unwrap()
            })
            .collect();
        Self {
            inner: FrameSequence::new(frames, 25.0).unwrap(),
            reads: Vec::new(),
            releases: Rc::new(Cell::new(0)),
            fail_after: None,
        }
    }

    /// Reads fail once `reads` frames have been delivered.
    pub fn fail_after(&mut self, reads: usize) {
        self.fail_after = Some(reads);
    }

    pub fn reads(&self) -> &[u64] {
        &self.reads
    }

    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    pub fn release_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.releases)
    }
}

impl VideoSource for CountingSource {
    fn info(&self) -> VideoInfo {
        self.inner.info()
    }

    fn read_next(&mut self) -> Result<Option<Frame>, PlayerError> {
        if self.fail_after.is_some_and(|limit| self.reads.len() >= limit) {
            return Err(PlayerError::Playback("decoder went away".into()));
        }
        let position = self.inner.position();
        let frame = self.inner.read_next()?;
        if frame.is_some() {
            self.reads.push(position);
        }
        Ok(frame)
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), PlayerError> {
        self.inner.seek(frame_index)
    }

    fn position(&self) -> u64 {
        self.inner.position()
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
        self.inner.release();
    }
}
