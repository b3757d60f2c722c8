use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use log::debug;
use walkdir::WalkDir;

use super::ffmpeg::FfmpegSource;
use super::frame::Frame;
use crate::PlayerError;

/// Frame rate assumed for still-image sequences without timing information.
pub const DEFAULT_SEQUENCE_FPS: f64 = 12.0;

const STILL_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "bmp", "ico", "pnm", "pbm", "pgm", "ppm", "tif", "tiff", "webp"];

/// Properties a source reports once it is open.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
}

/// Decoded video the player pulls frames from.
pub trait VideoSource {
    fn info(&self) -> VideoInfo;

    /// Next frame, or `None` at end of stream.
    fn read_next(&mut self) -> Result<Option<Frame>, PlayerError>;

    /// Moves the read cursor so the next read returns frame `frame_index`.
    fn seek(&mut self, frame_index: u64) -> Result<(), PlayerError>;

    /// Index of the next frame to be read.
    fn position(&self) -> u64;

    /// Frees decoder resources. Reads after this fail.
    fn release(&mut self);
}

impl<V: VideoSource + ?Sized> VideoSource for Box<V> {
    fn info(&self) -> VideoInfo {
        (**self).info()
    }

    fn read_next(&mut self) -> Result<Option<Frame>, PlayerError> {
        (**self).read_next()
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), PlayerError> {
        (**self).seek(frame_index)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Opens `path` with the decoder that fits it.
///
/// Directories, GIFs and still images load into memory; everything else is
/// handed to ffmpeg.
pub fn open_source(path: &Path) -> Result<Box<dyn VideoSource>, PlayerError> {
    if !path.exists() {
        return Err(source_error(path, "no such file or directory"));
    }

    if path.is_dir() {
        return Ok(Box::new(FrameSequence::from_directory(path)?));
    }

    match lowercase_extension(path).as_deref() {
        Some("gif") => Ok(Box::new(FrameSequence::from_gif(path)?)),
        Some(ext) if STILL_EXTENSIONS.contains(&ext) => {
            Ok(Box::new(FrameSequence::from_image(path)?))
        },
        _ => Ok(Box::new(FfmpegSource::open(path)?)),
    }
}

pub(crate) fn source_error(path: &Path, reason: impl ToString) -> PlayerError {
    PlayerError::VideoSource { path: path.to_path_buf(), reason: reason.to_string() }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase())
}

/// Frames held in memory.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    fps: f64,
    cursor: usize,
    released: bool,
}

impl FrameSequence {
    /// All frames must share the first frame's dimensions.
    pub fn new(frames: Vec<Frame>, fps: f64) -> Result<Self, PlayerError> {
        let Some(first) = frames.first() else {
            return Err(PlayerError::InvalidConfiguration("frame sequence is empty".into()));
        };
        let dimensions = first.dimensions();
        if let Some(index) = frames.iter().position(|frame| frame.dimensions() != dimensions) {
            return Err(PlayerError::InvalidConfiguration(format!(
                "frame {index} is {:?}, expected {dimensions:?}",
                frames[index].dimensions()
            )));
        }
        Ok(Self { frames, fps, cursor: 0, released: false })
    }

    pub fn from_image(path: &Path) -> Result<Self, PlayerError> {
        let image = image::open(path).map_err(|err| source_error(path, err))?;
        Self::new(vec![Frame::from_image(&image)], DEFAULT_SEQUENCE_FPS)
            .map_err(|err| source_error(path, err))
    }

    pub fn from_gif(path: &Path) -> Result<Self, PlayerError> {
        let file = File::open(path).map_err(|err| source_error(path, err))?;
        let decoder = GifDecoder::new(BufReader::new(file)).map_err(|err| source_error(path, err))?;
        let frames = decoder.into_frames().collect_frames().map_err(|err| source_error(path, err))?;

        let total_delay: Duration = frames.iter().map(|frame| Duration::from(frame.delay())).sum();
        let fps = if total_delay.is_zero() {
            DEFAULT_SEQUENCE_FPS
        } else {
            frames.len() as f64 / total_delay.as_secs_f64()
        };

        let frames = frames
            .into_iter()
            .map(|frame| Frame::from_image(&image::DynamicImage::ImageRgba8(frame.into_buffer())))
            .collect();
        debug!("decoded {} at {fps:.2} fps", path.display());
        Self::new(frames, fps).map_err(|err| source_error(path, err))
    }

    /// Every image file below `path`, in path order.
    pub fn from_directory(path: &Path) -> Result<Self, PlayerError> {
        let mut entries: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.path().to_path_buf())
            .filter(|entry| {
                lowercase_extension(entry).is_some_and(|ext| STILL_EXTENSIONS.contains(&ext.as_str()))
            })
            .collect();
        entries.sort();
        if entries.is_empty() {
            return Err(source_error(path, "no image files found"));
        }

        let mut frames = Vec::with_capacity(entries.len());
        for entry in entries {
            let image = image::open(&entry).map_err(|err| source_error(&entry, err))?;
            frames.push(Frame::from_image(&image));
        }
        Self::new(frames, DEFAULT_SEQUENCE_FPS).map_err(|err| source_error(path, err))
    }
}

impl VideoSource for FrameSequence {
    fn info(&self) -> VideoInfo {
        let (width, height) = self.frames[0].dimensions();
        VideoInfo { fps: self.fps, frame_count: self.frames.len() as u64, width, height }
    }

    fn read_next(&mut self) -> Result<Option<Frame>, PlayerError> {
        if self.released {
            return Err(PlayerError::Playback("read from a released source".into()));
        }
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), PlayerError> {
        self.cursor = usize::try_from(frame_index).unwrap_or(usize::MAX).min(self.frames.len());
        Ok(())
    }

    fn position(&self) -> u64 {
        self.cursor as u64
    }

    fn release(&mut self) {
        self.released = true;
    }
}
