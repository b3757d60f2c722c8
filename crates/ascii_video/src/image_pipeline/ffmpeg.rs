use std::ffi::OsString;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

use log::{debug, warn};
use serde::Deserialize;

use super::frame::Frame;
use super::loader::{source_error, VideoInfo, VideoSource};
use crate::PlayerError;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// Reads a video through an `ffmpeg` child process emitting raw BGR frames.
///
/// Frames are read on the caller's thread; a read blocks until ffmpeg has
/// produced the whole frame.
pub struct FfmpegSource {
    path: PathBuf,
    info: VideoInfo,
    decoder: Option<Decoder>,
    position: u64,
    released: bool,
}

struct Decoder {
    child: Child,
    stdout: ChildStdout,
}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self, PlayerError> {
        let info = probe(path)?;
        let decoder = Decoder::spawn(path, &info, 0)?;
        Ok(Self::with_decoder(path, info, decoder))
    }

    fn with_decoder(path: &Path, info: VideoInfo, decoder: Decoder) -> Self {
        Self { path: path.to_path_buf(), info, decoder: Some(decoder), position: 0, released: false }
    }

    fn frame_len(&self) -> usize {
        self.info.width as usize * self.info.height as usize * 3
    }
}

impl VideoSource for FfmpegSource {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_next(&mut self) -> Result<Option<Frame>, PlayerError> {
        if self.released {
            return Err(PlayerError::Playback("read from a released source".into()));
        }
        let frame_len = self.frame_len();
        let Some(decoder) = self.decoder.as_mut() else {
            return Ok(None);
        };

        let mut buffer = vec![0u8; frame_len];
        match decoder.stdout.read_exact(&mut buffer) {
            Ok(()) => {},
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                let Some(decoder) = self.decoder.take() else {
                    return Ok(None);
                };
                let outcome = decoder.wait().map_err(|err| err.to_string()).and_then(check_exit);
                if let Err(reason) = outcome {
                    return Err(PlayerError::Playback(format!(
                        "ffmpeg stopped at frame {} of {}: {reason}",
                        self.position,
                        self.path.display()
                    )));
                }
                debug!("ffmpeg reached end of {}", self.path.display());
                return Ok(None);
            },
            Err(err) => {
                return Err(PlayerError::Playback(format!(
                    "failed to read frame {} of {}: {err}",
                    self.position,
                    self.path.display()
                )))
            },
        }

        self.position += 1;
        let frame = Frame::from_bgr(self.info.width, self.info.height, buffer)
            .ok_or_else(|| PlayerError::Playback("decoded frame has the wrong size".into()))?;
        Ok(Some(frame))
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), PlayerError> {
        if self.released {
            return Err(PlayerError::Playback("seek on a released source".into()));
        }
        if let Some(decoder) = self.decoder.take() {
            decoder.finish();
        }
        self.decoder = Some(Decoder::spawn(&self.path, &self.info, frame_index)?);
        self.position = frame_index;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn release(&mut self) {
        if let Some(decoder) = self.decoder.take() {
            decoder.finish();
        }
        self.released = true;
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        if let Some(decoder) = self.decoder.take() {
            decoder.finish();
        }
    }
}

impl Decoder {
    fn spawn(path: &Path, info: &VideoInfo, start_frame: u64) -> Result<Self, PlayerError> {
        let mut command = Command::new("ffmpeg");
        command.args(decode_args(path, info, start_frame));
        Self::launch(command, path)
    }

    fn launch(mut command: Command, path: &Path) -> Result<Self, PlayerError> {
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::inherit());

        let mut child = command
            .spawn()
            .map_err(|err| source_error(path, format!("failed to spawn ffmpeg: {err}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| source_error(path, "failed to capture ffmpeg stdout"))?;
        Ok(Self { child, stdout })
    }

    /// Waits for a decoder whose output is exhausted.
    fn wait(self) -> io::Result<ExitStatus> {
        let Self { mut child, stdout } = self;
        drop(stdout);
        child.wait()
    }

    /// Stops the decoder early.
    fn finish(mut self) {
        if let Err(err) = self.child.kill() {
            if err.kind() != ErrorKind::InvalidInput {
                warn!("failed to stop ffmpeg: {err}");
            }
        }
        let _ = self.child.wait();
    }
}

/// Arguments for decoding `path` to raw BGR frames of exactly the probed size.
///
/// Auto-rotation is disabled so rotated footage keeps its probed width and
/// height, and the output size is pinned to the same dimensions.
fn decode_args(path: &Path, info: &VideoInfo, start_frame: u64) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];
    if start_frame > 0 && info.fps > 0.0 {
        args.push("-ss".into());
        args.push(format!("{:.6}", start_frame as f64 / info.fps).into());
    }
    args.push("-noautorotate".into());
    args.push("-i".into());
    args.push(path.into());
    for arg in ["-an", "-f", "rawvideo", "-pix_fmt", "bgr24", "-s"] {
        args.push(arg.into());
    }
    args.push(format!("{}x{}", info.width, info.height).into());
    args.push("-".into());
    args
}

/// Only a clean exit marks the end of the stream.
fn check_exit(status: ExitStatus) -> Result<(), String> {
    if status.success() {
        return Ok(());
    }
    Err(match status.code() {
        Some(code) => format!("decoder exited with code {code}"),
        None => "decoder was terminated by a signal".into(),
    })
}

fn probe(path: &Path) -> Result<VideoInfo, PlayerError> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("v:0")
        .arg("-show_entries")
        .arg("stream=width,height,avg_frame_rate,r_frame_rate,nb_frames,duration")
        .arg("-of")
        .arg("json")
        .arg(path)
        .output()
        .map_err(|err| source_error(path, format!("failed to run ffprobe: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(source_error(path, format!("ffprobe failed: {}", stderr.trim())));
    }

    parse_probe(&output.stdout).map_err(|reason| source_error(path, reason))
}

fn parse_probe(json: &[u8]) -> Result<VideoInfo, String> {
    let probe: ProbeOutput =
        serde_json::from_slice(json).map_err(|err| format!("unreadable ffprobe output: {err}"))?;
    let stream = probe.streams.into_iter().next().ok_or("no video stream")?;

    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err("video stream has no dimensions".into());
    };

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate))
        .unwrap_or(0.0);

    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|count| count.parse::<u64>().ok())
        .or_else(|| {
            let duration = stream.duration.as_deref()?.parse::<f64>().ok()?;
            Some((duration * fps).round() as u64)
        })
        .unwrap_or(0);

    Ok(VideoInfo { fps, frame_count, width, height })
}

/// Parses ffprobe rationals such as `30000/1001`.
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((num, den)) => (num.parse::<f64>().ok()?, den.parse::<f64>().ok()?),
        None => (rate.parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}
