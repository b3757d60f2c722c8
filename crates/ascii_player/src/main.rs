use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use ascii_video::{
    prepare_session, CharsetVariant, FontCandidate, PlaybackController, PlayerConfig, SystemClock,
    WINDOW_TITLE,
};
use clap::{ArgAction, Parser};
use log::debug;

mod logging;
mod window;

use crate::window::Window;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play a video as colored ASCII glyphs with a live preview")]
struct Cli {
    /// Video file, animated GIF, still image, or directory of frames
    video: PathBuf,
    /// Number of glyph columns
    #[arg(long, default_value_t = 120, allow_negative_numbers = true)]
    width: i64,
    /// Number of glyph rows [default: derived from the aspect ratio]
    #[arg(long, allow_negative_numbers = true)]
    height: Option<i64>,
    /// Draw every glyph in its grayscale level instead of the source color
    #[arg(long)]
    no_color: bool,
    /// Use the 70-glyph ramp
    #[arg(long)]
    extended: bool,
    /// Start with the preview overlay hidden
    #[arg(long)]
    no_preview: bool,
    /// Font file tried before the built-in list; may be repeated
    #[arg(long = "font", value_name = "PATH", env = "ASCII_PLAYER_FONT")]
    fonts: Vec<PathBuf>,
    /// Glyph size in pixels
    #[arg(long, default_value_t = 10.0)]
    font_size: f32,
    /// More log output; repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Less log output; repeat for less
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

impl Cli {
    fn player_config(&self) -> PlayerConfig {
        let mut config = PlayerConfig {
            width: self.width,
            height: self.height,
            color: !self.no_color,
            charset: if self.extended { CharsetVariant::Extended } else { CharsetVariant::Standard },
            preview: !self.no_preview,
            font_size: self.font_size,
            ..PlayerConfig::default()
        };

        let user_fonts = self.fonts.iter().cloned().map(FontCandidate::from_path);
        config.fonts = user_fonts.chain(config.fonts).collect();
        config
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version requests are not failures.
            return if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        },
    };

    logging::initialize(logging::level_from_flags(cli.verbose, cli.quiet));
    debug!("{cli:?}");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let prepared = prepare_session(&cli.video, cli.player_config())?;
    let geometry = prepared.session.geometry;

    let window = Window::open(WINDOW_TITLE, geometry.surface_width, geometry.surface_height)
        .context("failed to open the player window")?;

    let mut controller = PlaybackController::new(
        prepared.session,
        prepared.source,
        prepared.canvas,
        window,
        SystemClock,
    );
    controller.run()?;
    Ok(())
}
