pub mod adjust;
pub mod ffmpeg;
pub mod frame;
pub mod layout;
pub mod loader;
