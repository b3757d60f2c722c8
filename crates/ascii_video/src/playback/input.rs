//! Keyboard surface of the player.

/// Key press as reported by the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Space,
    Escape,
    Char(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// The user closed the window.
    CloseRequested,
}

/// Transport action triggered by input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Restart,
    TogglePreview,
    Quit,
}

impl Command {
    pub fn from_event(event: InputEvent) -> Option<Self> {
        match event {
            InputEvent::CloseRequested => Some(Command::Quit),
            InputEvent::Key(key) => Self::from_key(key),
        }
    }

    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Space => Some(Command::TogglePause),
            Key::Escape => Some(Command::Quit),
            Key::Char(ch) => match ch.to_ascii_lowercase() {
                'q' => Some(Command::Quit),
                'r' => Some(Command::Restart),
                'p' => Some(Command::TogglePreview),
                _ => None,
            },
        }
    }
}

pub const CONTROLS_HELP: &[(&str, &str)] = &[
    ("SPACE", "Pause/Resume"),
    ("P", "Toggle preview on/off"),
    ("R", "Restart"),
    ("ESC or Q", "Quit"),
];
