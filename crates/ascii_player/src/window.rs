use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use ascii_video::{Display, InputEvent, Key, PlayerError};
use log::debug;
use softbuffer::{Context, Surface};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as WinitWindow, WindowId};

/// Pumps spent waiting for the platform to map the window.
const OPEN_ATTEMPTS: usize = 200;
const OPEN_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

/// Fixed-size window showing the player's surface.
pub struct Window {
    event_loop: EventLoop<()>,
    app: WindowApp,
}

struct WindowApp {
    title: String,
    size: PhysicalSize<u32>,
    window: Option<Rc<WinitWindow>>,
    context: Option<Context<Rc<WinitWindow>>>,
    surface: Option<Surface<Rc<WinitWindow>, Rc<WinitWindow>>>,
    events: Vec<InputEvent>,
    error: Option<String>,
}

impl Window {
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let mut window = Self {
            event_loop,
            app: WindowApp {
                title: title.to_owned(),
                size: PhysicalSize::new(width, height),
                window: None,
                context: None,
                surface: None,
                events: Vec::new(),
                error: None,
            },
        };

        for _ in 0..OPEN_ATTEMPTS {
            let status = window.pump(Some(OPEN_PUMP_TIMEOUT));
            if let Some(error) = window.app.error.take() {
                bail!(error);
            }
            if window.app.surface.is_some() {
                return Ok(window);
            }
            if let PumpStatus::Exit(code) = status {
                bail!("event loop exited with code {code} before the window opened");
            }
        }
        bail!("window did not open")
    }

    fn pump(&mut self, timeout: Option<Duration>) -> PumpStatus {
        self.event_loop.pump_app_events(timeout, &mut self.app)
    }
}

impl Display for Window {
    fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<(), PlayerError> {
        let Some(surface) = self.app.surface.as_mut() else {
            return Err(PlayerError::Display("window is closed".into()));
        };
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Ok(());
        };

        surface.resize(w, h).map_err(|err| PlayerError::Display(err.to_string()))?;
        let mut buffer = surface.buffer_mut().map_err(|err| PlayerError::Display(err.to_string()))?;
        let len = buffer.len().min(pixels.len());
        buffer[..len].copy_from_slice(&pixels[..len]);
        buffer.present().map_err(|err| PlayerError::Display(err.to_string()))
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        if let PumpStatus::Exit(_) = self.pump(Some(Duration::ZERO)) {
            self.app.events.push(InputEvent::CloseRequested);
        }
        std::mem::take(&mut self.app.events)
    }

    fn close(&mut self) {
        self.app.surface = None;
        self.app.context = None;
        if let Some(window) = self.app.window.take() {
            window.set_visible(false);
        }
    }
}

impl WindowApp {
    fn create(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WinitWindow::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.size)
            .with_resizable(false);
        let window = Rc::new(event_loop.create_window(attributes).context("failed to create window")?);

        let context = Context::new(window.clone())
            .map_err(|err| anyhow::anyhow!("failed to create drawing context: {err}"))?;
        let surface = Surface::new(&context, window.clone())
            .map_err(|err| anyhow::anyhow!("failed to create drawing surface: {err}"))?;

        debug!("opened {}x{} window", self.size.width, self.size.height);
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
        Ok(())
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create(event_loop) {
            self.error = Some(format!("{err:#}"));
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.events.push(InputEvent::CloseRequested),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                if let Some(key) = map_key(&event.logical_key) {
                    self.events.push(InputEvent::Key(key));
                }
            },
            _ => (),
        }
    }
}

fn map_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Named(NamedKey::Space) => Some(Key::Space),
        WinitKey::Named(NamedKey::Escape) => Some(Key::Escape),
        WinitKey::Character(text) => match text.as_str() {
            " " => Some(Key::Space),
            text => text.chars().next().map(Key::Char),
        },
        _ => None,
    }
}
