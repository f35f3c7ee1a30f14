//! The frame loop.
//!
//! [`Animation`] owns everything the loop touches: the logo loader, the
//! particle field once the logo is ready, pointer state and the framebuffer.
//! One call to [`Animation::frame`] is one display refresh; input and resize
//! are applied between frames, so a frame never sees a half-rebuilt field.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::draw::Drawer;
use crate::error::Result;
use crate::field::{FrameStats, ParticleField};
use crate::input::{InputEvent, PointerState};
use crate::logo::{LoadState, LogoLoader};
use crate::types::FrameBuffer;

/// Cloneable handle that ends the frame loop after the current frame.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct Animation {
    config: Config,
    loader: LogoLoader,
    field: Option<ParticleField>,
    pointer: PointerState,
    screen: FrameBuffer,
    touch_capable: bool,
    stop: StopHandle,
}

impl Animation {
    /// Nothing is sampled until the loader reports a logo.
    pub fn new(config: Config, loader: LogoLoader, width: usize, height: usize) -> Self {
        let touch_capable = config.window.touch_emulation;
        Self {
            config,
            loader,
            field: None,
            pointer: PointerState::default(),
            screen: FrameBuffer::new(width, height),
            touch_capable,
            stop: StopHandle::default(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.loader.state()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn screen(&self) -> &FrameBuffer {
        &self.screen
    }

    pub fn handle_input(&mut self, events: &[InputEvent]) {
        for event in events {
            match *event {
                InputEvent::Resize { width, height } => self.resize(width, height),
                _ => self.pointer.apply(event),
            }
        }
    }

    fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.screen.width, self.screen.height) {
            return;
        }
        self.screen.resize(width, height);
        if let Some(field) = self.field.as_mut() {
            field.resize(width, height);
        }
    }

    /// Render one frame into the screen buffer.
    ///
    /// While the logo is loading the screen is plain background. The frame in
    /// which the load resolves builds the field and draws it. A failed load is
    /// returned as an error.
    pub fn frame(&mut self) -> Result<FrameStats> {
        if self.field.is_none() {
            match self.loader.poll() {
                Some(Ok(logo)) => {
                    let field = ParticleField::new(
                        self.config.field.clone(),
                        logo,
                        self.screen.width,
                        self.screen.height,
                        self.config.seed,
                    )?
                    .with_touch_capable(self.touch_capable);
                    tracing::info!(
                        particles = field.particles().len(),
                        scale = f64::from(field.logo_scale()),
                        mobile = field.is_mobile(),
                        "particle field ready"
                    );
                    self.field = Some(field);
                }
                Some(Err(e)) => return Err(e),
                None => {
                    self.screen.fill(self.config.field.background);
                    return Ok(FrameStats::default());
                }
            }
        }

        match self.field.as_mut() {
            Some(field) => Ok(field.update_and_render(&mut self.screen, &self.pointer)),
            None => Ok(FrameStats::default()),
        }
    }

    /// Stop the loop and release the particle field.
    pub fn dispose(&mut self) {
        self.stop.stop();
        if self.field.take().is_some() {
            tracing::debug!("particle field released");
        }
    }

    /// Drive frames until the window closes, Escape is pressed or the stop
    /// handle fires. Pacing comes from the window's target fps.
    pub fn run(&mut self, drawer: &mut Drawer) -> Result<()> {
        let mut fps = FpsCounter::new();
        while drawer.is_open() && !drawer.esc_pressed() && !self.stop.is_stopped() {
            let events = drawer.poll_input();
            self.handle_input(&events);

            let stats = self.frame()?;
            drawer.present(&self.screen)?;

            if let Some(rate) = fps.tick(Instant::now()) {
                tracing::debug!(
                    fps = f64::from(rate),
                    particles = self.field.as_ref().map_or(0, |f| f.particles().len()),
                    scattered = stats.scattered,
                    "frame rate"
                );
            }
        }
        self.dispose();
        Ok(())
    }
}

/// Frames per second, reported once per second.
struct FpsCounter {
    since: Instant,
    frames: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self { since: Instant::now(), frames: 0 }
    }

    fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.since);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        let rate = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.since = now;
        Some(rate)
    }
}
