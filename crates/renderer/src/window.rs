use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use compositor::{ButtonState, FrameError, PointerButton, PointerEvent, Scene};
use tracing::{debug, error, info, trace, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::{GpuState, MAX_BODIES};
use crate::pick::FrustumHitTester;
use crate::ticker::{advance_simulation, TickSchedule};

const TITLE_REFRESH: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub surface_size: (u32, u32),
    pub title: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1024, 1024),
            title: "spheres".to_string(),
        }
    }
}

/// A key press forwarded to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Char(char),
    Escape,
}

/// What the application did with a [`KeyPress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    Quit,
}

impl KeyPress {
    fn from_event(event: &KeyEvent) -> Option<Self> {
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => Some(KeyPress::Escape),
            Key::Character(text) => text.chars().next().map(KeyPress::Char),
            _ => None,
        }
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn button_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

struct WindowState {
    // Dropped before the window it renders into.
    gpu: GpuState,
    window: Arc<Window>,
    cursor: PhysicalPosition<f64>,
    title: String,
    title_refreshed: Instant,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let gpu = GpuState::new(window.as_ref(), window.inner_size())?;
        Ok(Self {
            gpu,
            window,
            cursor: PhysicalPosition::new(0.0, 0.0),
            title: config.title.clone(),
            title_refreshed: Instant::now(),
        })
    }

    fn refresh_title(&mut self, scene: &Scene, now: Instant, force: bool) {
        if !force && now.saturating_duration_since(self.title_refreshed) < TITLE_REFRESH {
            return;
        }
        self.title_refreshed = now;
        self.window
            .set_title(&format!("{} | {}", self.title, scene.status_line()));
    }

    /// Renders and presents one frame. Returns false when the loop should stop.
    fn redraw(&mut self, scene: &mut Scene) -> bool {
        let viewport = self.gpu.viewport();
        match scene.on_render_frame(&mut self.gpu, &viewport) {
            Ok(report) => {
                trace!(
                    passes = report.passes,
                    accumulated = report.accumulated,
                    blur_steps = report.blur_steps,
                    "frame composited"
                );
            }
            Err(FrameError::Config(_)) => return true,
            Err(err @ FrameError::Host(_)) => {
                error!("{err}");
                return false;
            }
        }

        match self.gpu.present() {
            Ok(()) => true,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.resize(self.gpu.size());
                true
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory; exiting");
                false
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
                true
            }
            Err(other) => {
                warn!("surface error: {other:?}; retrying next frame");
                true
            }
        }
    }
}

/// Opens the window and runs the scene until it is closed or `on_key` asks to
/// quit.
pub fn run<F>(mut scene: Scene, config: RendererConfig, mut on_key: F) -> Result<()>
where
    F: FnMut(KeyPress, &mut Scene) -> KeyOutcome,
{
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(
            config.surface_size.0,
            config.surface_size.1,
        ))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config)
        .map_err(|err| anyhow!("failed to initialise renderer: {err}"))?;

    if scene.bodies().len() > MAX_BODIES {
        warn!(
            bodies = scene.bodies().len(),
            drawn = MAX_BODIES,
            "more bodies configured than the scene shader draws"
        );
    }

    let tick_interval = scene.simulation().tick_interval();
    let mut ticker = TickSchedule::new(tick_interval, Instant::now());
    state.refresh_title(&scene, Instant::now(), true);
    state.window.request_redraw();
    info!(
        width = config.surface_size.0,
        height = config.surface_size.1,
        tick_ms = tick_interval.as_millis() as u64,
        "window opened"
    );

    let mut failure = None;
    let failure_slot = &mut failure;
    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let Some(key) = KeyPress::from_event(&event) else {
                    return;
                };
                match on_key(key, &mut scene) {
                    KeyOutcome::Quit => elwt.exit(),
                    KeyOutcome::Handled => {
                        state.refresh_title(&scene, Instant::now(), true);
                        state.window.request_redraw();
                    }
                    KeyOutcome::Ignored => trace!(?key, "key ignored"),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.cursor = position;
            }
            WindowEvent::MouseInput {
                state: pressed,
                button,
                ..
            } => {
                let Some(button) = pointer_button(button) else {
                    return;
                };
                let pointer = PointerEvent {
                    button,
                    state: button_state(pressed),
                    x: state.cursor.x as f32,
                    y: state.cursor.y as f32,
                };
                let viewport = state.gpu.viewport();
                if let Some(id) = scene.on_pointer(pointer, &mut FrustumHitTester, &viewport) {
                    debug!(body = %id, "selected");
                }
            }
            WindowEvent::Resized(new_size) => {
                state.gpu.resize(new_size);
                state.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if !state.redraw(&mut scene) {
                    *failure_slot = Some(anyhow!("rendering stopped after a GPU failure"));
                    elwt.exit();
                    return;
                }
                state.refresh_title(&scene, Instant::now(), false);
            }
            _ => {}
        },
        Event::AboutToWait => {
            if advance_simulation(&mut ticker, &mut scene, Instant::now()) {
                state.window.request_redraw();
            }
            elwt.set_control_flow(ControlFlow::WaitUntil(ticker.next_deadline()));
        }
        _ => {}
    });

    if let Err(err) = run_result {
        return Err(anyhow!("window event loop error: {err}"));
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
