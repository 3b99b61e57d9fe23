use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

use super::keyboard::Keyboard;
use super::metrics::LoopStats;
use super::rendering::Renderer;
use super::timing::{debug_frame_delay, FixedStep, FramePacer};
use super::{Game, GameCommand};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    /// Logical size of the frames the game produces.
    pub view_width: u32,
    pub view_height: u32,
    pub window_scale: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Tile Quest".to_string(),
            view_width: 640,
            view_height: 512,
            window_scale: 1,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
        }
    }
}

impl LoopConfig {
    pub fn window_size(&self) -> (u32, u32) {
        let scale = self.window_scale.max(1);
        (self.view_width * scale, self.view_height * scale)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
    #[error("game aborted: {reason}")]
    GameAborted { reason: String },
}

/// Opens the window and drives `game` at a fixed tick rate until it quits,
/// aborts, or the window closes.
pub fn run_app(config: LoopConfig, game: Box<dyn Game>) -> Result<(), AppError> {
    let (window_width, window_height) = config.window_size();
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(window_width as f64, window_height as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = Runner::new(&config, game, window, renderer);
    event_loop
        .run(|event, target| runner.handle(event, target))
        .map_err(AppError::EventLoopRun)?;

    match runner.abort_reason.take() {
        Some(reason) => Err(AppError::GameAborted { reason }),
        None => Ok(()),
    }
}

struct Runner {
    game: Box<dyn Game>,
    window: Arc<Window>,
    renderer: Renderer,
    keyboard: Keyboard,
    clock: FixedStep,
    pacer: FramePacer,
    stats: LoopStats,
    slow_frame: Duration,
    last_frame: Instant,
    last_state: &'static str,
    abort_reason: Option<String>,
}

impl Runner {
    fn new(config: &LoopConfig, game: Box<dyn Game>, window: Arc<Window>, renderer: Renderer) -> Self {
        let clock = FixedStep::per_second(
            config.target_tps,
            config.max_frame_delta,
            config.max_ticks_per_frame,
        );
        let pacer = FramePacer::new(config.max_render_fps);
        let interval = if config.metrics_log_interval.is_zero() {
            Duration::from_secs(1)
        } else {
            config.metrics_log_interval
        };
        let slow_frame = debug_frame_delay(config.simulated_slow_frame_ms);
        info!(
            target_tps = config.target_tps,
            view_width = config.view_width,
            view_height = config.view_height,
            window_scale = config.window_scale,
            max_ticks_per_frame = clock.max_ticks(),
            metrics_log_interval_ms = interval.as_millis() as u64,
            slow_frame_delay_ms = slow_frame.as_millis() as u64,
            render_budget_ms = pacer.budget().map(|budget| budget.as_millis() as u64),
            "loop_config"
        );

        let now = Instant::now();
        let last_state = game.state_name();
        info!(state = last_state, "game_started");
        Self {
            game,
            window,
            renderer,
            keyboard: Keyboard::default(),
            clock,
            pacer,
            stats: LoopStats::new(interval, now),
            slow_frame,
            last_frame: now,
            last_state,
            abort_reason: None,
        }
    }

    fn handle(&mut self, event: Event<()>, target: &EventLoopWindowTarget<()>) {
        match event {
            Event::WindowEvent { window_id, event } if window_id == self.window.id() => {
                self.window_event(event, target);
            }
            Event::AboutToWait => self.window.request_redraw(),
            Event::LoopExiting => {
                self.game.shutdown();
                info!("shutdown");
            }
            _ => {}
        }
    }

    fn window_event(&mut self, event: WindowEvent, target: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => {
                self.keyboard.request_quit();
                exit(target, "window_close");
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height, target),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height, target);
            }
            WindowEvent::Focused(false) => self.keyboard.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.key(event.physical_key, event.state);
                if self.keyboard.quit_requested() {
                    exit(target, "escape_key");
                }
            }
            WindowEvent::RedrawRequested => self.redraw(target),
            _ => {}
        }
    }

    fn resize(&mut self, width: u32, height: u32, target: &EventLoopWindowTarget<()>) {
        if let Err(error) = self.renderer.resize(width, height) {
            warn!(error = %error, "renderer_resize_failed");
            target.exit();
        }
    }

    fn redraw(&mut self, target: &EventLoopWindowTarget<()>) {
        if !self.slow_frame.is_zero() {
            thread::sleep(self.slow_frame);
        }
        let now = Instant::now();
        let frame_time = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        let budget = self.clock.advance(frame_time);
        self.run_ticks(budget.ticks, target);
        if !budget.dropped.is_zero() {
            self.stats.clamped();
            warn!(
                dropped_backlog_ms = budget.dropped.as_millis() as u64,
                max_ticks_per_frame = self.clock.max_ticks(),
                "sim_clamp_triggered"
            );
        }

        self.pacer.wait();
        if let Err(error) = self.renderer.present(self.game.frame()) {
            warn!(error = %error, "renderer_draw_failed");
            target.exit();
        }
        self.pacer.presented();
        self.stats.frame(frame_time);

        if let Some(snapshot) = self.stats.take(now) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                clamped_frames = snapshot.clamped_frames,
                state = self.game.state_name(),
                "loop_metrics"
            );
        }
    }

    fn run_ticks(&mut self, ticks: u32, target: &EventLoopWindowTarget<()>) {
        for _ in 0..ticks {
            let input = self.keyboard.snapshot();
            let command = self.game.tick(&input);
            self.stats.tick();

            let state = self.game.state_name();
            if state != self.last_state {
                info!(from = self.last_state, to = state, "state_changed");
                self.last_state = state;
            }

            match command {
                GameCommand::Continue => {}
                GameCommand::Quit => {
                    exit(target, "game_quit");
                    return;
                }
                GameCommand::Abort(reason) => {
                    error!(reason = reason.as_str(), "game_aborted");
                    self.abort_reason = Some(reason);
                    target.exit();
                    return;
                }
            }
        }
    }
}

fn exit(target: &EventLoopWindowTarget<()>, reason: &'static str) {
    info!(reason, "shutdown_requested");
    target.exit();
}
