/// Terminal front end for the termesh renderer
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event},
    terminal, QueueableCommand,
};
use log::{debug, warn};
use std::io::{self, stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use termesh_core::{LightState, Mesh, RenderConfig, Renderer, RotationState};

pub mod input;
pub mod renderer;

pub use input::{handle_key_event, InputAction};
pub use renderer::FrameWriter;

/// How long the input thread waits for an event before rechecking shutdown.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Raw mode plus alternate screen, restored on drop
pub struct TerminalSession<W: Write = io::Stdout> {
    writer: W,
    raw_mode: bool,
    active: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        Self::start(stdout(), true)
    }
}

impl<W: Write> TerminalSession<W> {
    /// Take over `writer`. The guard exists before any setup command is
    /// sent, so a failure part way still restores the terminal.
    fn start(writer: W, raw_mode: bool) -> Result<Self> {
        let mut session = Self {
            writer,
            raw_mode,
            active: true,
        };
        session.setup().context("entering alternate screen")?;
        Ok(session)
    }

    fn setup(&mut self) -> io::Result<()> {
        self.writer.queue(terminal::EnterAlternateScreen)?;
        self.writer.queue(cursor::Hide)?;
        self.writer.queue(terminal::DisableLineWrap)?;
        self.writer.flush()
    }

    fn restore_screen(&mut self) -> io::Result<()> {
        self.writer.queue(terminal::EnableLineWrap)?;
        self.writer.queue(cursor::Show)?;
        self.writer.queue(terminal::LeaveAlternateScreen)?;
        self.writer.flush()
    }

    pub fn exit(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        // Raw mode goes even if the screen could not be restored
        let screen = self.restore_screen();
        if self.raw_mode {
            terminal::disable_raw_mode()?;
        }
        screen?;
        Ok(())
    }
}

impl<W: Write> Drop for TerminalSession<W> {
    fn drop(&mut self) {
        // Always try to restore terminal state
        let _ = self.exit();
    }
}

/// Main application struct for terminal mesh rendering
pub struct TerminalApp {
    mesh: Mesh,
    config: RenderConfig,
    rotation: RotationState,
    renderer: Renderer,
    writer: FrameWriter,
    light: Arc<LightState>,
    running: Arc<AtomicBool>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// `mesh` should already be normalized.
    pub fn new(mesh: Mesh, config: RenderConfig) -> Result<Self> {
        let (width, height) = terminal::size().context("querying terminal size")?;

        Ok(Self {
            mesh,
            config,
            rotation: RotationState::zero(),
            renderer: Renderer::new(width as usize, height as usize, &config),
            writer: FrameWriter::new(),
            light: Arc::new(LightState::default()),
            running: Arc::new(AtomicBool::new(true)),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut session = TerminalSession::enter()?;
        let input = spawn_input_thread(Arc::clone(&self.light), Arc::clone(&self.running));

        let result = self.main_loop();

        // Cleanup
        self.running.store(false, Ordering::Relaxed);
        let input = input.join();
        // Back on the main screen before anything reaches stderr
        session.exit()?;

        result?;
        match input {
            Ok(input) => input.context("reading terminal input"),
            Err(_) => {
                warn!("Input thread panicked");
                Ok(())
            }
        }
    }

    fn main_loop(&mut self) -> Result<()> {
        while self.running.load(Ordering::Relaxed) {
            let frame_start = Instant::now();

            self.update_size()?;
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.config.frame_interval {
                thread::sleep(self.config.frame_interval - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }

            self.rotation.advance_yaw(self.config.yaw_step);
            self.light.orbit(self.config.light_orbit_step);
        }

        Ok(())
    }

    fn update_size(&mut self) -> Result<()> {
        let (width, height) = terminal::size()?;
        let (width, height) = (width as usize, height as usize);
        if (width, height) != (self.renderer.width(), self.renderer.height()) {
            debug!("Terminal resized to {}x{}", width, height);
            self.renderer.resize(width, height);
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let light = self.light.direction();
        let frame = self.renderer.render(&self.mesh, &self.rotation, &light);

        // Output to terminal
        let mut stdout = stdout().lock();
        self.writer.draw(&mut stdout, &frame)?;

        // Draw UI overlay
        let status = format!(
            "termesh | {} triangles | FPS: {:.1} | Light: 1-8 / qwerty rows{} | Esc=Quit",
            self.mesh.len(),
            self.fps,
            if self.light.auto_orbit() { " (orbiting)" } else { "" },
        );
        self.writer.draw_status(&mut stdout, &status, frame.width)?;

        stdout.flush()?;
        Ok(())
    }
}

/// Read key events on their own thread, writing only to the shared state.
///
/// The frame loop never blocks on input and input never renders.
fn spawn_input_thread(light: Arc<LightState>, running: Arc<AtomicBool>) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || pump_input(poll_event, &light, &running))
}

fn poll_event() -> io::Result<Option<Event>> {
    if event::poll(INPUT_POLL)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Apply events from `next_event` until `running` clears or reading fails.
///
/// `running` is always cleared on return: with no reader left, Esc could
/// never stop the frame loop.
fn pump_input<F>(mut next_event: F, light: &LightState, running: &AtomicBool) -> io::Result<()>
where
    F: FnMut() -> io::Result<Option<Event>>,
{
    let mut outcome = Ok(());
    while running.load(Ordering::Relaxed) {
        match next_event() {
            Ok(Some(Event::Key(key))) => match handle_key_event(key) {
                Some(InputAction::Quit) => break,
                Some(InputAction::Light(command)) => light.apply(command),
                None => {}
            },
            Ok(_) => {}
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }
    running.store(false, Ordering::Relaxed);
    outcome
}
