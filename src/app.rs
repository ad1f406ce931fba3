use crate::config;
use crate::error::TrackError;
use crate::program::{Program, Template};
use crate::render::Renderer;
use crate::scheduler::FrameScheduler;
use crate::sensors::SensorArrayConfig;
use crate::simulation::{Simulation, TickReport};
use crate::track::{Ink, TrackSurface};
use crate::types::Point;
use log::{error, info, warn};
use macroquad::prelude::{
    Image, KeyCode, MouseButton, get_frame_time, is_key_pressed, is_mouse_button_down,
    mouse_position, next_frame,
};
use std::fs;
use std::path::Path;

/// Everything the user can ask for from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    ToggleRun,
    Reset,
    ClearTrack,
    SampleTrack,
    SetInk(Ink),
    ToggleGrid,
    SetSensorCount(usize),
    SelectNextSensor,
    NudgeSensor { dx: f64, dy: f64, dangle: f64 },
    LoadTemplate(Template),
    Verify,
}

impl Command {
    pub fn nudge(dx: f64, dy: f64, dangle: f64) -> Self {
        Command::NudgeSensor { dx, dy, dangle }
    }
}

/// Result of the last "Verify" press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStatus {
    Unchecked,
    Passed,
    Failed(String),
}

/// Panel and editor state that is not part of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct HudState {
    pub ink: Ink,
    pub show_grid: bool,
    pub selected_sensor: usize,
    pub runtime_secs: f64,
    pub verify: VerifyStatus,
}

impl Default for HudState {
    fn default() -> Self {
        HudState {
            ink: Ink::Draw,
            show_grid: true,
            selected_sensor: 0,
            runtime_secs: 0.0,
            verify: VerifyStatus::Unchecked,
        }
    }
}

/// The simulator shell: owns the track, the simulation and its scheduler, the program
/// text and the HUD state, and turns input into calls on them.
pub struct App {
    pub surface: TrackSurface,
    pub simulation: Simulation,
    pub program: Program,
    pub hud: HudState,
    scheduler: FrameScheduler,
    last_pointer: Option<Point>,
}

impl App {
    pub fn new(surface: TrackSurface, simulation: Simulation, program: Program) -> Self {
        info!(
            "Track {}x{}, {} sensors, program '{}'",
            surface.width(),
            surface.height(),
            simulation.sensor_config().len(),
            program.name()
        );
        App {
            surface,
            simulation,
            program,
            hud: HudState::default(),
            scheduler: FrameScheduler::new(),
            last_pointer: None,
        }
    }

    pub fn start(&mut self) {
        self.simulation.start(&mut self.scheduler);
    }

    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::ToggleRun => {
                if self.simulation.is_running() {
                    self.simulation.stop(&mut self.scheduler);
                } else {
                    self.simulation.start(&mut self.scheduler);
                }
            }
            Command::Reset => {
                // The reset button also halts the robot
                self.simulation.stop(&mut self.scheduler);
                self.simulation.reset();
                self.hud.runtime_secs = 0.0;
            }
            Command::ClearTrack => self.surface.clear(),
            Command::SampleTrack => {
                let (width, height) = (self.surface.width(), self.surface.height());
                let sample = TrackSurface::with_sample_track(width, height);
                if let Err(e) = self.surface.replace_all(sample) {
                    error!("Failed to restore sample track: {}", e);
                }
            }
            Command::SetInk(ink) => self.hud.ink = ink,
            Command::ToggleGrid => self.hud.show_grid = !self.hud.show_grid,
            Command::SetSensorCount(count) => {
                let sensors = SensorArrayConfig::with_count(count);
                self.hud.selected_sensor = self.hud.selected_sensor.min(sensors.len() - 1);
                info!("Sensor layout regenerated with {} sensors", sensors.len());
                self.simulation.set_sensor_config(sensors);
            }
            Command::SelectNextSensor => {
                let count = self.simulation.sensor_config().len().max(1);
                self.hud.selected_sensor = (self.hud.selected_sensor + 1) % count;
            }
            Command::NudgeSensor { dx, dy, dangle } => {
                let mut sensors = self.simulation.sensor_config().clone();
                if sensors.nudge_mount(self.hud.selected_sensor, dx, dy, dangle) {
                    self.simulation.set_sensor_config(sensors);
                }
            }
            Command::LoadTemplate(template) => match Program::from_template(template) {
                Ok(program) => {
                    info!(
                        "Loaded '{}' template ({} lines)",
                        program.name(),
                        program.line_count()
                    );
                    self.program = program;
                    self.hud.verify = VerifyStatus::Unchecked;
                }
                Err(e) => error!("{}", e),
            },
            Command::Verify => {
                self.hud.verify = match self.program.verify() {
                    Ok(()) => {
                        info!("Program '{}' verified", self.program.name());
                        VerifyStatus::Passed
                    }
                    Err(e) => {
                        warn!("Program '{}' failed verification: {}", self.program.name(), e);
                        VerifyStatus::Failed(e.to_string())
                    }
                };
            }
        }
    }

    /// Paints with the current ink while the pointer is held, joining successive
    /// positions into a stroke. `None` ends the stroke.
    pub fn paint(&mut self, pointer: Option<Point>) {
        match (self.last_pointer, pointer) {
            (Some(from), Some(to)) => self.surface.paint_stroke(from, to, self.hud.ink),
            (None, Some(at)) => self.surface.paint_stroke(at, at, self.hud.ink),
            (_, None) => {}
        }
        self.last_pointer = pointer;
    }

    /// Fires the tick due on this frame, if the simulation booked one.
    pub fn advance(&mut self, frame_time: f64) -> Option<TickReport> {
        if self.simulation.is_running() {
            self.hud.runtime_secs += frame_time;
        }
        let handle = self.scheduler.take_due()?;
        self.simulation.tick(handle, &self.surface, &mut self.scheduler)
    }

    /// Run the main loop using the provided renderer
    pub async fn run(&mut self, renderer: &mut Renderer) {
        info!("Starting main loop...");

        while !Renderer::window_should_close() {
            for command in poll_commands() {
                self.handle_command(command);
            }
            self.paint(poll_pointer());
            self.advance(get_frame_time() as f64);

            renderer.draw_frame(self);
            next_frame().await;
        }
        info!("Exiting line follower simulator.");
    }
}

// Maps this frame's key presses onto commands
fn poll_commands() -> Vec<Command> {
    let step = 1.0;
    let angle_step = config::MOUNT_ANGLE_STEP;
    let bindings = [
        (KeyCode::Space, Command::ToggleRun),
        (KeyCode::R, Command::Reset),
        (KeyCode::C, Command::ClearTrack),
        (KeyCode::T, Command::SampleTrack),
        (KeyCode::D, Command::SetInk(Ink::Draw)),
        (KeyCode::E, Command::SetInk(Ink::Erase)),
        (KeyCode::G, Command::ToggleGrid),
        (KeyCode::Tab, Command::SelectNextSensor),
        (KeyCode::Left, Command::nudge(-step, 0.0, 0.0)),
        (KeyCode::Right, Command::nudge(step, 0.0, 0.0)),
        (KeyCode::Up, Command::nudge(0.0, -step, 0.0)),
        (KeyCode::Down, Command::nudge(0.0, step, 0.0)),
        (KeyCode::Q, Command::nudge(0.0, 0.0, -angle_step)),
        (KeyCode::W, Command::nudge(0.0, 0.0, angle_step)),
        (KeyCode::F1, Command::LoadTemplate(Template::Default)),
        (KeyCode::F2, Command::LoadTemplate(Template::Basic)),
        (KeyCode::F3, Command::LoadTemplate(Template::Pid)),
        (KeyCode::F4, Command::LoadTemplate(Template::Advanced)),
        (KeyCode::V, Command::Verify),
    ];
    let count_keys = [
        KeyCode::Key1,
        KeyCode::Key2,
        KeyCode::Key3,
        KeyCode::Key4,
        KeyCode::Key5,
        KeyCode::Key6,
        KeyCode::Key7,
        KeyCode::Key8,
    ];

    let mut commands: Vec<Command> = bindings
        .iter()
        .filter(|(key, _)| is_key_pressed(*key))
        .map(|(_, command)| *command)
        .collect();
    for (i, key) in count_keys.iter().enumerate() {
        if is_key_pressed(*key) {
            commands.push(Command::SetSensorCount(i + 1));
        }
    }
    commands
}

// Pointer position while the left button is held over the arena
fn poll_pointer() -> Option<Point> {
    if !is_mouse_button_down(MouseButton::Left) {
        return None;
    }
    let (x, y) = mouse_position();
    let inside = x >= 0.0
        && y >= 0.0
        && x < config::SURFACE_WIDTH as f32
        && y < config::SURFACE_HEIGHT as f32;
    inside.then(|| Point::new(x as f64, y as f64))
}

/// Decodes a PNG/JPEG track and fits it to a `width` x `height` surface.
pub fn load_track_image(path: &Path, width: u32, height: u32) -> Result<TrackSurface, TrackError> {
    let bytes = fs::read(path)
        .map_err(|e| TrackError::Decode(format!("{}: {}", path.display(), e)))?;
    let image = Image::from_file_with_format(&bytes, None)
        .map_err(|e| TrackError::Decode(format!("{}: {}", path.display(), e)))?;
    let imported = TrackSurface::from_rgba(image.width as u32, image.height as u32, &image.bytes)?;
    info!(
        "Imported track {} ({}x{})",
        path.display(),
        imported.width(),
        imported.height()
    );
    Ok(imported.resampled(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Decision;
    use crate::types::{Pose, Rgb};

    fn new_app() -> App {
        let surface = TrackSurface::new(800, 600);
        let simulation = Simulation::new(800, 600, SensorArrayConfig::default());
        App::new(surface, simulation, Program::new("test", "void setup() {}\nvoid loop() {}"))
    }

    #[test]
    fn test_toggle_run_starts_and_stops() {
        let mut app = new_app();
        assert!(app.advance(0.016).is_none());

        app.handle_command(Command::ToggleRun);
        assert!(app.simulation.is_running());
        assert!(app.advance(0.016).is_some());
        assert!(app.advance(0.016).is_some());

        app.handle_command(Command::ToggleRun);
        assert!(!app.simulation.is_running());
        assert!(app.advance(0.016).is_none());
    }

    #[test]
    fn test_runtime_only_counts_while_running() {
        let mut app = new_app();
        app.advance(1.0);
        assert_eq!(app.hud.runtime_secs, 0.0);
        app.start();
        app.advance(0.5);
        app.advance(0.25);
        assert!((app.hud.runtime_secs - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_reset_stops_and_recentres() {
        let mut app = new_app();
        app.surface.paint_stroke(Point::new(0.0, 265.0), Point::new(799.0, 265.0), Ink::Draw);
        app.start();
        for _ in 0..5 {
            app.advance(0.016);
        }
        assert!(app.simulation.pose().x > 400.0);

        app.handle_command(Command::Reset);
        assert!(!app.simulation.is_running());
        assert_eq!(app.simulation.pose(), Pose::new(400.0, 300.0, 0.0));
        assert_eq!(app.simulation.readings(), &[512; 5]);
        assert_eq!(app.hud.runtime_secs, 0.0);
        assert!(app.advance(0.016).is_none());
    }

    #[test]
    fn test_painting_feeds_the_next_tick() {
        let mut app = new_app();
        app.start();
        assert_eq!(app.advance(0.016).unwrap().decision, Decision::Stop);

        // Draw under the centre sensor between ticks
        app.paint(Some(Point::new(395.0, 265.0)));
        app.paint(Some(Point::new(405.0, 265.0)));
        app.paint(None);
        assert_eq!(app.surface.sample_pixel(400, 265), Rgb::BLACK);
        assert_eq!(app.advance(0.016).unwrap().decision, Decision::Straight);

        app.handle_command(Command::SetInk(Ink::Erase));
        app.paint(Some(Point::new(400.0, 265.0)));
        app.paint(None);
        assert_eq!(app.surface.sample_pixel(400, 265), Rgb::WHITE);
    }

    #[test]
    fn test_track_commands() {
        let mut app = new_app();
        app.handle_command(Command::SampleTrack);
        assert_eq!(app.surface.sample_pixel(100, 300), Rgb::BLACK);
        app.handle_command(Command::ClearTrack);
        assert_eq!(app.surface.sample_pixel(100, 300), Rgb::WHITE);
    }

    #[test]
    fn test_sensor_layout_commands() {
        let mut app = new_app();
        app.handle_command(Command::SelectNextSensor);
        app.handle_command(Command::SelectNextSensor);
        app.handle_command(Command::SelectNextSensor);
        assert_eq!(app.hud.selected_sensor, 3);

        app.handle_command(Command::SetSensorCount(3));
        assert_eq!(app.simulation.sensor_config().len(), 3);
        assert_eq!(app.hud.selected_sensor, 2);

        app.handle_command(Command::nudge(4.0, -2.0, 5.0));
        let mount = app.simulation.sensor_config().mounts()[2];
        assert_eq!(mount.offset_x, 14.0);
        assert_eq!(mount.offset_y, -37.0);
        assert_eq!(mount.mount_angle_deg, 50.0);

        app.handle_command(Command::SelectNextSensor);
        assert_eq!(app.hud.selected_sensor, 0);
    }

    #[test]
    fn test_template_and_verify_commands() {
        let mut app = new_app();
        app.program = Program::new("broken", "int x = 1;");
        app.handle_command(Command::Verify);
        assert!(matches!(app.hud.verify, VerifyStatus::Failed(_)));

        app.handle_command(Command::LoadTemplate(Template::Pid));
        assert_eq!(app.program.name(), "pid");
        assert_eq!(app.hud.verify, VerifyStatus::Unchecked);

        app.handle_command(Command::Verify);
        assert_eq!(app.hud.verify, VerifyStatus::Passed);
    }

    #[test]
    fn test_nudge_builds_sensor_command() {
        assert_eq!(
            Command::nudge(-1.0, 0.0, 5.0),
            Command::NudgeSensor {
                dx: -1.0,
                dy: 0.0,
                dangle: 5.0,
            }
        );
    }

    #[test]
    fn test_toggles() {
        let mut app = new_app();
        assert!(app.hud.show_grid);
        app.handle_command(Command::ToggleGrid);
        assert!(!app.hud.show_grid);
        app.handle_command(Command::SetInk(Ink::Erase));
        assert_eq!(app.hud.ink, Ink::Erase);
    }
}
