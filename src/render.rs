use crate::app::{App, VerifyStatus};
use crate::config::{
    ANALOG_MAX, GRID_SPACING, NEUTRAL_READING, ROBOT_SIZE, SURFACE_HEIGHT, SURFACE_WIDTH,
    UI_PANEL_WIDTH, WINDOW_HEIGHT,
};
use crate::policy::Decision;
use crate::sensors::{self, ReadingStats, SensorStatus};
use crate::track::{Ink, TrackSurface};
use crate::types::{Point, Pose};
use macroquad::prelude::*;

// Conversion helpers
fn point_to_vec2(p: Point) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

fn color_from_rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
    Color::from_rgba(r, g, b, a)
}

fn brighten_color(color: Color, amount: f32) -> Color {
    Color::new(
        (color.r + amount).min(1.0),
        (color.g + amount).min(1.0),
        (color.b + amount).min(1.0),
        color.a,
    )
}

fn status_color(status: SensorStatus) -> Color {
    match status {
        SensorStatus::StrongLine => color_from_rgba(239, 68, 68, 255),
        SensorStatus::WeakLine => color_from_rgba(234, 179, 8, 255),
        SensorStatus::Surface => color_from_rgba(34, 197, 94, 255),
    }
}

const LINE_DOT: Color = Color::new(0.937, 0.267, 0.267, 1.0);
const SURFACE_DOT: Color = Color::new(0.133, 0.773, 0.369, 1.0);
const ROBOT_BODY: Color = Color::new(0.145, 0.388, 0.922, 1.0);
const ROBOT_NOSE: Color = Color::new(0.863, 0.149, 0.149, 1.0);
const PANEL_BG: Color = Color::new(0.118, 0.161, 0.231, 1.0);
const BAR_BG: Color = Color::new(0.2, 0.255, 0.333, 1.0);

// Handles rendering the simulator state using macroquad
#[derive(Default)]
pub struct Renderer {
    track_texture: Option<Texture2D>,
    track_revision: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_frame(&mut self, app: &App) {
        clear_background(color_from_rgba(15, 23, 42, 255));

        self.draw_track(&app.surface);
        if app.hud.show_grid {
            Self::draw_grid();
        }
        Self::draw_robot(app.simulation.pose());
        Self::draw_sensor_dots(app);
        self.draw_ui_panel(app);

        let fps_text = format!("FPS: {}", get_fps());
        draw_text(&fps_text, 10.0, 20.0, 18.0, DARKGRAY);
    }

    // Re-uploads the texture only when the surface changed since the last frame
    fn draw_track(&mut self, surface: &TrackSurface) {
        if self.track_texture.is_none() || self.track_revision != surface.revision() {
            let texture = Texture2D::from_rgba8(
                surface.width() as u16,
                surface.height() as u16,
                &surface.to_rgba(),
            );
            texture.set_filter(FilterMode::Nearest);
            self.track_texture = Some(texture);
            self.track_revision = surface.revision();
        }
        if let Some(texture) = &self.track_texture {
            draw_texture_ex(
                texture,
                0.0,
                0.0,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(SURFACE_WIDTH as f32, SURFACE_HEIGHT as f32)),
                    ..Default::default()
                },
            );
        }
    }

    fn draw_grid() {
        let grid_color = color_from_rgba(224, 224, 224, 255);
        let (width, height) = (SURFACE_WIDTH as f32, SURFACE_HEIGHT as f32);
        let mut x = 0.0;
        while x <= width {
            draw_line(x, 0.0, x, height, 0.5, grid_color);
            x += GRID_SPACING;
        }
        let mut y = 0.0;
        while y <= height {
            draw_line(0.0, y, width, y, 0.5, grid_color);
            y += GRID_SPACING;
        }
    }

    // Square body with a triangular nose on the heading side
    fn draw_robot(pose: Pose) {
        let half = (ROBOT_SIZE / 2.0) as f32;
        let center = point_to_vec2(pose.position());
        let angle_rad = pose.heading_rad() as f32;
        let (sin_a, cos_a) = angle_rad.sin_cos();
        let rotate = |x: f32, y: f32| -> Vec2 {
            Vec2::new(
                x * cos_a - y * sin_a + center.x,
                x * sin_a + y * cos_a + center.y,
            )
        };

        let corners = [
            rotate(-half, -half),
            rotate(half, -half),
            rotate(half, half),
            rotate(-half, half),
        ];
        draw_triangle(corners[0], corners[1], corners[2], ROBOT_BODY);
        draw_triangle(corners[0], corners[2], corners[3], ROBOT_BODY);
        let outline = brighten_color(ROBOT_BODY, 0.3);
        for i in 0..4 {
            let (a, b) = (corners[i], corners[(i + 1) % 4]);
            draw_line(a.x, a.y, b.x, b.y, 1.0, outline);
        }

        draw_triangle(
            rotate(half, 0.0),
            rotate(half - 10.0, -5.0),
            rotate(half - 10.0, 5.0),
            ROBOT_NOSE,
        );
    }

    fn draw_sensor_dots(app: &App) {
        let sim = &app.simulation;
        let points = sensors::world_points(&sim.pose(), sim.sensor_config());
        for (i, point) in points.iter().enumerate() {
            let reading = sim.readings().get(i).copied().unwrap_or(NEUTRAL_READING);
            let color = if sensors::is_on_line(reading) {
                LINE_DOT
            } else {
                SURFACE_DOT
            };
            let pos = point_to_vec2(*point);
            draw_circle(pos.x, pos.y, 3.0, color);
            if i == app.hud.selected_sensor {
                draw_circle_lines(pos.x, pos.y, 5.5, 1.0, GOLD);
            }
        }
    }

    fn draw_bar(x: f32, y: f32, width: f32, ratio: f32, color: Color) {
        let height = 4.0;
        draw_rectangle(x, y, width, height, BAR_BG);
        draw_rectangle(x, y, width * ratio.clamp(0.0, 1.0), height, color);
    }

    fn draw_ui_panel(&self, app: &App) {
        let panel_x = SURFACE_WIDTH as f32;
        let panel_width = UI_PANEL_WIDTH as f32;
        let padding = 12.0;
        let left = panel_x + padding;
        let right = panel_x + panel_width - padding;
        let inner_width = right - left;
        let font_size = 16.0;
        let small = 14.0;
        let line = 17.0;
        let label_color = color_from_rgba(148, 163, 184, 255);
        let mut y = 24.0;

        draw_rectangle(panel_x, 0.0, panel_width, WINDOW_HEIGHT as f32, PANEL_BG);
        draw_line(panel_x, 0.0, panel_x, WINDOW_HEIGHT as f32, 1.0, BAR_BG);

        // Right-aligned value next to a left-aligned label
        let row = |y: f32, label: &str, value: &str, value_color: Color| {
            draw_text(label, left, y, small, label_color);
            let dims = measure_text(value, None, small as u16, 1.0);
            draw_text(value, right - dims.width, y, small, value_color);
        };

        draw_text("LINE FOLLOWER", left, y, 24.0, GOLD);
        y += line + 6.0;

        // --- Status ---
        let sim = &app.simulation;
        let (status_text, status_col) = if sim.is_running() {
            ("RUNNING", GREEN)
        } else {
            ("STOPPED", LIGHTGRAY)
        };
        row(y, "Status", status_text, status_col);
        y += line;
        row(y, "Runtime", &format!("{:.1}s", app.hud.runtime_secs), WHITE);
        y += line + 4.0;

        // --- Position ---
        let pose = sim.pose();
        row(y, "X / Y", &format!("{:.1} / {:.1}", pose.x, pose.y), WHITE);
        y += line;
        row(y, "Heading", &format!("{:.1} deg", pose.angle_deg), WHITE);
        y += line + 4.0;

        // --- Sensor readings ---
        draw_text("SENSORS", left, y, font_size, ORANGE);
        y += line;
        for (i, &reading) in sim.readings().iter().enumerate() {
            let status = SensorStatus::classify(reading);
            row(y, &format!("A{}  {}", i, status.label()), &reading.to_string(), WHITE);
            Self::draw_bar(
                left,
                y + 3.0,
                inner_width,
                reading as f32 / ANALOG_MAX as f32,
                status_color(status),
            );
            y += line + 4.0;
        }

        if let Some(stats) = ReadingStats::from_readings(sim.readings()) {
            row(
                y,
                "Min / Max",
                &format!("{} / {}", stats.min, stats.max),
                WHITE,
            );
            y += line;
            row(
                y,
                "Avg / Range",
                &format!("{} / {}", stats.mean, stats.range),
                WHITE,
            );
            y += line;
            if stats.alert {
                draw_text("Extreme sensor values!", left, y, small, YELLOW);
                y += line;
            }
        }
        y += 4.0;

        // --- Motors ---
        draw_text("MOTORS", left, y, font_size, GREEN);
        y += line;
        let effort = sim.last_effort();
        let decision = match sim.last_decision() {
            Decision::Straight => "Straight",
            Decision::TurnLeft => "Turn left",
            Decision::TurnRight => "Turn right",
            Decision::Stop => "Stop",
        };
        row(y, "Decision", decision, WHITE);
        y += line;
        for (label, value) in [("Left (pin 9)", effort.left), ("Right (pin 10)", effort.right)] {
            row(y, label, &format!("{} PWM", value), WHITE);
            Self::draw_bar(left, y + 3.0, inner_width, value as f32 / 255.0, SKYBLUE);
            y += line + 4.0;
        }
        y += 4.0;

        // --- Selected mount ---
        if let Some(mount) = sim.sensor_config().mounts().get(app.hud.selected_sensor) {
            row(
                y,
                &format!("Mount A{}", app.hud.selected_sensor),
                &format!(
                    "({:.0}, {:.0}) @ {:.1}",
                    mount.offset_x, mount.offset_y, mount.mount_angle_deg
                ),
                GOLD,
            );
            y += line;
        }

        // --- Program ---
        let (verify_text, verify_color) = match &app.hud.verify {
            VerifyStatus::Unchecked => ("not verified".to_string(), LIGHTGRAY),
            VerifyStatus::Passed => ("verified".to_string(), GREEN),
            VerifyStatus::Failed(reason) => (reason.clone(), RED),
        };
        row(
            y,
            "Program",
            &format!("{} ({} lines)", app.program.name(), app.program.line_count()),
            WHITE,
        );
        y += line;
        draw_text(&verify_text, left, y, small, verify_color);
        y += line;

        let ink = match app.hud.ink {
            Ink::Draw => "draw",
            Ink::Erase => "erase",
        };
        row(y, "Brush", ink, WHITE);

        // --- Key help, pinned to the bottom ---
        let help = [
            "SPACE run/stop  R reset  V verify",
            "D/E draw/erase  C clear  T sample",
            "G grid  1-8 sensors  TAB select",
            "ARROWS move  Q/W angle  F1-F4 code",
        ];
        let mut help_y = WINDOW_HEIGHT as f32 - padding - line * (help.len() as f32 - 1.0);
        for text in help {
            draw_text(text, left, help_y, 13.0, label_color);
            help_y += line;
        }
    }

    pub fn window_should_close() -> bool {
        is_key_down(KeyCode::Escape) || is_quit_requested()
    }
}
