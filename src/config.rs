//! Configuration constants for the line-following simulator.

// Track surface
pub const SURFACE_WIDTH: u32 = 800;
pub const SURFACE_HEIGHT: u32 = 600;
pub const GRID_SPACING: f32 = 50.0; // Grid overlay spacing in pixels

// Robot body
pub const ROBOT_SIZE: f64 = 30.0; // Body edge length in pixels
pub const WORKSPACE_MARGIN: f64 = ROBOT_SIZE; // Pose is kept this far from every edge

// Sensors
pub const MIN_SENSORS: usize = 1;
pub const MAX_SENSORS: usize = 8;
pub const DEFAULT_SENSOR_COUNT: usize = 5;
pub const SENSOR_ROW_OFFSET: f64 = -35.0; // Local y of generated sensor rows
pub const SENSOR_SPACING: f64 = 10.0; // Local x spacing of generated sensor rows
pub const SENSOR_SPREAD_DEG: f64 = 90.0; // Mount angles fan out over +/- half of this
pub const MOUNT_X_RANGE: (f64, f64) = (-50.0, 50.0);
pub const MOUNT_Y_RANGE: (f64, f64) = (-50.0, 20.0);
pub const MOUNT_ANGLE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const MOUNT_ANGLE_STEP: f64 = 5.0;

// Analog conversion
pub const ANALOG_SCALE: f64 = 4.0; // 8-bit brightness -> 10-bit reading
pub const ANALOG_MAX: u16 = 1023; // Nominal ADC ceiling
pub const NEUTRAL_READING: u16 = 512; // Reading assumed for missing sensors
pub const LINE_THRESHOLD: u16 = 500; // Below this a sensor is on the line
pub const STRONG_LINE_BELOW: u16 = 400;
pub const WEAK_LINE_BELOW: u16 = 600;
pub const ALERT_LOW: u16 = 100;
pub const ALERT_HIGH: u16 = 950;

// Motion
pub const EFFORT_MAX: f64 = 255.0;
pub const SPEED_SCALE: f64 = 2.0; // Pixels per tick at full effort on both wheels
pub const TURN_SCALE: f64 = 3.0; // Degrees per tick at full effort difference

// Painting
pub const DRAW_RADIUS: f64 = 2.0;
pub const ERASE_RADIUS: f64 = 8.0;
pub const SAMPLE_TRACK_RADIUS: f64 = 1.5; // Half of the 3px sample track stroke

// Rendering configuration
pub const UI_PANEL_WIDTH: i32 = 280;
pub const WINDOW_WIDTH: i32 = SURFACE_WIDTH as i32 + UI_PANEL_WIDTH;
pub const WINDOW_HEIGHT: i32 = SURFACE_HEIGHT as i32;
pub const FRAME_RATE: u32 = 60; // Nominal tick rate; the integrator itself is per tick
