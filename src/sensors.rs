use crate::config;
use crate::track::TrackSurface;
use crate::types::{AnalogReading, Point, Pose};

/// A photo-sensor's fixed offset from the robot centre, in robot-local pixels.
///
/// `mount_angle_deg` is shown and edited but sampling only uses the position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorMount {
    pub offset_x: f64,
    pub offset_y: f64,
    pub mount_angle_deg: f64,
}

impl SensorMount {
    pub fn new(offset_x: f64, offset_y: f64, mount_angle_deg: f64) -> Self {
        SensorMount {
            offset_x,
            offset_y,
            mount_angle_deg,
        }
    }
}

/// Ordered sensor mounts. Index `i` produces reading `i`; 0 is the leftmost sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorArrayConfig {
    mounts: Vec<SensorMount>,
}

impl Default for SensorArrayConfig {
    fn default() -> Self {
        SensorArrayConfig {
            mounts: vec![
                SensorMount::new(-20.0, -30.0, -45.0),
                SensorMount::new(-10.0, -35.0, -22.5),
                SensorMount::new(0.0, -35.0, 0.0),
                SensorMount::new(10.0, -35.0, 22.5),
                SensorMount::new(20.0, -30.0, 45.0),
            ],
        }
    }
}

impl SensorArrayConfig {
    pub fn from_mounts(mounts: Vec<SensorMount>) -> Self {
        SensorArrayConfig { mounts }
    }

    /// Evenly spaced row of `count` sensors in front of the robot, fanned across 90 degrees.
    pub fn with_count(count: usize) -> Self {
        let count = count.clamp(config::MIN_SENSORS, config::MAX_SENSORS);
        let half_width = (count - 1) as f64 * config::SENSOR_SPACING / 2.0;
        let angle_step = if count > 1 {
            config::SENSOR_SPREAD_DEG / (count - 1) as f64
        } else {
            0.0
        };
        let first_angle = if count > 1 {
            -config::SENSOR_SPREAD_DEG / 2.0
        } else {
            0.0
        };

        let mounts = (0..count)
            .map(|i| {
                SensorMount::new(
                    i as f64 * config::SENSOR_SPACING - half_width,
                    config::SENSOR_ROW_OFFSET,
                    first_angle + i as f64 * angle_step,
                )
            })
            .collect();
        SensorArrayConfig { mounts }
    }

    pub fn mounts(&self) -> &[SensorMount] {
        &self.mounts
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Live edit of one mount, clamped to the editor's slider ranges.
    /// Returns false when `index` does not name a mount.
    pub fn nudge_mount(&mut self, index: usize, dx: f64, dy: f64, dangle: f64) -> bool {
        let Some(mount) = self.mounts.get_mut(index) else {
            return false;
        };
        let (x_lo, x_hi) = config::MOUNT_X_RANGE;
        let (y_lo, y_hi) = config::MOUNT_Y_RANGE;
        let (a_lo, a_hi) = config::MOUNT_ANGLE_RANGE;
        mount.offset_x = (mount.offset_x + dx).clamp(x_lo, x_hi);
        mount.offset_y = (mount.offset_y + dy).clamp(y_lo, y_hi);
        mount.mount_angle_deg = (mount.mount_angle_deg + dangle).clamp(a_lo, a_hi);
        crate::debug_sensor!(
            "Mount A{} now at ({:.0}, {:.0}) @ {:.1} deg",
            index,
            mount.offset_x,
            mount.offset_y,
            mount.mount_angle_deg
        );
        true
    }
}

/// Rotates each mount offset by the pose heading and translates it by the pose centre.
/// Points are not clamped; the renderer draws sensor dots from these.
pub fn world_points(pose: &Pose, config: &SensorArrayConfig) -> Vec<Point> {
    let theta = pose.heading_rad();
    let (sin, cos) = theta.sin_cos();
    config
        .mounts()
        .iter()
        .map(|m| {
            Point::new(
                pose.x + m.offset_x * cos - m.offset_y * sin,
                pose.y + m.offset_x * sin + m.offset_y * cos,
            )
        })
        .collect()
}

/// World-space sample points clamped into `[0, width-1] x [0, height-1]`.
pub fn sample_points(
    pose: &Pose,
    config: &SensorArrayConfig,
    width: u32,
    height: u32,
) -> Vec<Point> {
    let max_x = width.saturating_sub(1) as f64;
    let max_y = height.saturating_sub(1) as f64;
    world_points(pose, config)
        .into_iter()
        .map(|p| Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y)))
        .collect()
}

/// Converts an 8-bit channel mean to a 10-bit style reading.
///
/// The result tops out at 1020, not 1023; downstream thresholds expect that scale.
pub fn analog_from_brightness(brightness: f64) -> AnalogReading {
    (brightness * config::ANALOG_SCALE).round() as AnalogReading
}

/// Samples the surface at an already clamped point.
pub fn sample_and_convert(surface: &TrackSurface, point: Point) -> AnalogReading {
    let px = surface.sample_pixel(point.x.floor() as u32, point.y.floor() as u32);
    analog_from_brightness(px.brightness())
}

pub fn is_on_line(reading: AnalogReading) -> bool {
    reading < config::LINE_THRESHOLD
}

// Panel classification of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorStatus {
    StrongLine,
    WeakLine,
    Surface,
}

impl SensorStatus {
    pub fn classify(reading: AnalogReading) -> Self {
        if reading < config::STRONG_LINE_BELOW {
            SensorStatus::StrongLine
        } else if reading < config::WEAK_LINE_BELOW {
            SensorStatus::WeakLine
        } else {
            SensorStatus::Surface
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SensorStatus::StrongLine => "Strong Line",
            SensorStatus::WeakLine => "Weak Line",
            SensorStatus::Surface => "Surface",
        }
    }
}

/// Summary statistics shown under the per-sensor bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingStats {
    pub min: AnalogReading,
    pub max: AnalogReading,
    pub mean: AnalogReading,
    pub range: AnalogReading,
    pub alert: bool, // Some sensor is saturated at either extreme
}

impl ReadingStats {
    pub fn from_readings(readings: &[AnalogReading]) -> Option<Self> {
        let min = *readings.iter().min()?;
        let max = *readings.iter().max()?;
        let sum: u64 = readings.iter().map(|&r| r as u64).sum();
        let mean = (sum as f64 / readings.len() as f64).round() as AnalogReading;
        let alert = readings
            .iter()
            .any(|&r| r < config::ALERT_LOW || r > config::ALERT_HIGH);
        Some(ReadingStats {
            min,
            max,
            mean,
            range: max - min,
            alert,
        })
    }
}
