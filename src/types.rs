use crate::config;

/// Simulated photo-sensor output: 0 is fully on the line, ~1020 is bare surface.
pub type AnalogReading = u16;

// A point in surface (pixel) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Robot centre in surface coordinates plus heading in degrees (0 points along +x).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle_deg: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, angle_deg: f64) -> Self {
        Pose { x, y, angle_deg }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn heading_rad(&self) -> f64 {
        self.angle_deg.to_radians()
    }
}

// One pixel of track artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Mean of the three channels, 0.0..=255.0
    pub fn brightness(&self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }
}

/// Pulse-width style drive strength per wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorEffort {
    pub left: u8,
    pub right: u8,
}

impl MotorEffort {
    pub const STOP: MotorEffort = MotorEffort { left: 0, right: 0 };

    pub fn new(left: u8, right: u8) -> Self {
        MotorEffort { left, right }
    }
}

/// The rectangle the robot centre is allowed to occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Workspace {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Workspace {
    pub fn new(width: f64, height: f64) -> Self {
        Workspace {
            width,
            height,
            margin: config::WORKSPACE_MARGIN,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn clamp_x(&self, x: f64) -> f64 {
        clamp_span(x, self.margin, self.width - self.margin)
    }

    pub fn clamp_y(&self, y: f64) -> f64 {
        clamp_span(y, self.margin, self.height - self.margin)
    }
}

// Like f64::clamp but tolerates a degenerate span (surface smaller than the robot)
fn clamp_span(value: f64, low: f64, high: f64) -> f64 {
    if high < low {
        return (low + high) / 2.0;
    }
    value.max(low).min(high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_brightness() {
        assert_approx_eq!(Rgb::WHITE.brightness(), 255.0);
        assert_approx_eq!(Rgb::BLACK.brightness(), 0.0);
        assert_approx_eq!(Rgb::new(30, 60, 90).brightness(), 60.0);
    }

    #[test]
    fn test_workspace_clamp() {
        let ws = Workspace::new(800.0, 600.0);
        assert_approx_eq!(ws.clamp_x(-10.0), 30.0);
        assert_approx_eq!(ws.clamp_x(900.0), 770.0);
        assert_approx_eq!(ws.clamp_y(300.0), 300.0);
        assert_approx_eq!(ws.clamp_y(599.0), 570.0);
    }

    #[test]
    fn test_degenerate_workspace_centres() {
        let ws = Workspace::new(40.0, 40.0);
        assert_approx_eq!(ws.clamp_x(5.0), 20.0);
        assert_approx_eq!(ws.clamp_y(35.0), 20.0);
    }

    #[test]
    fn test_point_distance() {
        assert_approx_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}
