use crate::config;
use crate::types::{MotorEffort, Pose, Workspace};

/// Forward speed in pixels per tick for a pair of wheel efforts.
pub fn linear_speed(effort: MotorEffort) -> f64 {
    (effort.left as f64 + effort.right as f64) / 2.0 / config::EFFORT_MAX * config::SPEED_SCALE
}

/// Heading change in degrees per tick. Positive when the right wheel pushes harder.
pub fn turn_rate(effort: MotorEffort) -> f64 {
    (effort.right as f64 - effort.left as f64) / config::EFFORT_MAX * config::TURN_SCALE
}

/// Wraps an angle into [0, 360).
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let wrapped = angle_deg.rem_euclid(360.0);
    // rem_euclid of a tiny negative rounds up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Advances the pose by exactly one tick.
///
/// Effort maps straight onto forward speed and turn rate (no wheelbase model). The
/// position moves along the old heading before the heading is updated, and is clamped
/// so the body stays inside the workspace.
pub fn integrate(pose: Pose, effort: MotorEffort, workspace: &Workspace) -> Pose {
    let speed = linear_speed(effort);
    let rate = turn_rate(effort);
    let (sin, cos) = pose.heading_rad().sin_cos();

    let next = Pose {
        x: workspace.clamp_x(pose.x + speed * cos),
        y: workspace.clamp_y(pose.y + speed * sin),
        angle_deg: normalize_angle(pose.angle_deg + rate),
    };
    crate::debug_drive!(
        "speed={:.3} turn={:.3} ({:.2},{:.2},{:.1}) -> ({:.2},{:.2},{:.1})",
        speed,
        rate,
        pose.x,
        pose.y,
        pose.angle_deg,
        next.x,
        next.y,
        next.angle_deg
    );
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn workspace() -> Workspace {
        Workspace::new(800.0, 600.0)
    }

    #[test]
    fn test_straight_drive_example() {
        let next = integrate(
            Pose::new(400.0, 300.0, 0.0),
            MotorEffort::new(200, 200),
            &workspace(),
        );
        assert_approx_eq!(next.x, 400.0 + 400.0 / 255.0, 1e-9);
        assert_approx_eq!(next.x, 401.568, 1e-3);
        assert_approx_eq!(next.y, 300.0, 1e-9);
        assert_approx_eq!(next.angle_deg, 0.0);
    }

    #[test]
    fn test_speed_and_turn_rate() {
        assert_approx_eq!(linear_speed(MotorEffort::new(255, 255)), 2.0);
        assert_approx_eq!(linear_speed(MotorEffort::STOP), 0.0);
        assert_approx_eq!(turn_rate(MotorEffort::new(100, 255)), 155.0 / 255.0 * 3.0);
        assert_approx_eq!(turn_rate(MotorEffort::new(255, 100)), -155.0 / 255.0 * 3.0);
        assert_approx_eq!(turn_rate(MotorEffort::new(0, 255)), 3.0);
    }

    #[test]
    fn test_moves_along_old_heading() {
        let next = integrate(
            Pose::new(400.0, 300.0, 90.0),
            MotorEffort::new(100, 255),
            &workspace(),
        );
        let speed = 355.0 / 2.0 / 255.0 * 2.0;
        assert_approx_eq!(next.x, 400.0, 1e-9);
        assert_approx_eq!(next.y, 300.0 + speed, 1e-9);
        assert_approx_eq!(next.angle_deg, 90.0 + 155.0 / 255.0 * 3.0, 1e-9);
    }

    #[test]
    fn test_position_is_clamped() {
        let ws = workspace();
        let next = integrate(Pose::new(769.5, 300.0, 0.0), MotorEffort::new(255, 255), &ws);
        assert_approx_eq!(next.x, 770.0);

        let next = integrate(Pose::new(30.0, 30.0, 225.0), MotorEffort::new(255, 255), &ws);
        assert_approx_eq!(next.x, 30.0);
        assert_approx_eq!(next.y, 30.0);
    }

    #[test]
    fn test_angle_wraps_both_ways() {
        let ws = workspace();
        let next = integrate(Pose::new(400.0, 300.0, 359.0), MotorEffort::new(0, 255), &ws);
        assert_approx_eq!(next.angle_deg, 2.0, 1e-9);

        let next = integrate(Pose::new(400.0, 300.0, 1.0), MotorEffort::new(255, 0), &ws);
        assert_approx_eq!(next.angle_deg, 358.0, 1e-9);
    }

    #[test]
    fn test_invariants_hold_over_many_ticks() {
        let ws = workspace();
        let efforts = [
            MotorEffort::new(255, 0),
            MotorEffort::new(255, 255),
            MotorEffort::new(100, 255),
            MotorEffort::new(0, 0),
        ];
        let mut pose = Pose::new(400.0, 300.0, 0.0);
        for i in 0..5000 {
            pose = integrate(pose, efforts[(i / 37) % efforts.len()], &ws);
            assert!(pose.x >= 30.0 && pose.x <= 770.0, "x out of range: {}", pose.x);
            assert!(pose.y >= 30.0 && pose.y <= 570.0, "y out of range: {}", pose.y);
            assert!(
                pose.angle_deg >= 0.0 && pose.angle_deg < 360.0,
                "angle out of range: {}",
                pose.angle_deg
            );
        }
    }

    #[test]
    fn test_normalize_angle_edge() {
        assert_eq!(normalize_angle(-1e-20), 0.0);
        assert_approx_eq!(normalize_angle(720.5), 0.5);
        assert_approx_eq!(normalize_angle(-90.0), 270.0);
    }
}
