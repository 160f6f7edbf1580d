use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::interfaces::{FixedTarget, PlatformState};
use crate::interp::{CalibrationError, Table};
use crate::solver::ShotSolution;

/// Distance-scaled alignment tolerances. Both maps tighten (decrease) as
/// range increases and clamp outside the calibrated domain.
#[derive(Clone, Debug)]
pub struct ToleranceMaps {
    heading: Table,
    launch_angle: Table,
}

impl ToleranceMaps {
    pub fn new(
        heading: &[(f64, f64)],
        launch_angle: &[(f64, f64)],
    ) -> Result<ToleranceMaps, CalibrationError> {
        Ok(ToleranceMaps {
            heading: Table::new(heading)?,
            launch_angle: Table::new(launch_angle)?,
        })
    }

    /// Tolerances measured alongside the standard ballistic calibration.
    /// Distances in meters, tolerances in radians.
    pub fn standard() -> ToleranceMaps {
        ToleranceMaps {
            heading: Table::new(&[
                (1.36, 30.0353_f64.to_radians()),
                (1.88, 25.0_f64.to_radians()),
                (3.0, 15.0_f64.to_radians()),
                (4.6, 10.0_f64.to_radians()),
            ])
            .unwrap(),
            launch_angle: Table::new(&[
                (1.36, 1.5_f64.to_radians()),
                (1.8, 0.8_f64.to_radians()),
                (3.53, 0.6_f64.to_radians()),
            ])
            .unwrap(),
        }
    }

    pub fn heading_tolerance(&self, distance: f64) -> f64 {
        self.heading.get(distance)
    }

    pub fn launch_angle_tolerance(&self, distance: f64) -> f64 {
        self.launch_angle.get(distance)
    }
}

/// Per-tick firing-gate verdict. All three checks must hold to feed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    pub facing: bool,
    pub launch_angle_aligned: bool,
    pub power_at_setpoint: bool,
}

impl Readiness {
    pub fn clear_to_fire(&self) -> bool {
        self.facing && self.launch_angle_aligned && self.power_at_setpoint
    }
}

/// Whether the platform heading, projected across the field as a line
/// `y = tan(heading)·x + b`, passes through the opening window centered on
/// the fixed target.
///
/// Degenerate geometry (heading perpendicular to the forward axis, slope
/// non-finite) is conservatively not facing.
pub fn facing_opening(position: Point2<f64>, heading: f64, target: &FixedTarget) -> bool {
    if heading.cos() == 0.0 {
        return false;
    }
    let slope = heading.tan();
    if !slope.is_finite() {
        return false;
    }

    let intercept = position.y - slope * position.x;
    let y_at_target = slope * target.position.x + intercept;

    let upper = target.position.y + target.opening_width / 2.0;
    let lower = target.position.y - target.opening_width / 2.0;
    y_at_target >= lower && y_at_target <= upper
}

pub fn evaluate(
    maps: &ToleranceMaps,
    platform: &PlatformState,
    solution: &ShotSolution,
    target: &FixedTarget,
    measured_launch_angle: f64,
    power_at_setpoint: bool,
) -> Readiness {
    let angle_error = solution.launch_angle - measured_launch_angle;
    Readiness {
        facing: facing_opening(platform.position, platform.heading, target),
        launch_angle_aligned: angle_error.abs() <= maps.launch_angle_tolerance(solution.distance),
        power_at_setpoint,
    }
}
