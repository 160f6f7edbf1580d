//! Seams to the platform collaborators.
//!
//! The fire control core owns no hardware. Each tick it reads localization
//! and writes drive, launcher, and feed commands through these traits; the
//! caller holds exclusive ownership of the actuators while a cycle is active
//! and passes them in per call.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::ballistics::LaunchPower;

/// Pose and field-relative velocity for one control tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSample {
    pub position: Point2<f64>,
    /// Radians, field frame.
    pub heading: f64,
    /// Meters per second, field frame.
    pub velocity: Vector2<f64>,
}

/// [`PlatformSample`] with the filtered acceleration estimate attached.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformState {
    pub position: Point2<f64>,
    pub heading: f64,
    pub velocity: Vector2<f64>,
    pub acceleration: Vector2<f64>,
}

/// World-frame target point and opening width, fixed for one activation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedTarget {
    pub position: Point2<f64>,
    /// Width of the opening the projectile must pass through, meters.
    pub opening_width: f64,
}

/// Operator translation request, normalized to [-1, 1] per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManualInput {
    pub forward: f64,
    pub strafe: f64,
    /// Full-scale translational speed, m/s.
    pub max_speed: f64,
}

/// Field-relative drive command issued every tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    /// m/s along the field +x axis.
    pub forward: f64,
    /// m/s along the field +y axis.
    pub strafe: f64,
    /// rad/s, counter-clockwise positive.
    pub angular: f64,
    pub field_relative: bool,
    pub open_loop: bool,
}

/// Best-effort per-tick publication. Sinks must swallow their own failures;
/// nothing here may affect the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub acceleration: Vector2<f64>,
    pub solver_iterations: u32,
    pub commanded_launch_angle: f64,
    pub heading_error: f64,
    pub heading_within_tolerance: bool,
    pub facing: bool,
}

/// Supplies the platform pose and velocity each tick.
pub trait Localization {
    fn sample(&mut self) -> PlatformSample;

    /// Suppress the secondary vision-based pose correction while a cycle is
    /// aiming, to avoid fighting it.
    fn set_vision_suppressed(&mut self, suppressed: bool);
}

/// Resolves the fixed target for the current context. Queried once at cycle
/// start.
pub trait TargetGeometry {
    fn fixed_target(&self) -> FixedTarget;
}

pub trait DriveActuator {
    fn drive(&mut self, command: DriveCommand);
}

pub trait LauncherActuator {
    /// Command the launch angle (radians) and roller power for this tick.
    fn set_target(&mut self, angle: f64, power: LaunchPower);

    /// Measured launch angle, radians.
    fn current_angle(&self) -> f64;

    /// True when the roller power has settled at its setpoint.
    fn at_setpoint(&self) -> bool;

    fn stop(&mut self);
}

pub trait FeedActuator {
    /// One-shot: push a projectile into the launcher.
    fn fire(&mut self);

    fn stop(&mut self);
}

pub trait TelemetrySink {
    fn publish(&mut self, frame: &TelemetryFrame);
}

/// Cosmetic marker output; not part of the control contract.
pub trait GoalVisualizer {
    fn show_goal(&mut self, goal: Point2<f64>);
    fn clear(&mut self);
}
