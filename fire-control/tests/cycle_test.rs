use nalgebra::{point, vector, Point2, Vector2};
use sotm_fire_control::ballistics::{BallisticModel, LaunchPower};
use sotm_fire_control::cycle::{Collaborators, CycleConfig, FiringCycle};
use sotm_fire_control::interfaces::{
    DriveActuator, DriveCommand, FeedActuator, FixedTarget, GoalVisualizer, LauncherActuator,
    Localization, ManualInput, PlatformSample, TargetGeometry, TelemetryFrame, TelemetrySink,
};
use sotm_fire_control::readiness::ToleranceMaps;
use test_log::test;

struct FakeLocalization {
    position: Point2<f64>,
    heading: f64,
    velocity: Vector2<f64>,
    vision_suppressed: bool,
}

impl Localization for FakeLocalization {
    fn sample(&mut self) -> PlatformSample {
        PlatformSample {
            position: self.position,
            heading: self.heading,
            velocity: self.velocity,
        }
    }

    fn set_vision_suppressed(&mut self, suppressed: bool) {
        self.vision_suppressed = suppressed;
    }
}

#[derive(Default)]
struct FakeDrive {
    last: Option<DriveCommand>,
}

impl DriveActuator for FakeDrive {
    fn drive(&mut self, command: DriveCommand) {
        self.last = Some(command);
    }
}

struct FakeLauncher {
    commanded_angle: Option<f64>,
    commanded_power: Option<LaunchPower>,
    /// When set, the measured angle snaps to the command instantly.
    tracks_command: bool,
    measured_angle: f64,
    at_setpoint: bool,
    stopped: bool,
}

impl FakeLauncher {
    fn tracking() -> FakeLauncher {
        FakeLauncher {
            commanded_angle: None,
            commanded_power: None,
            tracks_command: true,
            measured_angle: 0.0,
            at_setpoint: true,
            stopped: false,
        }
    }
}

impl LauncherActuator for FakeLauncher {
    fn set_target(&mut self, angle: f64, power: LaunchPower) {
        self.commanded_angle = Some(angle);
        self.commanded_power = Some(power);
        if self.tracks_command {
            self.measured_angle = angle;
        }
        self.stopped = false;
    }

    fn current_angle(&self) -> f64 {
        self.measured_angle
    }

    fn at_setpoint(&self) -> bool {
        self.at_setpoint
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[derive(Default)]
struct FakeFeed {
    fire_count: u32,
    stopped: bool,
}

impl FeedActuator for FakeFeed {
    fn fire(&mut self) {
        self.fire_count += 1;
        self.stopped = false;
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[derive(Default)]
struct RecordingTelemetry {
    frames: Vec<TelemetryFrame>,
}

impl TelemetrySink for RecordingTelemetry {
    fn publish(&mut self, frame: &TelemetryFrame) {
        self.frames.push(*frame);
    }
}

#[derive(Default)]
struct FakeVisualizer {
    marker: Option<Point2<f64>>,
    updates: u32,
}

impl GoalVisualizer for FakeVisualizer {
    fn show_goal(&mut self, goal: Point2<f64>) {
        self.marker = Some(goal);
        self.updates += 1;
    }

    fn clear(&mut self) {
        self.marker = None;
    }
}

struct FakeGeometry {
    target: FixedTarget,
}

impl TargetGeometry for FakeGeometry {
    fn fixed_target(&self) -> FixedTarget {
        self.target
    }
}

struct Rig {
    cycle: FiringCycle,
    geometry: FakeGeometry,
    localization: FakeLocalization,
    drive: FakeDrive,
    launcher: FakeLauncher,
    feed: FakeFeed,
    telemetry: RecordingTelemetry,
    visualizer: FakeVisualizer,
    manual: ManualInput,
}

impl Rig {
    fn new() -> Rig {
        Rig {
            cycle: FiringCycle::new(
                CycleConfig::default(),
                BallisticModel::standard(),
                ToleranceMaps::standard(),
            ),
            geometry: FakeGeometry {
                target: FixedTarget {
                    position: point![4.0, 0.0],
                    opening_width: 1.05,
                },
            },
            localization: FakeLocalization {
                position: point![0.0, 0.0],
                heading: 0.0,
                velocity: vector![0.0, 0.0],
                vision_suppressed: false,
            },
            drive: FakeDrive::default(),
            launcher: FakeLauncher::tracking(),
            feed: FakeFeed::default(),
            telemetry: RecordingTelemetry::default(),
            visualizer: FakeVisualizer::default(),
            manual: ManualInput::default(),
        }
    }

    fn start(&mut self) {
        let mut io = Collaborators {
            localization: &mut self.localization,
            drive: &mut self.drive,
            launcher: &mut self.launcher,
            feed: &mut self.feed,
            telemetry: &mut self.telemetry,
            visualizer: Some(&mut self.visualizer),
        };
        self.cycle.start(&self.geometry, &mut io);
    }

    fn tick(&mut self) {
        let manual = self.manual;
        let mut io = Collaborators {
            localization: &mut self.localization,
            drive: &mut self.drive,
            launcher: &mut self.launcher,
            feed: &mut self.feed,
            telemetry: &mut self.telemetry,
            visualizer: Some(&mut self.visualizer),
        };
        self.cycle.tick(&manual, &mut io);
    }

    fn stop(&mut self, interrupted: bool) {
        let mut io = Collaborators {
            localization: &mut self.localization,
            drive: &mut self.drive,
            launcher: &mut self.launcher,
            feed: &mut self.feed,
            telemetry: &mut self.telemetry,
            visualizer: Some(&mut self.visualizer),
        };
        self.cycle.stop(interrupted, &mut io);
    }
}

#[test]
fn test_stationary_shot_fires_and_restarts() {
    let mut rig = Rig::new();
    rig.start();
    rig.tick();

    // One tick after start the launcher carries the 4 m calibration.
    let angle = rig.launcher.commanded_angle.unwrap();
    assert!((angle - 40.0_f64.to_radians()).abs() < 1e-9);

    // Stationary platform: the boundary condition triggers immediately, all
    // readiness checks hold, so the feed fires and the cycle restarts.
    assert_eq!(rig.feed.fire_count, 1);
    assert!(rig.cycle.recompute_pending());

    let solution = *rig.cycle.solution().unwrap();
    assert_eq!(solution.virtual_goal, point![4.0, 0.0]);
    assert!((solution.distance - 4.0).abs() < 1e-9);
}

#[test]
fn test_failed_readiness_still_restarts_cycle() {
    let mut rig = Rig::new();
    rig.launcher.at_setpoint = false;
    rig.start();
    rig.tick();

    // No shot, but the boundary still abandons the aim point and re-solves.
    assert_eq!(rig.feed.fire_count, 0);
    assert!(rig.cycle.recompute_pending());
    assert!(rig.launcher.commanded_angle.is_some());
}

#[test]
fn test_low_speed_boundary_triggers_early() {
    let mut rig = Rig::new();
    rig.localization.velocity = vector![0.5, 0.0];
    rig.start();

    for _ in 0..3 {
        rig.tick();
    }
    // Moving and well before the predicted flight time: no boundary yet.
    assert_eq!(rig.feed.fire_count, 0);
    assert!(!rig.cycle.recompute_pending());

    // Dropping below the hold-still threshold fires on that very tick.
    rig.localization.velocity = vector![0.05, 0.0];
    rig.tick();
    assert_eq!(rig.feed.fire_count, 1);
    assert!(rig.cycle.recompute_pending());
}

#[test]
fn test_elapsed_flight_time_boundary() {
    let mut rig = Rig::new();
    rig.localization.velocity = vector![0.5, 0.0];
    // Keep the gate closed so each boundary re-solves without firing.
    rig.launcher.at_setpoint = false;
    rig.start();

    rig.tick();
    let first_updates = rig.visualizer.updates;
    assert_eq!(first_updates, 1);

    // Flight time at ~3.5 m is well under a second; within 50 ticks the shot
    // clock must cross it and force a new solve.
    let mut resolved = false;
    for _ in 0..50 {
        rig.tick();
        if rig.visualizer.updates > first_updates {
            resolved = true;
            break;
        }
    }
    assert!(resolved);
    assert_eq!(rig.feed.fire_count, 0);
}

#[test]
fn test_moving_solution_leads_target() {
    let mut rig = Rig::new();
    rig.localization.velocity = vector![1.5, 0.0];
    rig.start();
    rig.tick();

    let solution = rig.cycle.solution().unwrap();
    assert!(solution.virtual_goal.x < 4.0);
    assert_eq!(rig.visualizer.marker, Some(solution.virtual_goal));
}

#[test]
fn test_drive_command_issued_every_tick() {
    let mut rig = Rig::new();
    rig.localization.velocity = vector![0.5, 0.0];
    rig.start();
    rig.tick();

    let command = rig.drive.last.unwrap();
    assert!(command.field_relative);
    assert!(command.open_loop);
    // Aligned with the aim bearing and no manual input: nothing to do.
    assert!(command.angular.abs() < 1e-9);
    assert!(command.forward.abs() < 1e-9);
    assert!(command.strafe.abs() < 1e-9);
}

#[test]
fn test_manual_translation_is_scaled_and_limited() {
    let mut rig = Rig::new();
    rig.localization.velocity = vector![0.5, 0.0];
    rig.manual = ManualInput {
        forward: 1.0,
        strafe: 0.0,
        max_speed: 4.0,
    };
    rig.start();
    rig.tick();

    let first = rig.drive.last.unwrap().forward;
    // Slew-limited first step, not the full half-scale command.
    assert!(first > 0.0);
    assert!(first < 2.0);

    for _ in 0..60 {
        rig.tick();
    }
    let settled = rig.drive.last.unwrap().forward;
    assert!((settled - 2.0).abs() < 1e-9);
}

#[test]
fn test_telemetry_published_every_tick() {
    let mut rig = Rig::new();
    rig.localization.velocity = vector![0.5, 0.0];
    rig.start();
    for _ in 0..5 {
        rig.tick();
    }

    assert_eq!(rig.telemetry.frames.len(), 5);
    let frame = rig.telemetry.frames.last().unwrap();
    assert!(frame.facing);
    assert!(frame.heading_within_tolerance);
    assert!(frame.solver_iterations >= 1);
}

#[test]
fn test_vision_suppressed_while_active() {
    let mut rig = Rig::new();
    rig.start();
    assert!(rig.localization.vision_suppressed);

    rig.tick();
    assert!(rig.localization.vision_suppressed);

    rig.stop(false);
    assert!(!rig.localization.vision_suppressed);
}

#[test]
fn test_stop_is_idempotent() {
    let mut rig = Rig::new();

    // Without a prior start.
    rig.stop(false);
    assert!(rig.feed.stopped);
    assert!(rig.launcher.stopped);
    assert_eq!(rig.feed.fire_count, 0);

    // And again, interrupted this time.
    rig.stop(true);
    assert!(rig.feed.stopped);
    assert!(rig.launcher.stopped);
    assert_eq!(rig.feed.fire_count, 0);
    assert!(!rig.localization.vision_suppressed);
    assert!(rig.cycle.solution().is_none());
}

#[test]
fn test_stop_clears_marker_and_state() {
    let mut rig = Rig::new();
    rig.start();
    rig.tick();
    assert!(rig.visualizer.marker.is_some());

    rig.stop(true);
    assert!(rig.visualizer.marker.is_none());
    assert!(rig.cycle.solution().is_none());
    assert!(!rig.cycle.recompute_pending());

    // Ticking after stop is inert.
    let frames = rig.telemetry.frames.len();
    rig.tick();
    assert_eq!(rig.telemetry.frames.len(), frames);
}

#[test]
fn test_tick_before_start_is_inert() {
    let mut rig = Rig::new();
    rig.tick();

    assert!(rig.drive.last.is_none());
    assert!(rig.launcher.commanded_angle.is_none());
    assert!(rig.telemetry.frames.is_empty());
    assert_eq!(rig.feed.fire_count, 0);
}
