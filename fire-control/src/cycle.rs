use crate::acceleration::AccelerationEstimator;
use crate::aim::AimController;
use crate::ballistics::BallisticModel;
use crate::interfaces::{
    DriveActuator, FeedActuator, FixedTarget, GoalVisualizer, LauncherActuator, Localization,
    ManualInput, PlatformState, TargetGeometry, TelemetryFrame, TelemetrySink,
};
use crate::math::{angle_diff, PI};
use crate::readiness::{self, ToleranceMaps};
use crate::solver::{self, ShotSolution};

/// Control loop period; the caller is expected to tick at this rate.
pub const CONTROL_TICK_LENGTH: f64 = 1.0 / 50.0;

/// Fixed tuning for a firing cycle instance.
#[derive(Clone, Debug)]
pub struct CycleConfig {
    /// Seconds between ticks.
    pub period: f64,
    /// Heading controller gains.
    pub turn_kp: f64,
    pub turn_ki: f64,
    pub turn_kd: f64,
    /// Angular command full scale, rad/s.
    pub max_angular_rate: f64,
    /// Launcher mounting direction relative to the platform forward axis.
    pub mount_offset: f64,
    /// Manual translation is scaled down while aiming.
    pub manual_speed_factor: f64,
    /// Slew limit for manual translation, m/s².
    pub max_translational_accel: f64,
    /// Translation commands below this are zeroed, m/s.
    pub drive_deadband: f64,
    /// Below this linear speed the platform counts as holding still and the
    /// cycle boundary triggers immediately, m/s.
    pub min_moving_speed: f64,
}

impl Default for CycleConfig {
    fn default() -> CycleConfig {
        CycleConfig {
            period: CONTROL_TICK_LENGTH,
            turn_kp: 0.8,
            turn_ki: 0.0,
            turn_kd: 0.01,
            max_angular_rate: PI,
            mount_offset: PI,
            manual_speed_factor: 0.5,
            max_translational_accel: 8.0,
            drive_deadband: 0.0127,
            min_moving_speed: 0.0762,
        }
    }
}

/// Rolling state owned exclusively by the cycle; zeroed on start and stop.
#[derive(Clone, Debug)]
struct CycleState {
    recompute: bool,
    /// Seconds since the current solution was computed.
    shot_clock: f64,
    /// One-shot feed latch; set at most once per solve-to-solve cycle and
    /// cleared only when the cycle resets.
    fired: bool,
    accel: AccelerationEstimator,
    aim: AimController,
}

impl CycleState {
    fn new(config: &CycleConfig) -> CycleState {
        CycleState {
            recompute: false,
            shot_clock: 0.0,
            fired: false,
            accel: AccelerationEstimator::default(),
            aim: AimController::new(
                config.turn_kp,
                config.turn_ki,
                config.turn_kd,
                config.mount_offset,
                config.max_angular_rate,
                config.manual_speed_factor,
                config.max_translational_accel,
                config.drive_deadband,
            ),
        }
    }
}

/// The collaborators a cycle drives each tick. Held by the caller; borrowed
/// exclusively for the duration of each call.
pub struct Collaborators<'a> {
    pub localization: &'a mut dyn Localization,
    pub drive: &'a mut dyn DriveActuator,
    pub launcher: &'a mut dyn LauncherActuator,
    pub feed: &'a mut dyn FeedActuator,
    pub telemetry: &'a mut dyn TelemetrySink,
    pub visualizer: Option<&'a mut dyn GoalVisualizer>,
}

/// Sequences solve → track → fire → re-solve at the control loop rate.
///
/// Two logical states: tracking the current [`ShotSolution`] with the shot
/// clock running, and a one-tick solving pulse that replaces the solution and
/// restarts the clock. The module never terminates on its own; the caller
/// owns `start`/`stop`.
pub struct FiringCycle {
    config: CycleConfig,
    model: BallisticModel,
    tolerances: ToleranceMaps,
    target: Option<FixedTarget>,
    solution: Option<ShotSolution>,
    flight_time: f64,
    last_iterations: u32,
    state: CycleState,
}

impl FiringCycle {
    pub fn new(config: CycleConfig, model: BallisticModel, tolerances: ToleranceMaps) -> FiringCycle {
        let state = CycleState::new(&config);
        FiringCycle {
            config,
            model,
            tolerances,
            target: None,
            solution: None,
            flight_time: 0.0,
            last_iterations: 0,
            state,
        }
    }

    /// Begin a cycle: capture the fixed target, zero all rolling state, and
    /// force a solve on the first tick. The secondary vision correction is
    /// suppressed until `stop` so it cannot fight the aim loop.
    pub fn start(&mut self, geometry: &dyn TargetGeometry, io: &mut Collaborators) {
        let target = geometry.fixed_target();
        log::debug!(
            "cycle start: target at ({:.2}, {:.2})",
            target.position.x,
            target.position.y
        );
        self.target = Some(target);
        self.solution = None;
        self.flight_time = 0.0;
        self.last_iterations = 0;

        let sample = io.localization.sample();
        self.state.accel.reset(sample.velocity);
        self.state.aim.reset();
        self.state.shot_clock = 0.0;
        self.state.fired = false;
        self.state.recompute = true;

        io.localization.set_vision_suppressed(true);
    }

    pub fn tick(&mut self, manual: &ManualInput, io: &mut Collaborators) {
        let Some(target) = self.target else {
            return;
        };

        let dt = self.config.period;
        let sample = io.localization.sample();
        self.state.shot_clock += dt;
        let acceleration = self.state.accel.update(sample.velocity, dt);
        let platform = PlatformState {
            position: sample.position,
            heading: sample.heading,
            velocity: sample.velocity,
            acceleration,
        };

        if self.state.recompute {
            let outcome = solver::solve(&platform, &target, &self.model);
            self.solution = Some(outcome.solution);
            self.flight_time = outcome.flight_time;
            self.last_iterations = outcome.iterations;
            self.state.shot_clock = 0.0;
            self.state.fired = false;
            self.state.recompute = false;
            if let Some(visualizer) = io.visualizer.as_mut() {
                visualizer.show_goal(outcome.solution.virtual_goal);
            }
            log::debug!(
                "solved: distance {:.2} m, flight {:.2} s, {} iterations",
                outcome.solution.distance,
                outcome.flight_time,
                outcome.iterations
            );
        }
        let Some(solution) = self.solution else {
            return;
        };

        io.launcher
            .set_target(solution.launch_angle, solution.launch_power);

        let command = self.state.aim.drive_command(
            platform.position,
            platform.heading,
            solution.virtual_goal,
            manual,
            dt,
        );
        io.drive.drive(command);

        let ready = readiness::evaluate(
            &self.tolerances,
            &platform,
            &solution,
            &target,
            io.launcher.current_angle(),
            io.launcher.at_setpoint(),
        );

        let speed = platform.velocity.norm();
        if self.state.shot_clock >= self.flight_time || speed < self.config.min_moving_speed {
            if ready.clear_to_fire() && !self.state.fired {
                io.feed.fire();
                self.state.fired = true;
                log::debug!("fired at {:.2} m", solution.distance);
            }
            // The boundary always restarts the cycle, fired or not: abandon
            // the current aim point and solve fresh on the next tick.
            self.state.recompute = true;
            self.state.shot_clock = 0.0;
        }

        let bearing = self
            .state
            .aim
            .aim_bearing(platform.position, solution.virtual_goal);
        let heading_error = angle_diff(platform.heading, bearing);
        io.telemetry.publish(&TelemetryFrame {
            acceleration,
            solver_iterations: self.last_iterations,
            commanded_launch_angle: solution.launch_angle,
            heading_error,
            heading_within_tolerance: heading_error.abs()
                <= self.tolerances.heading_tolerance(solution.distance),
            facing: ready.facing,
        });
    }

    /// Release the actuators and rolling state. Safe to call twice, or
    /// without a prior `start`.
    pub fn stop(&mut self, interrupted: bool, io: &mut Collaborators) {
        if interrupted {
            log::debug!("cycle interrupted");
        }
        io.feed.stop();
        io.launcher.stop();

        self.state.aim.reset();
        self.state.shot_clock = 0.0;
        self.state.fired = false;
        self.state.recompute = false;
        self.target = None;
        self.solution = None;

        if let Some(visualizer) = io.visualizer.as_mut() {
            visualizer.clear();
        }
        io.localization.set_vision_suppressed(false);
    }

    /// The solution currently being tracked, if one has been computed.
    pub fn solution(&self) -> Option<&ShotSolution> {
        self.solution.as_ref()
    }

    /// True when the next tick will recompute the solution.
    pub fn recompute_pending(&self) -> bool {
        self.state.recompute
    }
}
