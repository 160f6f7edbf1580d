use nalgebra::Point2;

use crate::interfaces::{DriveCommand, ManualInput};
use crate::math::{angle_diff, TAU};

/// Closed-loop heading controller with continuous input over the full
/// angular domain; no discontinuity at the ±π boundary.
#[derive(Clone, Debug)]
pub struct TurnController {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    integral: f64,
    previous_error: f64,
}

impl TurnController {
    pub fn new(kp: f64, ki: f64, kd: f64) -> TurnController {
        TurnController {
            kp,
            ki,
            kd,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// Unclamped control effort toward `setpoint`.
    pub fn update(&mut self, measurement: f64, setpoint: f64, dt: f64) -> f64 {
        let error = angle_diff(measurement, setpoint);
        self.integral += error * dt;
        let derivative = (error - self.previous_error) / dt;
        self.previous_error = error;
        self.kp * error + self.ki * self.integral + self.kd * derivative
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }
}

/// Limits the rate of change of a commanded value.
#[derive(Clone, Debug)]
pub struct SlewRateLimiter {
    rate: f64,
    output: f64,
}

impl SlewRateLimiter {
    pub fn new(rate: f64) -> SlewRateLimiter {
        SlewRateLimiter { rate, output: 0.0 }
    }

    pub fn update(&mut self, input: f64, dt: f64) -> f64 {
        let max_step = self.rate * dt;
        self.output += (input - self.output).clamp(-max_step, max_step);
        self.output
    }

    pub fn reset(&mut self, value: f64) {
        self.output = value;
    }
}

/// Produces the per-tick drive command: manual translation with slew limiting
/// and deadbanding, plus closed-loop angular velocity toward the aim bearing.
#[derive(Clone, Debug)]
pub struct AimController {
    turn: TurnController,
    forward_limiter: SlewRateLimiter,
    strafe_limiter: SlewRateLimiter,
    mount_offset: f64,
    max_angular_rate: f64,
    manual_speed_factor: f64,
    deadband: f64,
}

impl AimController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kp: f64,
        ki: f64,
        kd: f64,
        mount_offset: f64,
        max_angular_rate: f64,
        manual_speed_factor: f64,
        max_translational_accel: f64,
        deadband: f64,
    ) -> AimController {
        AimController {
            turn: TurnController::new(kp, ki, kd),
            forward_limiter: SlewRateLimiter::new(max_translational_accel),
            strafe_limiter: SlewRateLimiter::new(max_translational_accel),
            mount_offset,
            max_angular_rate,
            manual_speed_factor,
            deadband,
        }
    }

    /// Bearing setpoint toward `virtual_goal`, offset for the launcher
    /// mounting direction.
    pub fn aim_bearing(&self, position: Point2<f64>, virtual_goal: Point2<f64>) -> f64 {
        let from_goal = position - virtual_goal;
        (from_goal.y.atan2(from_goal.x) + self.mount_offset).rem_euclid(TAU)
    }

    pub fn drive_command(
        &mut self,
        position: Point2<f64>,
        heading: f64,
        virtual_goal: Point2<f64>,
        manual: &ManualInput,
        dt: f64,
    ) -> DriveCommand {
        let scale = manual.max_speed * self.manual_speed_factor;
        let mut forward = self.forward_limiter.update(manual.forward * scale, dt);
        let mut strafe = self.strafe_limiter.update(manual.strafe * scale, dt);

        // A deadbanded axis also zeroes its limiter state; the output must
        // hold at zero, not creep back in.
        if forward.abs() < self.deadband {
            forward = 0.0;
            self.forward_limiter.reset(0.0);
        }
        if strafe.abs() < self.deadband {
            strafe = 0.0;
            self.strafe_limiter.reset(0.0);
        }

        let bearing = self.aim_bearing(position, virtual_goal);
        let effort = self.turn.update(heading, bearing, dt).clamp(-1.0, 1.0);

        DriveCommand {
            forward,
            strafe,
            angular: effort * self.max_angular_rate,
            field_relative: true,
            open_loop: true,
        }
    }

    pub fn reset(&mut self) {
        self.turn.reset();
        self.forward_limiter.reset(0.0);
        self.strafe_limiter.reset(0.0);
    }
}
