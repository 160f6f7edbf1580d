use serde::{Deserialize, Serialize};

use nalgebra::Point2;

use crate::ballistics::{BallisticModel, LaunchPower};
use crate::interfaces::{FixedTarget, PlatformState};

/// Mechanical delay between the feed command and projectile release, seconds.
pub const FEED_LATENCY: f64 = 0.100;

/// Iteration bound for the fixed-point solve. The flight-time table varies
/// slowly with distance, so the loop settles well before this in practice.
pub const MAX_ITERATIONS: u32 = 5;

/// Launch-angle convergence threshold (0.0005 degrees).
const CONVERGENCE_EPSILON_DEGREES: f64 = 0.0005;

/// A complete motion-compensated firing solution.
///
/// Replaced wholesale on every recompute; never mutated in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShotSolution {
    /// The point the launcher must aim at, adjusted for platform motion
    /// during the projectile's flight.
    pub virtual_goal: Point2<f64>,
    /// Radians.
    pub launch_angle: f64,
    pub launch_power: LaunchPower,
    /// Platform-to-virtual-goal distance the solution was looked up at,
    /// meters.
    pub distance: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct SolveOutcome {
    pub solution: ShotSolution,
    /// Predicted flight time at the solved distance, seconds.
    pub flight_time: f64,
    pub iterations: u32,
}

/// Solve for the point the launcher must aim at so the projectile arrives at
/// the fixed target despite the platform's own motion during flight.
///
/// Flight time depends on distance and distance on the aim point being solved
/// for; the relationship is smooth enough that a bounded fixed-point
/// iteration settles without a closed-form inverse. Convergence is tested on
/// launch angle as a cheap proxy for the aim point itself; after
/// [`MAX_ITERATIONS`] the last iterate is accepted as-is.
pub fn solve(
    platform: &PlatformState,
    target: &FixedTarget,
    model: &BallisticModel,
) -> SolveOutcome {
    let mut distance = (platform.position - target.position).norm();
    let mut flight_time = model.flight_time(distance);
    let mut launch_angle = model.launch_angle(distance);
    let mut virtual_goal = target.position;

    // The platform keeps moving between the feed command and the actual
    // release, so lead with the velocity it will have at release.
    let lead_velocity = platform.velocity + platform.acceleration * (0.5 * FEED_LATENCY);

    let mut iterations = 0;
    let mut converged = false;
    while iterations < MAX_ITERATIONS {
        iterations += 1;

        virtual_goal = target.position - lead_velocity * flight_time;
        let new_distance = (platform.position - virtual_goal).norm();
        let new_flight_time = model.flight_time(new_distance);
        let new_launch_angle = model.launch_angle(new_distance);

        converged = (new_launch_angle - launch_angle).abs().to_degrees()
            <= CONVERGENCE_EPSILON_DEGREES;

        distance = new_distance;
        flight_time = new_flight_time;
        launch_angle = new_launch_angle;

        if converged {
            break;
        }
    }

    if !converged {
        log::debug!("virtual goal did not settle after {MAX_ITERATIONS} iterations");
    }

    SolveOutcome {
        solution: ShotSolution {
            virtual_goal,
            launch_angle,
            launch_power: model.launch_power(distance),
            distance,
        },
        flight_time,
        iterations,
    }
}
