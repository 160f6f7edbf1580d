use nalgebra::{point, vector, Point2, Vector2};
use rand::Rng;
use sotm_fire_control::ballistics::{BallisticModel, LaunchPower};
use sotm_fire_control::cycle::{Collaborators, CycleConfig, FiringCycle, CONTROL_TICK_LENGTH};
use sotm_fire_control::interfaces::{
    DriveActuator, DriveCommand, FeedActuator, FixedTarget, GoalVisualizer, LauncherActuator,
    Localization, ManualInput, PlatformSample, TargetGeometry, TelemetryFrame, TelemetrySink,
};
use sotm_fire_control::readiness::ToleranceMaps;

struct SimLocalization {
    position: Point2<f64>,
    heading: f64,
    velocity: Vector2<f64>,
    noise: f64,
}

impl Localization for SimLocalization {
    fn sample(&mut self) -> PlatformSample {
        let mut rng = rand::thread_rng();
        let jitter = vector![
            rng.gen_range(-self.noise..=self.noise),
            rng.gen_range(-self.noise..=self.noise)
        ];
        PlatformSample {
            position: self.position,
            heading: self.heading,
            velocity: self.velocity + jitter,
        }
    }

    fn set_vision_suppressed(&mut self, suppressed: bool) {
        log::info!("vision correction suppressed: {suppressed}");
    }
}

#[derive(Default)]
struct SimDrive {
    last: Option<DriveCommand>,
}

impl DriveActuator for SimDrive {
    fn drive(&mut self, command: DriveCommand) {
        self.last = Some(command);
    }
}

/// First-order launcher: the angle closes on its command each tick and the
/// rollers report at-setpoint once the power command has held steady.
struct SimLauncher {
    measured_angle: f64,
    commanded_angle: f64,
    commanded_power: Option<LaunchPower>,
    steady_ticks: u32,
}

impl SimLauncher {
    fn new() -> SimLauncher {
        SimLauncher {
            measured_angle: 0.0,
            commanded_angle: 0.0,
            commanded_power: None,
            steady_ticks: 0,
        }
    }
}

impl LauncherActuator for SimLauncher {
    fn set_target(&mut self, angle: f64, power: LaunchPower) {
        self.commanded_angle = angle;
        let steady = self.commanded_power == Some(power);
        self.commanded_power = Some(power);
        self.steady_ticks = if steady { self.steady_ticks + 1 } else { 0 };
        self.measured_angle += (self.commanded_angle - self.measured_angle) * 0.35;
    }

    fn current_angle(&self) -> f64 {
        self.measured_angle
    }

    fn at_setpoint(&self) -> bool {
        self.steady_ticks >= 10
    }

    fn stop(&mut self) {
        self.commanded_power = None;
        self.steady_ticks = 0;
    }
}

#[derive(Default)]
struct SimFeed {
    shots: u32,
}

impl FeedActuator for SimFeed {
    fn fire(&mut self) {
        self.shots += 1;
        log::info!("feed fired (shot {})", self.shots);
    }

    fn stop(&mut self) {}
}

struct JsonTelemetry;

impl TelemetrySink for JsonTelemetry {
    fn publish(&mut self, frame: &TelemetryFrame) {
        if let Ok(line) = serde_json::to_string(frame) {
            println!("{line}");
        }
    }
}

#[derive(Default)]
struct LogVisualizer;

impl GoalVisualizer for LogVisualizer {
    fn show_goal(&mut self, goal: Point2<f64>) {
        log::debug!("virtual goal at ({:.2}, {:.2})", goal.x, goal.y);
    }

    fn clear(&mut self) {
        log::debug!("virtual goal cleared");
    }
}

struct FieldGeometry {
    target: FixedTarget,
}

impl TargetGeometry for FieldGeometry {
    fn fixed_target(&self) -> FixedTarget {
        self.target
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace=info"))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let ticks: u32 = args
        .get(1)
        .map(|s| s.parse().expect("TICKS must be an integer"))
        .unwrap_or(250);
    let strafe_speed: f64 = args
        .get(2)
        .map(|s| s.parse().expect("SPEED must be a number"))
        .unwrap_or(1.0);

    let mut cycle = FiringCycle::new(
        CycleConfig::default(),
        BallisticModel::standard(),
        ToleranceMaps::standard(),
    );
    let geometry = FieldGeometry {
        target: FixedTarget {
            position: point![4.0, 0.0],
            opening_width: 1.05,
        },
    };
    let mut localization = SimLocalization {
        position: point![0.0, -1.5],
        heading: 0.0,
        velocity: vector![0.0, strafe_speed],
        noise: 0.02,
    };
    let mut drive = SimDrive::default();
    let mut launcher = SimLauncher::new();
    let mut feed = SimFeed::default();
    let mut telemetry = JsonTelemetry;
    let mut visualizer = LogVisualizer;

    log::info!("tracing {ticks} ticks, strafe {strafe_speed} m/s");

    cycle.start(
        &geometry,
        &mut Collaborators {
            localization: &mut localization,
            drive: &mut drive,
            launcher: &mut launcher,
            feed: &mut feed,
            telemetry: &mut telemetry,
            visualizer: Some(&mut visualizer),
        },
    );

    let manual = ManualInput::default();
    for tick in 0..ticks {
        cycle.tick(
            &manual,
            &mut Collaborators {
                localization: &mut localization,
                drive: &mut drive,
                launcher: &mut launcher,
                feed: &mut feed,
                telemetry: &mut telemetry,
                visualizer: Some(&mut visualizer),
            },
        );

        // Scripted trajectory: strafe past the target, then coast to a stop
        // over the last stretch so the hold-still boundary shows up too.
        if tick > ticks * 3 / 5 {
            localization.velocity *= 0.9;
        }
        localization.position += localization.velocity * CONTROL_TICK_LENGTH;
        if let Some(command) = drive.last {
            localization.heading += command.angular * CONTROL_TICK_LENGTH;
        }
    }

    cycle.stop(
        false,
        &mut Collaborators {
            localization: &mut localization,
            drive: &mut drive,
            launcher: &mut launcher,
            feed: &mut feed,
            telemetry: &mut telemetry,
            visualizer: Some(&mut visualizer),
        },
    );

    log::info!("done: {} shots over {ticks} ticks", feed.shots);
}
