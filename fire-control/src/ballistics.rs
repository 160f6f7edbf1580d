use serde::{Deserialize, Serialize};

use crate::interp::{CalibrationError, Table};

/// Launcher roller power setpoints for one shot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchPower {
    pub upper_rpm: f64,
    pub lower_rpm: f64,
}

/// Static calibration mapping target distance to launch parameters.
///
/// Stateless after construction: lookups clamp outside the calibrated domain
/// and have no failure modes.
#[derive(Clone, Debug)]
pub struct BallisticModel {
    flight_time: Table,
    launch_angle: Table,
    upper_power: Table,
    lower_power: Table,
}

impl BallisticModel {
    pub fn new(
        flight_time: &[(f64, f64)],
        launch_angle: &[(f64, f64)],
        upper_power: &[(f64, f64)],
        lower_power: &[(f64, f64)],
    ) -> Result<BallisticModel, CalibrationError> {
        Ok(BallisticModel {
            flight_time: Table::new(flight_time)?,
            launch_angle: Table::new(launch_angle)?,
            upper_power: Table::new(upper_power)?,
            lower_power: Table::new(lower_power)?,
        })
    }

    /// Calibration measured on the practice field. Distances in meters,
    /// flight times in seconds, angles in radians, power in rpm.
    pub fn standard() -> BallisticModel {
        BallisticModel {
            flight_time: Table::new(&[
                (1.36, 0.48),
                (2.0, 0.58),
                (3.0, 0.72),
                (4.0, 0.90),
                (5.0, 1.05),
            ])
            .unwrap(),
            launch_angle: Table::new(&[
                (1.36, 58.0_f64.to_radians()),
                (2.0, 51.0_f64.to_radians()),
                (3.0, 44.5_f64.to_radians()),
                (4.0, 40.0_f64.to_radians()),
                (5.0, 37.5_f64.to_radians()),
            ])
            .unwrap(),
            upper_power: Table::new(&[
                (1.36, 3200.0),
                (2.5, 3600.0),
                (4.0, 4200.0),
                (5.0, 4600.0),
            ])
            .unwrap(),
            lower_power: Table::new(&[
                (1.36, 3200.0),
                (2.5, 3400.0),
                (4.0, 3900.0),
                (5.0, 4300.0),
            ])
            .unwrap(),
        }
    }

    /// Predicted time from launch release to arrival, seconds.
    pub fn flight_time(&self, distance: f64) -> f64 {
        self.flight_time.get(distance)
    }

    /// Launch angle setpoint, radians.
    pub fn launch_angle(&self, distance: f64) -> f64 {
        self.launch_angle.get(distance)
    }

    pub fn launch_power(&self, distance: f64) -> LaunchPower {
        LaunchPower {
            upper_rpm: self.upper_power.get(distance),
            lower_rpm: self.lower_power.get(distance),
        }
    }
}
