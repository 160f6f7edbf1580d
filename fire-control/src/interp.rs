use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("calibration table is empty")]
    Empty,
    #[error("calibration keys must be strictly increasing (key {0} out of order)")]
    KeyOrder(f64),
}

/// Piecewise-linear interpolation over fixed calibration knots.
///
/// Lookups outside the calibrated domain clamp to the boundary value; there
/// is no extrapolation.
#[derive(Clone, Debug)]
pub struct Table {
    knots: Vec<(f64, f64)>,
}

impl Table {
    pub fn new(knots: &[(f64, f64)]) -> Result<Table, CalibrationError> {
        if knots.is_empty() {
            return Err(CalibrationError::Empty);
        }
        for pair in knots.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(CalibrationError::KeyOrder(pair[1].0));
            }
        }
        Ok(Table {
            knots: knots.to_vec(),
        })
    }

    pub fn get(&self, key: f64) -> f64 {
        let (first_key, first_value) = self.knots[0];
        if key <= first_key {
            return first_value;
        }
        for pair in self.knots.windows(2) {
            let (k0, v0) = pair[0];
            let (k1, v1) = pair[1];
            if key <= k1 {
                return v0 + (key - k0) / (k1 - k0) * (v1 - v0);
            }
        }
        self.knots[self.knots.len() - 1].1
    }
}
