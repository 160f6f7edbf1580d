use nalgebra::{vector, Vector2};

/// Fixed-window moving average with zero-initialized history.
#[derive(Clone, Debug, Default)]
pub struct MovingAverage {
    window: [f64; 2],
    next: usize,
}

impl MovingAverage {
    pub fn update(&mut self, sample: f64) -> f64 {
        self.window[self.next] = sample;
        self.next = (self.next + 1) % self.window.len();
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn reset(&mut self) {
        self.window = [0.0; 2];
        self.next = 0;
    }
}

/// Derives filtered field-relative acceleration from consecutive velocity
/// samples.
#[derive(Clone, Debug, Default)]
pub struct AccelerationEstimator {
    previous_velocity: Vector2<f64>,
    filter_x: MovingAverage,
    filter_y: MovingAverage,
}

impl AccelerationEstimator {
    /// Seed the previous-velocity sample and clear the filter history.
    pub fn reset(&mut self, velocity: Vector2<f64>) {
        self.previous_velocity = velocity;
        self.filter_x.reset();
        self.filter_y.reset();
    }

    /// Finite-difference acceleration over one tick, smoothed per axis.
    pub fn update(&mut self, velocity: Vector2<f64>, dt: f64) -> Vector2<f64> {
        let raw = (velocity - self.previous_velocity) / dt;
        self.previous_velocity = velocity;
        vector![self.filter_x.update(raw.x), self.filter_y.update(raw.y)]
    }
}
