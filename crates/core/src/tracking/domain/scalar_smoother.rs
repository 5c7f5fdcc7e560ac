use serde::{Deserialize, Serialize};

/// Gains for one [`ScalarSmoother`] channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PidCoefficients {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

impl PidCoefficients {
    pub const fn new(p: f64, i: f64, d: f64) -> Self {
        Self { p, i, d }
    }
}

/// Soft, mostly proportional response used for face centres.
pub const DEFAULT_POSITION_PID: PidCoefficients = PidCoefficients::new(0.9, 0.1, 0.05);

/// Slower, more damped response used for face extents.
pub const DEFAULT_SIZE_PID: PidCoefficients = PidCoefficients::new(0.2, 0.2, 0.1);

/// Single-channel PID-style filter that chases a noisy target.
///
/// Used as a critically-damped low-pass filter rather than as a plant
/// controller. The output is floored at zero: whenever an update would leave
/// `value` negative, the value and all filter memory reset to zero, so size
/// channels never report an inverted extent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScalarSmoother {
    value: f64,
    proportional: f64,
    integral: f64,
    derivative: f64,
}

impl ScalarSmoother {
    pub fn new(value: f64) -> Self {
        let mut smoother = Self::default();
        smoother.assign(value);
        smoother
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Hard reset to `value` with cleared memory.
    pub fn assign(&mut self, value: f64) {
        self.value = value;
        self.proportional = 0.0;
        self.integral = 0.0;
        self.derivative = 0.0;
    }

    pub fn update(&mut self, target: f64, coefficients: &PidCoefficients) {
        let error = target - self.value;
        self.derivative = error - self.proportional;
        self.integral += error;
        self.proportional = error;
        self.value += self.proportional * coefficients.p
            + self.integral * coefficients.i
            + self.derivative * coefficients.d;

        if self.value < 0.0 {
            self.assign(0.0);
        }
    }

    fn memory(&self) -> [f64; 3] {
        [self.proportional, self.integral, self.derivative]
    }
}
