//! Single-pole exponential smoothing for per-frame features.

/// Exponential moving average with a fixed responsiveness.
///
/// The first value fed in is adopted as-is, so loudness-style features do
/// not ramp up from zero when a sketch starts. After that every call moves
/// the output `responsiveness` of the way toward the new target.
///
/// High responsiveness (0.3-0.5) suits transients like onset or percussive
/// energy; low values (0.02-0.08) suit slow features like centroid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoother {
    responsiveness: f32,
    value: Option<f32>,
}

impl Smoother {
    /// # Panics
    /// Panics if `responsiveness` is not in `(0, 1]`.
    pub fn new(responsiveness: f32) -> Self {
        assert!(
            responsiveness > 0.0 && responsiveness <= 1.0,
            "Responsiveness must be in (0, 1], got {responsiveness}"
        );
        Self {
            responsiveness,
            value: None,
        }
    }

    pub fn smooth(&mut self, target: f32) -> f32 {
        let next = match self.value {
            None => target,
            Some(previous) => previous + (target - previous) * self.responsiveness,
        };
        self.value = Some(next);
        next
    }

    /// Last output, `None` before the first call
    pub fn value(&self) -> Option<f32> {
        self.value
    }

    pub fn responsiveness(&self) -> f32 {
        self.responsiveness
    }
}

/// Element-wise smoothing for vector features such as bands or chroma.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorSmoother {
    responsiveness: f32,
    values: Vec<f32>,
}

impl VectorSmoother {
    /// # Panics
    /// Panics if `responsiveness` is not in `(0, 1]`.
    pub fn new(responsiveness: f32) -> Self {
        assert!(
            responsiveness > 0.0 && responsiveness <= 1.0,
            "Responsiveness must be in (0, 1], got {responsiveness}"
        );
        Self {
            responsiveness,
            values: Vec::new(),
        }
    }

    /// Smooth `targets` and return the smoothed vector. A first call, or a
    /// call with a different length than before, adopts `targets` as-is.
    pub fn smooth(&mut self, targets: &[f32]) -> &[f32] {
        if self.values.len() != targets.len() {
            if !self.values.is_empty() {
                log::debug!(
                    "Vector width changed from {} to {}, restarting smoothing",
                    self.values.len(),
                    targets.len()
                );
            }
            self.values = targets.to_vec();
            return &self.values;
        }

        let r = self.responsiveness;
        for (value, &target) in self.values.iter_mut().zip(targets) {
            *value += (target - *value) * r;
        }
        &self.values
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn responsiveness(&self) -> f32 {
        self.responsiveness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_adopts_target() {
        for r in [0.01, 0.3, 1.0] {
            let mut smoother = Smoother::new(r);
            assert_eq!(smoother.value(), None);
            assert_eq!(smoother.smooth(0.42), 0.42);
            assert_eq!(smoother.value(), Some(0.42));
        }
    }

    #[test]
    fn moves_fraction_toward_target() {
        let mut smoother = Smoother::new(0.25);
        smoother.smooth(0.0);
        assert_eq!(smoother.smooth(1.0), 0.25);
        assert_eq!(smoother.smooth(1.0), 0.4375);
    }

    #[test]
    fn full_responsiveness_is_passthrough() {
        let mut smoother = Smoother::new(1.0);
        for target in [0.1, 0.9, -3.0, 0.5] {
            assert_eq!(smoother.smooth(target), target);
        }
    }

    #[test]
    fn converges_monotonically() {
        for r in [0.05, 0.2, 0.5] {
            let mut smoother = Smoother::new(r);
            smoother.smooth(0.0);
            let mut previous = 0.0;
            let bound = (40.0 / r) as usize;
            for _ in 0..bound {
                let value = smoother.smooth(1.0);
                assert!(value >= previous);
                assert!(value <= 1.0);
                previous = value;
            }
            assert!((1.0 - previous).abs() < 1e-6, "r={r} ended at {previous}");
        }
    }

    #[test]
    fn nan_propagates() {
        let mut smoother = Smoother::new(0.5);
        smoother.smooth(1.0);
        assert!(smoother.smooth(f32::NAN).is_nan());
    }

    #[test]
    #[should_panic]
    fn zero_responsiveness_panics() {
        Smoother::new(0.0);
    }

    #[test]
    #[should_panic]
    fn responsiveness_above_one_panics() {
        VectorSmoother::new(1.5);
    }

    #[test]
    fn vector_smoothing_is_element_wise() {
        let mut smoother = VectorSmoother::new(0.5);
        assert_eq!(smoother.smooth(&[0.0, 1.0]), &[0.0, 1.0]);
        assert_eq!(smoother.smooth(&[1.0, 0.0]), &[0.5, 0.5]);
        assert_eq!(smoother.values(), &[0.5, 0.5]);
    }

    #[test]
    fn vector_width_change_restarts() {
        let mut smoother = VectorSmoother::new(0.1);
        smoother.smooth(&[0.0, 0.0]);
        assert_eq!(smoother.smooth(&[1.0, 1.0, 1.0]), &[1.0, 1.0, 1.0]);
    }
}
