use super::error::EngineError;
use crate::core::geometry::{GRAVITATIONAL_CONSTANT, InducingField};

/// Physical constants of a forward run.
///
/// The ambient field is described by its intensity (nT), inclination (degrees, positive down)
/// and declination (degrees, clockwise from north). The default is a vertical 50 000 nT field,
/// as found at the magnetic poles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub gravitational_constant: f64,
    pub ambient_field_intensity: f64,
    pub ambient_field_inclination: f64,
    pub ambient_field_declination: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            ambient_field_intensity: 50_000.0,
            ambient_field_inclination: 90.0,
            ambient_field_declination: 0.0,
        }
    }
}

impl PhysicalConstants {
    pub fn with_ambient_field(mut self, intensity: f64, inclination: f64, declination: f64) -> Self {
        self.ambient_field_intensity = intensity;
        self.ambient_field_inclination = inclination;
        self.ambient_field_declination = declination;
        self
    }

    /// Checks that every constant is finite and physically meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConstants`] naming the first offending constant.
    pub fn validate(&self) -> Result<(), EngineError> {
        let g = self.gravitational_constant;
        if !(g.is_finite() && g > 0.0) {
            return Err(EngineError::InvalidConstants(format!(
                "gravitational constant must be positive and finite, got {g}"
            )));
        }
        let f = self.ambient_field_intensity;
        if !(f.is_finite() && f >= 0.0) {
            return Err(EngineError::InvalidConstants(format!(
                "ambient field intensity must be non-negative and finite, got {f}"
            )));
        }
        let i = self.ambient_field_inclination;
        if !(i.is_finite() && (-90.0..=90.0).contains(&i)) {
            return Err(EngineError::InvalidConstants(format!(
                "ambient field inclination must lie in [-90, 90] degrees, got {i}"
            )));
        }
        let d = self.ambient_field_declination;
        if !d.is_finite() {
            return Err(EngineError::InvalidConstants(format!(
                "ambient field declination must be finite, got {d}"
            )));
        }
        Ok(())
    }

    pub fn inducing_field(&self) -> InducingField {
        InducingField::new(
            self.ambient_field_intensity,
            self.ambient_field_inclination,
            self.ambient_field_declination,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_vertical_polar_field() {
        let constants = PhysicalConstants::default();
        assert!(constants.validate().is_ok());
        let field = constants.inducing_field();
        assert_eq!(field.intensity(), 50_000.0);
        assert!((field.direction().z - 1.0).abs() < 1e-15);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let bad_g = PhysicalConstants {
            gravitational_constant: 0.0,
            ..PhysicalConstants::default()
        };
        assert!(matches!(bad_g.validate(), Err(EngineError::InvalidConstants(_))));

        let bad_inclination = PhysicalConstants::default().with_ambient_field(50_000.0, 95.0, 0.0);
        assert!(bad_inclination.validate().is_err());

        let bad_intensity = PhysicalConstants::default().with_ambient_field(f64::NAN, 60.0, 0.0);
        assert!(bad_intensity.validate().is_err());
    }
}
