use nalgebra::Vector3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kind of potential field a forward run computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldKind {
    #[default]
    Gravity,
    Magnetic,
}

#[derive(Debug, Error)]
#[error("Invalid field kind string (expected 'gravity' or 'magnetic')")]
pub struct ParseFieldKindError;

impl FromStr for FieldKind {
    type Err = ParseFieldKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gravity" | "grav" | "gz" => Ok(FieldKind::Gravity),
            "magnetic" | "magnetics" | "mag" => Ok(FieldKind::Magnetic),
            _ => Err(ParseFieldKindError),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Gravity => "gravity",
            FieldKind::Magnetic => "magnetic",
        })
    }
}

/// The field computed at one observation point.
///
/// Gravity is the vertical attraction in mGal, positive downward. Magnetics is the anomalous
/// field vector in nT together with its projection onto the inducing-field direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldSample {
    Gravity { gz: f64 },
    Magnetic { b: Vector3<f64>, total: f64 },
}

impl FieldSample {
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Gravity => FieldSample::Gravity { gz: 0.0 },
            FieldKind::Magnetic => FieldSample::Magnetic {
                b: Vector3::zeros(),
                total: 0.0,
            },
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSample::Gravity { .. } => FieldKind::Gravity,
            FieldSample::Magnetic { .. } => FieldKind::Magnetic,
        }
    }

    pub fn gravity(&self) -> Option<f64> {
        match self {
            FieldSample::Gravity { gz } => Some(*gz),
            FieldSample::Magnetic { .. } => None,
        }
    }

    pub fn magnetic(&self) -> Option<Vector3<f64>> {
        match self {
            FieldSample::Magnetic { b, .. } => Some(*b),
            FieldSample::Gravity { .. } => None,
        }
    }

    pub fn total_field(&self) -> Option<f64> {
        match self {
            FieldSample::Magnetic { total, .. } => Some(*total),
            FieldSample::Gravity { .. } => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            FieldSample::Gravity { gz } => gz.is_finite(),
            FieldSample::Magnetic { b, total } => {
                total.is_finite() && b.iter().all(|c| c.is_finite())
            }
        }
    }

    /// Component-wise sum of two samples of the same kind.
    pub fn checked_add(&self, other: &FieldSample) -> Option<FieldSample> {
        match (self, other) {
            (FieldSample::Gravity { gz: a }, FieldSample::Gravity { gz: b }) => {
                Some(FieldSample::Gravity { gz: a + b })
            }
            (
                FieldSample::Magnetic { b: a, total: ta },
                FieldSample::Magnetic { b, total: tb },
            ) => Some(FieldSample::Magnetic {
                b: a + b,
                total: ta + tb,
            }),
            _ => None,
        }
    }
}

/// A scalar component of a [`FieldSample`], used when converting samples to rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldComponent {
    Gz,
    Bx,
    By,
    Bz,
    Total,
}

impl FieldComponent {
    /// The component conventionally mapped for a field kind.
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Gravity => FieldComponent::Gz,
            FieldKind::Magnetic => FieldComponent::Total,
        }
    }

    /// Extracts this component from a sample, or `None` if the sample is of the other kind.
    pub fn value(&self, sample: &FieldSample) -> Option<f64> {
        match (self, sample) {
            (FieldComponent::Gz, FieldSample::Gravity { gz }) => Some(*gz),
            (FieldComponent::Bx, FieldSample::Magnetic { b, .. }) => Some(b.x),
            (FieldComponent::By, FieldSample::Magnetic { b, .. }) => Some(b.y),
            (FieldComponent::Bz, FieldSample::Magnetic { b, .. }) => Some(b.z),
            (FieldComponent::Total, FieldSample::Magnetic { total, .. }) => Some(*total),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid field component string")]
pub struct ParseFieldComponentError;

impl FromStr for FieldComponent {
    type Err = ParseFieldComponentError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gz" => Ok(FieldComponent::Gz),
            "bx" => Ok(FieldComponent::Bx),
            "by" => Ok(FieldComponent::By),
            "bz" => Ok(FieldComponent::Bz),
            "total" | "tmi" => Ok(FieldComponent::Total),
            _ => Err(ParseFieldComponentError),
        }
    }
}

impl fmt::Display for FieldComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldComponent::Gz => "gz",
            FieldComponent::Bx => "bx",
            FieldComponent::By => "by",
            FieldComponent::Bz => "bz",
            FieldComponent::Total => "total",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_matches_kind() {
        assert_eq!(FieldSample::zero(FieldKind::Gravity).gravity(), Some(0.0));
        let magnetic = FieldSample::zero(FieldKind::Magnetic);
        assert_eq!(magnetic.kind(), FieldKind::Magnetic);
        assert_eq!(magnetic.magnetic(), Some(Vector3::zeros()));
        assert_eq!(magnetic.gravity(), None);
    }

    #[test]
    fn checked_add_sums_same_kind_only() {
        let a = FieldSample::Magnetic {
            b: Vector3::new(1.0, 2.0, 3.0),
            total: 4.0,
        };
        let b = FieldSample::Magnetic {
            b: Vector3::new(0.5, 0.5, 0.5),
            total: 1.0,
        };
        assert_eq!(
            a.checked_add(&b),
            Some(FieldSample::Magnetic {
                b: Vector3::new(1.5, 2.5, 3.5),
                total: 5.0
            })
        );
        assert_eq!(a.checked_add(&FieldSample::Gravity { gz: 1.0 }), None);
    }

    #[test]
    fn is_finite_detects_nan_components() {
        let sample = FieldSample::Magnetic {
            b: Vector3::new(0.0, f64::NAN, 0.0),
            total: 0.0,
        };
        assert!(!sample.is_finite());
        assert!(FieldSample::Gravity { gz: 1.0 }.is_finite());
    }

    #[test]
    fn field_kind_parses_aliases() {
        assert_eq!("Gravity".parse::<FieldKind>().unwrap(), FieldKind::Gravity);
        assert_eq!("mag".parse::<FieldKind>().unwrap(), FieldKind::Magnetic);
        assert!("seismic".parse::<FieldKind>().is_err());
        assert_eq!(FieldKind::Magnetic.to_string(), "magnetic");
    }

    #[test]
    fn component_value_requires_matching_kind() {
        let sample = FieldSample::Gravity { gz: 2.5 };
        assert_eq!(FieldComponent::Gz.value(&sample), Some(2.5));
        assert_eq!(FieldComponent::Total.value(&sample), None);
        assert_eq!(
            FieldComponent::default_for(FieldKind::Magnetic),
            FieldComponent::Total
        );
    }
}
