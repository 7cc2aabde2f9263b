use super::error::ModelError;
use nalgebra::Vector3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Physical properties carried by one voxel.
///
/// `density` is a density contrast in kg/m³, `susceptibility` is dimensionless (SI) and
/// `remanence` is a remanent magnetization vector in A/m expressed in the model frame.
/// Inactive cells never contribute to a forward run, whatever their other properties.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellProperties {
    pub density: f64,
    pub susceptibility: f64,
    pub remanence: Option<Vector3<f64>>,
    pub active: bool,
}

impl CellProperties {
    /// An active cell with the given density contrast and susceptibility and no remanence.
    pub fn new(density: f64, susceptibility: f64) -> Self {
        Self {
            density,
            susceptibility,
            remanence: None,
            active: true,
        }
    }

    pub fn with_remanence(mut self, remanence: Vector3<f64>) -> Self {
        self.remanence = Some(remanence);
        self
    }

    /// Returns `true` if every field is bitwise equal to [`CellProperties::default`].
    ///
    /// Used by sparse writers; `-0.0` is not considered default so that it survives a round trip.
    pub fn is_default(&self) -> bool {
        self.density.to_bits() == 0
            && self.susceptibility.to_bits() == 0
            && self.remanence.is_none()
            && !self.active
    }

    /// Reads a single property.
    pub fn get(&self, field: PropertyField) -> Property {
        match field {
            PropertyField::Density => Property::Density(self.density),
            PropertyField::Susceptibility => Property::Susceptibility(self.susceptibility),
            PropertyField::Remanence => Property::Remanence(self.remanence),
            PropertyField::Active => Property::Active(self.active),
        }
    }

    /// Writes a single property after validating it.
    pub fn apply(&mut self, property: Property) -> Result<(), ModelError> {
        property.validate()?;
        match property {
            Property::Density(v) => self.density = v,
            Property::Susceptibility(v) => self.susceptibility = v,
            Property::Remanence(v) => self.remanence = v,
            Property::Active(v) => self.active = v,
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        Property::Density(self.density).validate()?;
        Property::Susceptibility(self.susceptibility).validate()?;
        Property::Remanence(self.remanence).validate()
    }
}

/// Selects one property of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyField {
    Density,
    Susceptibility,
    Remanence,
    Active,
}

impl PropertyField {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyField::Density => "density",
            PropertyField::Susceptibility => "susceptibility",
            PropertyField::Remanence => "remanence",
            PropertyField::Active => "active",
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid property name")]
pub struct ParsePropertyFieldError;

impl FromStr for PropertyField {
    type Err = ParsePropertyFieldError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "density" => Ok(PropertyField::Density),
            "susceptibility" => Ok(PropertyField::Susceptibility),
            "remanence" => Ok(PropertyField::Remanence),
            "active" => Ok(PropertyField::Active),
            _ => Err(ParsePropertyFieldError),
        }
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed property value, as passed to and returned from `VoxelModel::{set,get}_property`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Property {
    Density(f64),
    Susceptibility(f64),
    Remanence(Option<Vector3<f64>>),
    Active(bool),
}

impl Property {
    pub fn field(&self) -> PropertyField {
        match self {
            Property::Density(_) => PropertyField::Density,
            Property::Susceptibility(_) => PropertyField::Susceptibility,
            Property::Remanence(_) => PropertyField::Remanence,
            Property::Active(_) => PropertyField::Active,
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        let finite = match self {
            Property::Density(v) | Property::Susceptibility(v) => v.is_finite(),
            Property::Remanence(Some(v)) => v.iter().all(|c| c.is_finite()),
            Property::Remanence(None) | Property::Active(_) => true,
        };
        if finite {
            Ok(())
        } else {
            Err(ModelError::InvalidProperty {
                property: self.field().name(),
                value: format!("{self:?}"),
            })
        }
    }
}
