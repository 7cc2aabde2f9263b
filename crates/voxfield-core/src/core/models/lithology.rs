use super::error::{Index3, ModelError};
use super::properties::CellProperties;
use super::voxel::VoxelModel;
use crate::core::geometry::direction_from_angles;
use nalgebra::{Point3, Vector3};

/// Density of average continental crust, in kg/m³.
pub const DEFAULT_BACKGROUND_DENSITY: f64 = 2670.0;

/// Remanent magnetization given as an intensity and a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Remanence {
    /// Intensity in A/m.
    pub intensity: f64,
    /// Inclination in degrees, positive down.
    pub inclination: f64,
    /// Declination in degrees, clockwise from north.
    pub declination: f64,
}

impl Remanence {
    /// The magnetization vector in the model frame, in A/m.
    pub fn vector(&self) -> Vector3<f64> {
        direction_from_angles(self.inclination, self.declination).into_inner() * self.intensity
    }
}

/// A named rock unit with absolute physical properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Lithology {
    pub name: String,
    /// Absolute density in kg/m³.
    pub density: f64,
    /// Susceptibility in SI units.
    pub susceptibility: f64,
    pub remanence: Option<Remanence>,
}

impl Lithology {
    pub fn new(name: impl Into<String>, density: f64, susceptibility: f64) -> Self {
        Self {
            name: name.into(),
            density,
            susceptibility,
            remanence: None,
        }
    }

    pub fn with_remanence(mut self, remanence: Remanence) -> Self {
        self.remanence = Some(remanence);
        self
    }
}

/// An ordered set of lithologies sharing a background density.
///
/// Lithology indices start at 1. Index 0 is reserved for the background: cells labelled 0 are
/// left inactive, since a density contrast of zero and no magnetization contribute nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct LithologyTable {
    background_density: f64,
    lithologies: Vec<Lithology>,
}

impl Default for LithologyTable {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND_DENSITY)
    }
}

impl LithologyTable {
    pub fn new(background_density: f64) -> Self {
        Self {
            background_density,
            lithologies: Vec::new(),
        }
    }

    #[inline]
    pub fn background_density(&self) -> f64 {
        self.background_density
    }

    /// Appends a lithology and returns its index.
    pub fn add(&mut self, lithology: Lithology) -> usize {
        self.lithologies.push(lithology);
        self.lithologies.len()
    }

    pub fn get(&self, index: usize) -> Option<&Lithology> {
        index
            .checked_sub(1)
            .and_then(|position| self.lithologies.get(position))
    }

    /// Index of the first lithology with the given name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.lithologies
            .iter()
            .position(|lithology| lithology.name == name)
            .map(|position| position + 1)
    }

    pub fn len(&self) -> usize {
        self.lithologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lithologies.is_empty()
    }

    /// Iterates over `(index, lithology)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Lithology)> {
        self.lithologies
            .iter()
            .enumerate()
            .map(|(position, lithology)| (position + 1, lithology))
    }

    /// Cell properties for a lithology index.
    ///
    /// The cell density is the contrast `lithology.density − background_density`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownLithology`] if the index is neither 0 nor a known lithology.
    pub fn cell_properties(&self, index: usize) -> Result<CellProperties, ModelError> {
        if index == 0 {
            return Ok(CellProperties::default());
        }
        let lithology = self.get(index).ok_or(ModelError::UnknownLithology(index))?;
        let mut properties = CellProperties::new(
            lithology.density - self.background_density,
            lithology.susceptibility,
        );
        properties.remanence = lithology.remanence.map(|r| r.vector());
        Ok(properties)
    }

    /// Builds a voxel model from a lithology-index volume laid out in voxel index order.
    ///
    /// # Errors
    ///
    /// Returns any geometry error from [`VoxelModel::new`],
    /// [`ModelError::IndexVolumeMismatch`] if `indices` does not hold exactly one entry per cell,
    /// and [`ModelError::UnknownLithology`] for an unknown index.
    pub fn build_model(
        &self,
        dimensions: Index3,
        cell_size: (f64, f64, f64),
        origin: Point3<f64>,
        indices: &[usize],
    ) -> Result<VoxelModel, ModelError> {
        let mut model = VoxelModel::new(dimensions, cell_size, origin)?;
        if indices.len() != model.len() {
            return Err(ModelError::IndexVolumeMismatch {
                expected: model.len(),
                actual: indices.len(),
            });
        }

        let palette = (0..=self.lithologies.len())
            .map(|index| self.cell_properties(index))
            .collect::<Result<Vec<_>, _>>()?;

        for (linear_index, &lithology) in indices.iter().enumerate() {
            let properties = *palette
                .get(lithology)
                .ok_or(ModelError::UnknownLithology(lithology))?;
            if let Some((i, j, k)) = model.index_of(linear_index) {
                model.set_cell(i, j, k, properties)?;
            }
        }
        Ok(model)
    }
}
