use super::cancel::CancellationToken;
use super::constants::PhysicalConstants;
use super::error::EngineError;
use crate::core::geometry::{InducingField, Prism};
use crate::core::models::field::FieldKind;
use crate::core::models::survey::ObservationGrid;
use crate::core::models::voxel::VoxelModel;
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// A source cell prepared for summation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceCell {
    pub prism: Prism,
    pub density: f64,
    /// Total magnetization `χ · H₀ + M_r`, in A/m.
    pub magnetization: Vector3<f64>,
}

/// Immutable inputs of one forward run.
///
/// Holds an owned snapshot of the contributing cells in voxel index order and borrows the
/// observation grid and cancellation token for the lifetime of the run.
pub(crate) struct ForwardRun<'a> {
    sources: Vec<SourceCell>,
    grid: &'a ObservationGrid,
    kind: FieldKind,
    gravitational_constant: f64,
    inducing_field: InducingField,
    token: &'a CancellationToken,
}

impl<'a> ForwardRun<'a> {
    /// Validates the constants and snapshots the cells that contribute to `kind`.
    ///
    /// Cells with zero density (gravity) or zero total magnetization (magnetics) are left out;
    /// their contribution is exactly zero.
    pub fn new(
        model: &VoxelModel,
        grid: &'a ObservationGrid,
        constants: &PhysicalConstants,
        kind: FieldKind,
        token: &'a CancellationToken,
    ) -> Result<Self, EngineError> {
        constants.validate()?;
        let inducing_field = constants.inducing_field();

        let sources: Vec<SourceCell> = model
            .iterate_active()
            .map(|cell| {
                let mut magnetization =
                    inducing_field.induced_magnetization(cell.properties.susceptibility);
                if let Some(remanence) = &cell.properties.remanence {
                    magnetization += remanence;
                }
                SourceCell {
                    prism: cell.prism,
                    density: cell.properties.density,
                    magnetization,
                }
            })
            .filter(|source| match kind {
                FieldKind::Gravity => source.density != 0.0,
                FieldKind::Magnetic => source.magnetization != Vector3::zeros(),
            })
            .collect();

        debug!(
            active_cells = model.active_count(),
            contributing_cells = sources.len(),
            observations = grid.len(),
            field = %kind,
            "Prepared forward run."
        );

        Ok(Self {
            sources,
            grid,
            kind,
            gravitational_constant: constants.gravitational_constant,
            inducing_field,
            token,
        })
    }

    #[inline]
    pub fn sources(&self) -> &[SourceCell] {
        &self.sources
    }

    #[inline]
    pub fn point(&self, observation: usize) -> Option<&Point3<f64>> {
        self.grid.points().get(observation)
    }

    #[inline]
    pub fn observation_count(&self) -> usize {
        self.grid.len()
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[inline]
    pub fn gravitational_constant(&self) -> f64 {
        self.gravitational_constant
    }

    #[inline]
    pub fn inducing_field(&self) -> &InducingField {
        &self.inducing_field
    }

    #[inline]
    pub fn token(&self) -> &CancellationToken {
        self.token
    }
}
