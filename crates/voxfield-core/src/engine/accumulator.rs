use super::context::ForwardRun;
use super::error::EngineError;
use crate::core::geometry::{gravity_response_with, prism_field_from_magnetization};
use crate::core::models::field::{FieldKind, FieldSample};
use nalgebra::{Point3, Vector3};

/// Sums the contribution of every source cell, in voxel index order, at one point.
pub(crate) fn sample_at(run: &ForwardRun, point: &Point3<f64>) -> FieldSample {
    match run.kind() {
        FieldKind::Gravity => {
            let g = run.gravitational_constant();
            let gz = run
                .sources()
                .iter()
                .fold(0.0, |acc, source| {
                    acc + gravity_response_with(&source.prism, point, source.density, g)
                });
            FieldSample::Gravity { gz }
        }
        FieldKind::Magnetic => {
            let b = run.sources().iter().fold(Vector3::zeros(), |acc, source| {
                acc + prism_field_from_magnetization(&source.prism, point, &source.magnetization)
            });
            let total = run.inducing_field().total_field_anomaly(&b);
            FieldSample::Magnetic { b, total }
        }
    }
}

/// Fills `out` with the samples of observations `range_start..range_start + out.len()`.
///
/// # Errors
///
/// Returns [`EngineError::NumericDegenerate`] for the first observation whose value is not
/// finite.
pub(crate) fn accumulate(
    run: &ForwardRun,
    range_start: usize,
    out: &mut [FieldSample],
) -> Result<(), EngineError> {
    for (offset, slot) in out.iter_mut().enumerate() {
        let observation = range_start + offset;
        let point = run.point(observation).ok_or_else(|| {
            EngineError::Output(format!("observation {observation} is outside the grid"))
        })?;
        let sample = sample_at(run, point);
        if !sample.is_finite() {
            return Err(EngineError::NumericDegenerate { observation });
        }
        *slot = sample;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::gravity_response;
    use crate::core::models::properties::CellProperties;
    use crate::core::models::survey::ObservationGrid;
    use crate::core::models::voxel::VoxelModel;
    use crate::engine::cancel::CancellationToken;
    use crate::engine::constants::PhysicalConstants;

    fn two_cell_model() -> VoxelModel {
        let mut model = VoxelModel::new((2, 1, 1), (1.0, 1.0, 1.0), Point3::origin()).unwrap();
        model.set_cell(0, 0, 0, CellProperties::new(1000.0, 0.01)).unwrap();
        model.set_cell(1, 0, 0, CellProperties::new(-400.0, 0.0)).unwrap();
        model
    }

    #[test]
    fn gravity_sums_cells_in_index_order() {
        let model = two_cell_model();
        let grid = ObservationGrid::scattered(vec![Point3::new(0.3, 0.2, -4.0)]).unwrap();
        let token = CancellationToken::new();
        let run = ForwardRun::new(
            &model,
            &grid,
            &PhysicalConstants::default(),
            FieldKind::Gravity,
            &token,
        )
        .unwrap();

        let point = grid.points()[0];
        let expected = 0.0
            + gravity_response(&model.prism_at(0, 0, 0).unwrap(), &point, 1000.0)
            + gravity_response(&model.prism_at(1, 0, 0).unwrap(), &point, -400.0);
        assert_eq!(sample_at(&run, &point), FieldSample::Gravity { gz: expected });
    }

    #[test]
    fn magnetic_run_skips_non_magnetic_cells() {
        let model = two_cell_model();
        let grid = ObservationGrid::scattered(vec![Point3::new(0.5, 0.5, -2.0)]).unwrap();
        let token = CancellationToken::new();
        let run = ForwardRun::new(
            &model,
            &grid,
            &PhysicalConstants::default(),
            FieldKind::Magnetic,
            &token,
        )
        .unwrap();
        assert_eq!(run.sources().len(), 1);

        let sample = sample_at(&run, &grid.points()[0]);
        let b = sample.magnetic().unwrap();
        let total = sample.total_field().unwrap();
        assert!((total - b.z).abs() < 1e-12 * b.z.abs());
    }

    #[test]
    fn accumulate_fills_the_requested_range() {
        let model = two_cell_model();
        let grid =
            ObservationGrid::regular(Point3::new(-2.0, 0.0, -3.0), (1.0, 1.0), 1, 4).unwrap();
        let token = CancellationToken::new();
        let run = ForwardRun::new(
            &model,
            &grid,
            &PhysicalConstants::default(),
            FieldKind::Gravity,
            &token,
        )
        .unwrap();

        let mut out = vec![FieldSample::zero(FieldKind::Gravity); 2];
        accumulate(&run, 2, &mut out).unwrap();
        assert_eq!(out[0], sample_at(&run, &grid.points()[2]));
        assert_eq!(out[1], sample_at(&run, &grid.points()[3]));
    }

    #[test]
    fn accumulate_reports_non_finite_values() {
        let mut model = VoxelModel::new((1, 1, 1), (1.0, 1.0, 1.0), Point3::origin()).unwrap();
        model.set_cell(0, 0, 0, CellProperties::new(1e300, 0.0)).unwrap();
        let grid = ObservationGrid::scattered(vec![
            Point3::new(0.5, 0.5, -1.0),
            Point3::new(0.5, 0.5, -2.0),
        ])
        .unwrap();
        let token = CancellationToken::new();
        let constants = PhysicalConstants {
            gravitational_constant: 1e300,
            ..PhysicalConstants::default()
        };
        let run =
            ForwardRun::new(&model, &grid, &constants, FieldKind::Gravity, &token).unwrap();

        let mut out = vec![FieldSample::zero(FieldKind::Gravity); 2];
        let err = accumulate(&run, 0, &mut out).unwrap_err();
        assert!(matches!(err, EngineError::NumericDegenerate { observation: 0 }));
    }
}
