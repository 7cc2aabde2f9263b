use super::forward;
use crate::core::io::raster::RasterGrid;
use crate::core::models::field::{FieldComponent, FieldKind};
use crate::core::models::survey::ObservationGrid;
use crate::core::models::voxel::VoxelModel;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::ForwardConfig;
use crate::engine::constants::PhysicalConstants;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument};

/// Observation heights of a footprint survey, in metres above the top of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveySetup {
    pub gravity_height: f64,
    pub magnetic_height: f64,
}

impl Default for SurveySetup {
    fn default() -> Self {
        Self {
            gravity_height: 1.0,
            magnetic_height: 100.0,
        }
    }
}

/// Calculated gravity (mGal) and total-field magnetics (nT) over the model footprint.
///
/// Both rasters are north-up with one node per column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyResult {
    pub gravity: RasterGrid,
    pub magnetics: RasterGrid,
}

/// Runs a gravity pass and a magnetic pass over the cell centres of the model footprint.
///
/// `config.field_kind` is ignored; each pass sets its own field kind. Cancelling the token
/// during either pass fails the whole survey.
#[instrument(skip_all, name = "survey_workflow")]
pub fn run(
    model: &VoxelModel,
    setup: &SurveySetup,
    constants: &PhysicalConstants,
    config: &ForwardConfig,
    token: &CancellationToken,
    reporter: &ProgressReporter,
) -> Result<SurveyResult, EngineError> {
    info!(
        gravity_height = setup.gravity_height,
        magnetic_height = setup.magnetic_height,
        "Starting footprint survey."
    );

    let gravity = pass(
        model,
        setup.gravity_height,
        FieldKind::Gravity,
        constants,
        config,
        token,
        reporter,
    )?;
    let magnetics = pass(
        model,
        setup.magnetic_height,
        FieldKind::Magnetic,
        constants,
        config,
        token,
        reporter,
    )?;

    Ok(SurveyResult { gravity, magnetics })
}

fn pass(
    model: &VoxelModel,
    height: f64,
    kind: FieldKind,
    constants: &PhysicalConstants,
    config: &ForwardConfig,
    token: &CancellationToken,
    reporter: &ProgressReporter,
) -> Result<RasterGrid, EngineError> {
    let grid = ObservationGrid::above_model(model, height)?;
    let config = ForwardConfig {
        field_kind: kind,
        ..config.clone()
    };
    let samples = forward::run(model, &grid, constants, &config, token, reporter)?;
    RasterGrid::from_samples(&grid, &samples, FieldComponent::default_for(kind))
        .map_err(|e| EngineError::Output(e.to_string()))
}
