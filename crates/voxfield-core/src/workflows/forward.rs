use crate::core::models::field::FieldSample;
use crate::core::models::survey::ObservationGrid;
use crate::core::models::voxel::VoxelModel;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::ForwardConfig;
use crate::engine::constants::PhysicalConstants;
use crate::engine::context::ForwardRun;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scheduler;
use tracing::{info, instrument};

/// Computes the field of `model` at every point of `grid`.
///
/// Samples are returned in observation order. The call blocks until every chunk has completed,
/// or fails with the first error; a cancelled run returns [`EngineError::Cancelled`] and no
/// samples.
#[instrument(skip_all, name = "forward_workflow")]
pub fn run(
    model: &VoxelModel,
    grid: &ObservationGrid,
    constants: &PhysicalConstants,
    config: &ForwardConfig,
    token: &CancellationToken,
    reporter: &ProgressReporter,
) -> Result<Vec<FieldSample>, EngineError> {
    // === Phase 1: Preparation ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    info!(
        field = %config.field_kind,
        cells = model.len(),
        active_cells = model.active_count(),
        observations = grid.len(),
        "Preparing forward run."
    );
    token.check()?;

    let run = ForwardRun::new(model, grid, constants, config.field_kind, token)?;
    reporter.report(Progress::Message(format!(
        "{} contributing cells, {} observations",
        run.sources().len(),
        run.observation_count()
    )));
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Forward Modelling ===
    reporter.report(Progress::PhaseStart {
        name: "Forward Modelling",
    });
    let samples = scheduler::execute(&run, config, reporter)?;
    reporter.report(Progress::PhaseFinish);

    info!(observations = samples.len(), "Forward run complete.");
    Ok(samples)
}

/// Entry point for repeated forward runs sharing one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardModel {
    config: ForwardConfig,
}

impl ForwardModel {
    pub fn new(config: ForwardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForwardConfig {
        &self.config
    }

    pub fn compute(
        &self,
        model: &VoxelModel,
        grid: &ObservationGrid,
        constants: &PhysicalConstants,
        token: &CancellationToken,
    ) -> Result<Vec<FieldSample>, EngineError> {
        self.compute_with_reporter(model, grid, constants, token, &ProgressReporter::new())
    }

    pub fn compute_with_reporter(
        &self,
        model: &VoxelModel,
        grid: &ObservationGrid,
        constants: &PhysicalConstants,
        token: &CancellationToken,
        reporter: &ProgressReporter,
    ) -> Result<Vec<FieldSample>, EngineError> {
        run(model, grid, constants, &self.config, token, reporter)
    }
}
