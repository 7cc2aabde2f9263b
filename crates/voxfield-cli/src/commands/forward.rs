use super::run_cancellable;
use crate::cli::ForwardArgs;
use crate::config::{self, SurveySpec};
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use nalgebra::Point3;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;
use voxfield::core::io::raster::{AsciiGridFile, RasterGrid};
use voxfield::core::io::samples::{SampleTable, SampleTableFile};
use voxfield::core::io::traits::DataFile;
use voxfield::core::io::voxel_toml::VoxelModelFile;
use voxfield::core::io::xyz;
use voxfield::core::models::field::FieldComponent;
use voxfield::core::models::survey::ObservationGrid;
use voxfield::core::models::voxel::VoxelModel;
use voxfield::engine::cancel::CancellationToken;
use voxfield::engine::progress::ProgressReporter;
use voxfield::workflows::forward::ForwardModel;

pub async fn run(
    args: ForwardArgs,
    threads: Option<usize>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let settings = config::build_forward_settings(&args, threads)?;
    let kind = settings.config.field_kind;

    info!("Loading voxel model from {:?}", &args.model);
    let model = load_model(&args.model)?;
    let grid = build_grid(&settings.survey, &model)?;
    info!(
        observations = grid.len(),
        regular = grid.is_regular(),
        "Observation grid ready."
    );

    let token = match settings.timeout {
        Some(timeout) => CancellationToken::new().with_timeout(timeout),
        None => CancellationToken::new(),
    };
    let callback = CliProgressHandler::new(ui_sender).get_callback();
    let engine = ForwardModel::new(settings.config);
    let constants = settings.constants;

    println!(
        "Computing {} field at {} observation points...",
        kind,
        grid.len()
    );
    let job_token = token.clone();
    let (grid, samples) = run_cancellable(token, move || {
        let reporter = ProgressReporter::with_callback(callback);
        let samples = engine.compute_with_reporter(&model, &grid, &constants, &job_token, &reporter)?;
        Ok((grid, samples))
    })
    .await?;

    let table = SampleTable::new(grid.points().to_vec(), samples);
    SampleTableFile::write_to_path(&table, &args.output).map_err(|e| CliError::FileWriting {
        path: args.output.clone(),
        source: e.into(),
    })?;
    println!("✓ Samples written to: {}", args.output.display());

    if let Some(path) = &args.grid_out {
        let component = args
            .component
            .map(FieldComponent::from)
            .unwrap_or_else(|| FieldComponent::default_for(kind));
        let raster = write_raster(&grid, &table, component, path)?;
        if let Some((min, max)) = raster.value_range() {
            println!("  {component} range: {min:.4} to {max:.4}");
        }
        println!("✓ Grid written to: {}", path.display());
    }

    Ok(())
}

pub(crate) fn load_model(path: &Path) -> Result<VoxelModel> {
    VoxelModelFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn build_grid(spec: &SurveySpec, model: &VoxelModel) -> Result<ObservationGrid> {
    let grid = match spec {
        SurveySpec::Regular {
            origin,
            spacing,
            rows,
            cols,
            elevation,
        } => ObservationGrid::regular(
            Point3::new(origin[0], origin[1], -elevation),
            (spacing[0], spacing[1]),
            *rows,
            *cols,
        )?,
        SurveySpec::Points { path, columns } => {
            let mut reader = BufReader::new(File::open(path)?);
            let points =
                xyz::read_points(&mut reader, columns).map_err(|e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                })?;
            ObservationGrid::scattered(points)?
        }
        SurveySpec::Drape { path, clearance } => {
            let surface =
                AsciiGridFile::read_from_path(path).map_err(|e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                })?;
            ObservationGrid::draped_over(&surface, *clearance)?
        }
        SurveySpec::Footprint { height } => ObservationGrid::above_model(model, *height)?,
    };
    Ok(grid)
}

fn write_raster(
    grid: &ObservationGrid,
    table: &SampleTable,
    component: FieldComponent,
    path: &Path,
) -> Result<RasterGrid> {
    let raster = RasterGrid::from_samples(grid, &table.samples, component).map_err(|e| {
        CliError::FileWriting {
            path: path.to_path_buf(),
            source: e.into(),
        }
    })?;
    AsciiGridFile::write_to_path(&raster, path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(raster)
}
