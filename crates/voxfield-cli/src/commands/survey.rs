use super::forward::load_model;
use super::run_cancellable;
use crate::cli::SurveyArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::info;
use voxfield::core::io::raster::{AsciiGridFile, RasterGrid};
use voxfield::core::io::traits::DataFile;
use voxfield::engine::cancel::CancellationToken;
use voxfield::engine::progress::ProgressReporter;
use voxfield::workflows::survey;

pub async fn run(
    args: SurveyArgs,
    threads: Option<usize>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let settings = config::build_survey_settings(&args, threads)?;

    info!("Loading voxel model from {:?}", &args.model);
    let model = load_model(&args.model)?;

    let token = match settings.timeout {
        Some(timeout) => CancellationToken::new().with_timeout(timeout),
        None => CancellationToken::new(),
    };
    let callback = CliProgressHandler::new(ui_sender).get_callback();

    println!(
        "Computing gravity at {} m and magnetics at {} m above the model...",
        settings.setup.gravity_height, settings.setup.magnetic_height
    );
    let job_token = token.clone();
    let result = run_cancellable(token, move || {
        let reporter = ProgressReporter::with_callback(callback);
        survey::run(
            &model,
            &settings.setup,
            &settings.constants,
            &settings.config,
            &job_token,
            &reporter,
        )
    })
    .await?;

    for (suffix, raster) in [
        ("gravity", &result.gravity),
        ("magnetics", &result.magnetics),
    ] {
        let path = suffixed_path(&args.output, suffix);
        write_raster(raster, &path)?;
        match raster.value_range() {
            Some((min, max)) => println!(
                "✓ Calculated {suffix} ({min:.4} to {max:.4}) written to: {}",
                path.display()
            ),
            None => println!("✓ Calculated {suffix} written to: {}", path.display()),
        }
    }

    Ok(())
}

/// `<prefix>_<suffix>.asc`, keeping any directory part of the prefix.
fn suffixed_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(format!("_{suffix}.asc"));
    PathBuf::from(name)
}

fn write_raster(raster: &RasterGrid, path: &Path) -> Result<()> {
    AsciiGridFile::write_to_path(raster, path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
