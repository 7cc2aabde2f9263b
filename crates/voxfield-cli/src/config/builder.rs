use super::defaults::DefaultsConfig;
use super::file::{
    FileComputeConfig, FileConfig, FileConstantsConfig, FileModelConfig, FileSurveyConfig,
};
use super::models::{ForwardSettings, ModelSpec, SurveySettings, SurveySpec};
use crate::cli::{ForwardArgs, ModelArgs, SurveyArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use nalgebra::Point3;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use voxfield::core::geometry::Prism;
use voxfield::core::io::xyz::XyzColumns;
use voxfield::core::models::field::FieldKind;
use voxfield::core::models::lithology::{Lithology, LithologyTable, Remanence};
use voxfield::engine::config::{ForwardConfig, ForwardConfigBuilder};
use voxfield::engine::constants::PhysicalConstants;
use voxfield::workflows::survey::SurveySetup;

pub fn build_model_spec(args: &ModelArgs) -> Result<ModelSpec> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::from_file(&args.config)?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    let model = file_config
        .model
        .take()
        .ok_or_else(|| CliError::Config("missing `[model]` section".to_string()))?;
    merge_model(model, &defaults)
}

pub fn build_forward_settings(
    args: &ForwardArgs,
    threads: Option<usize>,
) -> Result<ForwardSettings> {
    let defaults = DefaultsConfig::default();
    let file_config = load_optional(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let constants = merge_constants(file_config.constants.take(), &defaults);
    let compute = file_config.compute.take().unwrap_or_default();

    let field_kind = match args.field {
        Some(field) => field.into(),
        None => parse_field(compute.field.as_deref().unwrap_or(&defaults.field))?,
    };
    let config = build_core_config(
        field_kind,
        threads.or(compute.max_workers),
        args.chunk_size.or(compute.chunk_size),
    )?;
    let timeout = resolve_timeout(args.timeout.or(compute.timeout_secs))?;
    let survey = resolve_survey(file_config.survey.take(), &defaults);
    if args.grid_out.is_some() && matches!(survey, SurveySpec::Points { .. }) {
        return Err(CliError::Config(
            "--grid-out needs a regular survey; a `points` survey has no raster layout"
                .to_string(),
        ));
    }

    Ok(ForwardSettings {
        constants,
        config,
        survey,
        timeout,
    })
}

pub fn build_survey_settings(args: &SurveyArgs, threads: Option<usize>) -> Result<SurveySettings> {
    let defaults = DefaultsConfig::default();
    let file_config = load_optional(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let constants = merge_constants(file_config.constants.take(), &defaults);
    let compute = file_config.compute.take().unwrap_or_default();
    let footprint = file_config.footprint.take().unwrap_or_default();

    let setup = SurveySetup {
        gravity_height: args
            .gravity_height
            .or(footprint.gravity_height)
            .unwrap_or(defaults.footprint.gravity_height),
        magnetic_height: args
            .magnetic_height
            .or(footprint.magnetic_height)
            .unwrap_or(defaults.footprint.magnetic_height),
    };
    let config = build_core_config(FieldKind::Gravity, threads.or(compute.max_workers), compute.chunk_size)?;
    let timeout = resolve_timeout(args.timeout.or(compute.timeout_secs))?;

    Ok(SurveySettings {
        constants,
        config,
        setup,
        timeout,
    })
}

fn load_optional(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => FileConfig::from_file(path),
        None => Ok(FileConfig::default()),
    }
}

fn parse_field(name: &str) -> Result<FieldKind> {
    FieldKind::from_str(name).map_err(|_| {
        CliError::Config(format!(
            "unknown field '{name}'; expected 'gravity' or 'magnetic'"
        ))
    })
}

fn build_core_config(
    field_kind: FieldKind,
    max_workers: Option<usize>,
    chunk_size: Option<usize>,
) -> Result<ForwardConfig> {
    let mut builder = ForwardConfigBuilder::new().field_kind(field_kind);
    if let Some(workers) = max_workers {
        builder = builder.max_workers(workers);
    }
    if let Some(size) = chunk_size {
        builder = builder.chunk_size(size);
    }
    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

fn resolve_timeout(seconds: Option<f64>) -> Result<Option<Duration>> {
    seconds
        .map(|s| {
            Duration::try_from_secs_f64(s).map_err(|_| {
                CliError::Config(format!(
                    "timeout must be a non-negative number of seconds, got {s}"
                ))
            })
        })
        .transpose()
}

fn merge_constants(file: Option<FileConstantsConfig>, defaults: &DefaultsConfig) -> PhysicalConstants {
    let file = file.unwrap_or_default();
    let base = defaults.constants;
    PhysicalConstants {
        gravitational_constant: file
            .gravitational_constant
            .unwrap_or(base.gravitational_constant),
        ambient_field_intensity: file.field_intensity.unwrap_or(base.ambient_field_intensity),
        ambient_field_inclination: file
            .field_inclination
            .unwrap_or(base.ambient_field_inclination),
        ambient_field_declination: file
            .field_declination
            .unwrap_or(base.ambient_field_declination),
    }
}

fn resolve_survey(file: Option<FileSurveyConfig>, defaults: &DefaultsConfig) -> SurveySpec {
    match file {
        Some(FileSurveyConfig::Regular {
            origin,
            spacing,
            rows,
            cols,
            elevation,
        }) => SurveySpec::Regular {
            origin,
            spacing,
            rows,
            cols,
            elevation,
        },
        Some(FileSurveyConfig::Points {
            path,
            x_column,
            y_column,
            elevation_column,
            elevation,
        }) => {
            let base = XyzColumns::default();
            let columns = XyzColumns {
                x: x_column.unwrap_or(base.x),
                y: y_column.unwrap_or(base.y),
                elevation: match (elevation_column, elevation) {
                    (Some(column), _) => Some(column),
                    (None, Some(_)) => None,
                    (None, None) => base.elevation,
                },
                default_elevation: elevation.unwrap_or(base.default_elevation),
            };
            SurveySpec::Points { path, columns }
        }
        Some(FileSurveyConfig::Drape { path, clearance }) => SurveySpec::Drape { path, clearance },
        Some(FileSurveyConfig::Footprint { height }) => SurveySpec::Footprint {
            height: height.unwrap_or(defaults.footprint_height),
        },
        None => SurveySpec::Footprint {
            height: defaults.footprint_height,
        },
    }
}

fn merge_model(model: FileModelConfig, defaults: &DefaultsConfig) -> Result<ModelSpec> {
    let [nx, ny, nz] = model
        .dimensions
        .ok_or_else(|| CliError::Config("`model.dimensions` is required".to_string()))?;
    let [dx, dy, dz] = model
        .cell_size
        .ok_or_else(|| CliError::Config("`model.cell-size` is required".to_string()))?;
    let origin = model.origin.unwrap_or(defaults.origin);

    let mut lithologies = LithologyTable::new(
        model
            .background_density
            .unwrap_or(defaults.background_density),
    );
    for entry in model.lithologies {
        if lithologies.find(&entry.name).is_some() {
            return Err(CliError::Config(format!(
                "lithology '{}' is defined more than once",
                entry.name
            )));
        }
        let mut lithology = Lithology::new(entry.name, entry.density, entry.susceptibility);
        if let Some(r) = entry.remanence {
            lithology = lithology.with_remanence(Remanence {
                intensity: r.intensity,
                inclination: r.inclination,
                declination: r.declination,
            });
        }
        lithologies.add(lithology);
    }

    let mut bodies = Vec::with_capacity(model.bodies.len());
    for body in model.bodies {
        let index = lithologies.find(&body.lithology).ok_or_else(|| {
            CliError::Config(format!("body refers to unknown lithology '{}'", body.lithology))
        })?;
        let region = Prism::new(Point3::from(body.min), Point3::from(body.max)).ok_or_else(|| {
            CliError::Config(format!(
                "body of '{}' has an empty or non-finite extent",
                body.lithology
            ))
        })?;
        bodies.push((index, region));
    }

    Ok(ModelSpec {
        dimensions: (nx, ny, nz),
        cell_size: (dx, dy, dz),
        origin,
        lithologies,
        bodies,
    })
}

fn value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    parser::parse_value(key, raw).map_err(|e| CliError::Config(e.to_string()))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, raw) =
            parser::parse_assignment(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        match key {
            "model.dimensions" => {
                let dims = parser::parse_triplet(key, raw)
                    .map_err(|e| CliError::Config(e.to_string()))?;
                config.model.get_or_insert_with(Default::default).dimensions = Some(dims);
            }
            "model.cell-size" => {
                let size = parser::parse_triplet(key, raw)
                    .map_err(|e| CliError::Config(e.to_string()))?;
                config.model.get_or_insert_with(Default::default).cell_size = Some(size);
            }
            "model.origin" => {
                let origin = parser::parse_triplet(key, raw)
                    .map_err(|e| CliError::Config(e.to_string()))?;
                config.model.get_or_insert_with(Default::default).origin = Some(origin);
            }
            "model.background-density" => {
                config
                    .model
                    .get_or_insert_with(Default::default)
                    .background_density = Some(value(key, raw)?);
            }
            "constants.gravitational-constant" => {
                config
                    .constants
                    .get_or_insert_with(Default::default)
                    .gravitational_constant = Some(value(key, raw)?);
            }
            "constants.field-intensity" => {
                config
                    .constants
                    .get_or_insert_with(Default::default)
                    .field_intensity = Some(value(key, raw)?);
            }
            "constants.field-inclination" => {
                config
                    .constants
                    .get_or_insert_with(Default::default)
                    .field_inclination = Some(value(key, raw)?);
            }
            "constants.field-declination" => {
                config
                    .constants
                    .get_or_insert_with(Default::default)
                    .field_declination = Some(value(key, raw)?);
            }
            "compute.field" => {
                parse_field(raw)?;
                config.compute.get_or_insert_with(FileComputeConfig::default).field =
                    Some(raw.to_string());
            }
            "compute.max-workers" => {
                config
                    .compute
                    .get_or_insert_with(Default::default)
                    .max_workers = Some(value(key, raw)?);
            }
            "compute.chunk-size" => {
                config
                    .compute
                    .get_or_insert_with(Default::default)
                    .chunk_size = Some(value(key, raw)?);
            }
            "compute.timeout-secs" => {
                config
                    .compute
                    .get_or_insert_with(Default::default)
                    .timeout_secs = Some(value(key, raw)?);
            }
            "footprint.gravity-height" => {
                config
                    .footprint
                    .get_or_insert_with(Default::default)
                    .gravity_height = Some(value(key, raw)?);
            }
            "footprint.magnetic-height" => {
                config
                    .footprint
                    .get_or_insert_with(Default::default)
                    .magnetic_height = Some(value(key, raw)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
