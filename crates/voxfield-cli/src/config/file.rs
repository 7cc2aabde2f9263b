use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A configuration file as written by the user; every value is optional and is merged with
/// command-line overrides and built-in defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub model: Option<FileModelConfig>,
    pub constants: Option<FileConstantsConfig>,
    pub compute: Option<FileComputeConfig>,
    pub survey: Option<FileSurveyConfig>,
    pub footprint: Option<FileFootprintConfig>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileModelConfig {
    pub dimensions: Option<[usize; 3]>,
    pub cell_size: Option<[f64; 3]>,
    pub origin: Option<[f64; 3]>,
    pub background_density: Option<f64>,
    #[serde(default, rename = "lithology")]
    pub lithologies: Vec<FileLithology>,
    #[serde(default, rename = "body")]
    pub bodies: Vec<FileBody>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileLithology {
    pub name: String,
    pub density: f64,
    #[serde(default)]
    pub susceptibility: f64,
    pub remanence: Option<FileRemanence>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileRemanence {
    pub intensity: f64,
    pub inclination: f64,
    pub declination: f64,
}

/// An axis-aligned body filled with one lithology; later bodies overwrite earlier ones.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBody {
    pub lithology: String,
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConstantsConfig {
    pub gravitational_constant: Option<f64>,
    pub field_intensity: Option<f64>,
    pub field_inclination: Option<f64>,
    pub field_declination: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileComputeConfig {
    pub field: Option<String>,
    pub max_workers: Option<usize>,
    pub chunk_size: Option<usize>,
    pub timeout_secs: Option<f64>,
}

/// Observation points of a `forward` run.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case",
    tag = "type",
    deny_unknown_fields
)]
pub enum FileSurveyConfig {
    /// A flat regular grid at `elevation` metres (positive up).
    Regular {
        origin: [f64; 2],
        spacing: [f64; 2],
        rows: usize,
        cols: usize,
        #[serde(default)]
        elevation: f64,
    },
    /// Points read from a delimited `x y elevation` file.
    Points {
        path: PathBuf,
        #[serde(default)]
        x_column: Option<usize>,
        #[serde(default)]
        y_column: Option<usize>,
        #[serde(default)]
        elevation_column: Option<usize>,
        #[serde(default)]
        elevation: Option<f64>,
    },
    /// The nodes of an elevation raster (ASCII grid), `clearance` metres above the surface.
    Drape {
        path: PathBuf,
        #[serde(default)]
        clearance: f64,
    },
    /// Cell centres of the model footprint, `height` metres above the model top.
    Footprint {
        #[serde(default)]
        height: Option<f64>,
    },
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileFootprintConfig {
    pub gravity_height: Option<f64>,
    pub magnetic_height: Option<f64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
