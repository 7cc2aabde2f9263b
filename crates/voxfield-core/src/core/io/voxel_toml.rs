use crate::core::io::traits::DataFile;
use crate::core::models::error::ModelError;
use crate::core::models::properties::CellProperties;
use crate::core::models::voxel::VoxelModel;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid model: {0}")]
    Model(#[from] ModelError),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct GridHeader {
    dimensions: [usize; 3],
    cell_size: [f64; 3],
    origin: [f64; 3],
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct CellRecord {
    index: [usize; 3],
    #[serde(default)]
    density: f64,
    #[serde(default)]
    susceptibility: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remanence: Option<[f64; 3]>,
    #[serde(default = "default_active")]
    active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ModelDocument {
    grid: GridHeader,
    #[serde(default)]
    cells: Vec<CellRecord>,
}

/// Voxel models stored as TOML: a `[grid]` header followed by a sparse `[[cells]]` list.
///
/// ```toml
/// [grid]
/// dimensions = [20, 20, 10]
/// cell-size = [50.0, 50.0, 25.0]
/// origin = [0.0, 0.0, 0.0]
///
/// [[cells]]
/// index = [9, 9, 3]
/// density = 350.0
/// susceptibility = 0.02
/// remanence = [0.0, 0.0, 1.5]
/// active = true
/// ```
///
/// Cells equal to the default (inactive, zero properties) are omitted. Listed cells default to
/// active with zero properties when a key is absent. Values are written in shortest round-trip
/// form, so writing and reading back reproduces every property exactly.
pub struct VoxelModelFile;

impl DataFile for VoxelModelFile {
    type Content = VoxelModel;
    type Error = ModelFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<VoxelModel, ModelFileError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let document: ModelDocument = toml::from_str(&text)?;

        let [nx, ny, nz] = document.grid.dimensions;
        let [dx, dy, dz] = document.grid.cell_size;
        let [ox, oy, oz] = document.grid.origin;
        let mut model = VoxelModel::new((nx, ny, nz), (dx, dy, dz), Point3::new(ox, oy, oz))?;

        for record in document.cells {
            let [i, j, k] = record.index;
            let properties = CellProperties {
                density: record.density,
                susceptibility: record.susceptibility,
                remanence: record.remanence.map(Vector3::from),
                active: record.active,
            };
            model.set_cell(i, j, k, properties)?;
        }
        Ok(model)
    }

    fn write_to(model: &VoxelModel, writer: &mut impl Write) -> Result<(), ModelFileError> {
        let (nx, ny, nz) = model.dimensions();
        let (dx, dy, dz) = model.cell_size();
        let origin = model.origin();
        let document = ModelDocument {
            grid: GridHeader {
                dimensions: [nx, ny, nz],
                cell_size: [dx, dy, dz],
                origin: [origin.x, origin.y, origin.z],
            },
            cells: model
                .cells()
                .filter(|(_, cell)| !cell.is_default())
                .map(|((i, j, k), cell)| CellRecord {
                    index: [i, j, k],
                    density: cell.density,
                    susceptibility: cell.susceptibility,
                    remanence: cell.remanence.map(|r| [r.x, r.y, r.z]),
                    active: cell.active,
                })
                .collect(),
        };
        let text = toml::to_string(&document)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }
}
