//! Provides input/output for the file formats exchanged with other tools.
//!
//! Voxel models are persisted as sparse TOML documents, computed fields are exported as CSV
//! sample tables or ESRI ASCII rasters, and observation points can be read from delimited
//! XYZ files. Formats that map to a single in-memory value share the [`traits::DataFile`]
//! interface.

pub mod raster;
pub mod samples;
pub mod traits;
pub mod voxel_toml;
pub mod xyz;
