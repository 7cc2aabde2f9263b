//! # Core Models Module
//!
//! Data structures describing what is modelled and where it is observed.
//!
//! ## Key Components
//!
//! - [`voxel`] - The regular voxel grid, its bounds-checked accessors and active-cell iteration
//! - [`properties`] - Per-cell density contrast, susceptibility, remanence and active flag
//! - [`lithology`] - Named rock units and construction of models from lithology-index volumes
//! - [`survey`] - Regular, scattered and draped observation grids
//! - [`field`] - Field kinds and the samples a forward run produces
//! - [`error`] - Validation errors shared by all model types
//!
//! ## Usage
//!
//! ```ignore
//! use voxfield::core::models::{voxel::VoxelModel, properties::Property};
//!
//! let mut model = VoxelModel::new((10, 10, 5), (50.0, 50.0, 25.0), Point3::origin())?;
//! model.set_property(4, 4, 2, Property::Density(300.0))?;
//! model.set_property(4, 4, 2, Property::Active(true))?;
//! ```

pub mod error;
pub mod field;
pub mod lithology;
pub mod properties;
pub mod survey;
pub mod voxel;
