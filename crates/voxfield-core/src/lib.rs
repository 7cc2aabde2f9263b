//! # Voxfield Core Library
//!
//! A high-performance library for 3-D potential-field forward modelling: given a voxelized
//! subsurface model carrying density, magnetic susceptibility and remanent magnetization, it
//! computes the gravity and magnetic response of that model at a set of observation points.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless geometry (`Prism` and its closed-form gravity and
//!   magnetic responses), data models (`VoxelModel`, `ObservationGrid`, `FieldSample`,
//!   lithologies) and conversion to and from files and raster grids.
//!
//! - **[`engine`]: The Logic Core.** Physical constants, run configuration, cancellation,
//!   progress reporting, the field accumulator and the parallel scheduler that partitions the
//!   observation set into disjoint output ranges.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures such as a single forward run
//!   ([`workflows::forward::ForwardModel`]) or a gravity + magnetic survey over the footprint
//!   of a model.
//!
//! ## Coordinate Frame
//!
//! All coordinates are in metres in a single Cartesian frame: `x` is easting, `y` is northing
//! and `z` is depth, positive **downward**. Observation points above the datum therefore have
//! negative `z`.

pub mod core;
pub mod engine;
pub mod workflows;
