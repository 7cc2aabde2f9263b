//! # Core Module
//!
//! This module provides the stateless building blocks of the forward-modelling engine.
//!
//! ## Architecture
//!
//! - **Geometry** ([`geometry`]) - Rectangular prisms and their closed-form gravity and
//!   magnetic responses, with a single numerically stable policy for singular points
//! - **Models** ([`models`]) - Voxel models, cell properties, lithologies, observation grids
//!   and field samples
//! - **File I/O** ([`io`]) - Voxel-model persistence, raster grids, point files and sample tables
//!
//! ## Scientific Foundation
//!
//! - **Prism gravity** after Plouff (1976) and Nagy, Papp & Benedek (2000)
//! - **Prism magnetics** through the second-derivative tensor of the Newtonian potential
//!   (Poisson's relation), equivalent to Bhattacharyya (1964)
//! - **Linear superposition** of induced and remanent magnetization, no self-demagnetization

pub mod geometry;
pub mod io;
pub mod models;
