//! # Engine Module
//!
//! This module implements the computational core of a forward run: it binds a voxel model
//! snapshot to an observation grid, sums the closed-form prism responses at every observation
//! point and distributes that work over a bounded worker pool.
//!
//! ## Overview
//!
//! A forward run is transient. It is created from explicit inputs (model, grid, physical
//! constants, field kind and a cancellation token), executed once and discarded. The engine
//! holds no global state; everything a run needs is passed in by the caller.
//!
//! ## Architecture
//!
//! - **Physical Constants** ([`constants`]) - Gravitational constant and the ambient inducing field
//! - **Configuration** ([`config`]) - Field kind, worker bound and chunk size of a run
//! - **Cancellation** ([`cancel`]) - Cooperative cancellation with optional deadlines
//! - **Progress Monitoring** ([`progress`]) - Non-blocking progress side channel
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//!
//! The run context, the field accumulator and the chunk scheduler are crate-private and are
//! driven through [`crate::workflows`].
//!
//! ## Determinism
//!
//! The observation set is split into contiguous chunks and every chunk owns a disjoint slice of
//! the pre-allocated output. Each observation is summed over the sources in voxel index order,
//! so results are bitwise identical for any worker count or chunk size.

pub(crate) mod accumulator;
pub mod cancel;
pub mod config;
pub mod constants;
pub(crate) mod context;
pub mod error;
pub mod progress;
pub(crate) mod scheduler;
