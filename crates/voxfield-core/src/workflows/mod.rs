//! # Workflows Module
//!
//! High-level procedures that turn a voxel model and a survey definition into computed fields.
//!
//! ## Overview
//!
//! Workflows are the entry points for users of the library. Each one validates its inputs,
//! builds a transient forward run, drives the parallel scheduler and reports its phases through
//! a [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! ## Architecture
//!
//! - **Forward Workflow** ([`forward`]) - One field kind over an arbitrary observation grid,
//!   plus the [`ForwardModel`](forward::ForwardModel) facade for repeated runs.
//! - **Survey Workflow** ([`survey`]) - Gravity and total-field magnetics over the footprint of
//!   a model, returned as north-up rasters.

pub mod forward;
pub mod survey;
