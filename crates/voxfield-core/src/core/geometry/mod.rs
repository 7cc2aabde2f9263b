//! # Geometry Module
//!
//! Rectangular prisms and the closed-form potential-field response of a single uniform prism.
//!
//! Every response function in this module is a pure function of its inputs. The handling of
//! observation points lying on a face, an edge or a vertex of a prism is centralised in a
//! private kernel module so that every prism in a model is evaluated under the same limiting
//! policy and results do not depend on summation order beyond floating-point rounding.

mod kernels;

pub mod gravity;
pub mod magnetic;
pub mod prism;

#[cfg(test)]
pub(crate) mod test_utils;

pub use gravity::{GRAVITATIONAL_CONSTANT, gravity_response, gravity_response_with};
pub use magnetic::{
    InducingField, direction_from_angles, magnetic_response, prism_field_from_magnetization,
    prism_tensor,
};
pub use prism::Prism;
