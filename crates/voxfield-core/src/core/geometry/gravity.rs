use super::kernels::{atan_ratio, corners, ln_sum};
use super::prism::Prism;
use nalgebra::Point3;

/// Newtonian gravitational constant (CODATA 2018), in m³ kg⁻¹ s⁻².
pub const GRAVITATIONAL_CONSTANT: f64 = 6.6743e-11;

const SI_TO_MGAL: f64 = 1.0e5;

/// Vertical gravity attraction of a uniform prism, in mGal, using the standard gravitational
/// constant.
///
/// The result is positive when the attracting mass lies below the observation point
/// (`z` increases downward) and scales linearly with `density` (kg/m³).
#[inline]
pub fn gravity_response(prism: &Prism, point: &Point3<f64>, density: f64) -> f64 {
    gravity_response_with(prism, point, density, GRAVITATIONAL_CONSTANT)
}

/// Vertical gravity attraction of a uniform prism, in mGal, for an explicit gravitational
/// constant.
///
/// Closed form after Nagy, Papp & Benedek (2000):
///
/// ```text
/// g_z = −Gρ Σ μ [x ln(y + r) + y ln(x + r) − z arctan(xy / zr)]
/// ```
///
/// evaluated over the eight vertices in coordinates relative to `point`.
pub fn gravity_response_with(
    prism: &Prism,
    point: &Point3<f64>,
    density: f64,
    gravitational_constant: f64,
) -> f64 {
    if density == 0.0 {
        return 0.0;
    }

    let sum: f64 = corners(prism, point)
        .iter()
        .map(|c| {
            c.sign
                * (c.x * ln_sum(c.y, c.x, c.z, c.r) + c.y * ln_sum(c.x, c.y, c.z, c.r)
                    - c.z * atan_ratio(c.x * c.y, c.z * c.r))
        })
        .sum();

    -gravitational_constant * density * sum * SI_TO_MGAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::test_utils::{integrate_over_prism, relative_error};
    use nalgebra::Vector3;

    fn unit_cube() -> Prism {
        Prism::from_bounds(0.0, 1.0, 0.0, 1.0, 0.0, 1.0).unwrap()
    }

    fn reference_gravity(prism: &Prism, point: &Point3<f64>, density: f64) -> f64 {
        let integral = integrate_over_prism(prism, 2, |source| {
            let d = source - point;
            d.z / d.norm().powi(3)
        });
        GRAVITATIONAL_CONSTANT * density * integral * SI_TO_MGAL
    }

    #[test]
    fn unit_voxel_ten_metres_above_corner_matches_quadrature() {
        let point = Point3::new(0.0, 0.0, -10.0);
        let value = gravity_response(&unit_cube(), &point, 1000.0);
        let reference = reference_gravity(&unit_cube(), &point, 1000.0);
        assert!(relative_error(value, reference) < 1e-6);
        assert!((value - 6.012802278e-5).abs() < 1e-13);
    }

    #[test]
    fn matches_quadrature_at_oblique_offsets() {
        let prism = Prism::from_bounds(-2.0, 3.0, 1.0, 2.5, 4.0, 6.0).unwrap();
        for point in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, -4.0, -3.0),
            Point3::new(0.5, 1.75, 12.0),
        ] {
            let value = gravity_response(&prism, &point, 250.0);
            let reference = reference_gravity(&prism, &point, 250.0);
            assert!(
                relative_error(value, reference) < 1e-6,
                "point {point:?}: {value} vs {reference}"
            );
        }
    }

    #[test]
    fn mass_below_point_attracts_downward() {
        let value = gravity_response(&unit_cube(), &Point3::new(0.5, 0.5, -5.0), 1000.0);
        assert!(value > 0.0);
    }

    #[test]
    fn mass_above_point_attracts_upward() {
        let value = gravity_response(&unit_cube(), &Point3::new(0.5, 0.5, 6.0), 1000.0);
        assert!(value < 0.0);
    }

    #[test]
    fn response_is_linear_in_density() {
        let point = Point3::new(3.0, 2.0, -1.0);
        let single = gravity_response(&unit_cube(), &point, 100.0);
        let triple = gravity_response(&unit_cube(), &point, 300.0);
        assert!(relative_error(triple, 3.0 * single) < 1e-14);
    }

    #[test]
    fn zero_density_returns_exact_zero() {
        let value = gravity_response(&unit_cube(), &Point3::new(0.0, 0.0, -1.0), 0.0);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn response_depends_only_on_relative_displacement() {
        let point = Point3::new(2.0, -1.0, -3.0);
        let offset = Vector3::new(1250.0, -730.0, 40.0);
        let original = gravity_response(&unit_cube(), &point, 1000.0);
        let moved = gravity_response(&unit_cube().translated(&offset), &(point + offset), 1000.0);
        assert!(relative_error(original, moved) < 1e-9);
    }

    #[test]
    fn far_field_approaches_point_mass() {
        let point = Point3::new(0.5, 0.5, -500.0);
        let value = gravity_response(&unit_cube(), &point, 1000.0);
        let distance = 500.5;
        let point_mass = GRAVITATIONAL_CONSTANT * 1000.0 / (distance * distance) * SI_TO_MGAL;
        assert!(relative_error(value, point_mass) < 1e-5);
    }

    #[test]
    fn singular_positions_stay_finite() {
        let prism = unit_cube();
        for point in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.5, 0.5, 0.0),
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, -3.0),
        ] {
            let value = gravity_response(&prism, &point, 1000.0);
            assert!(value.is_finite(), "non-finite gravity at {point:?}");
        }
    }

    #[test]
    fn point_on_top_face_matches_limit_from_above() {
        let prism = unit_cube();
        let on_face = gravity_response(&prism, &Point3::new(0.5, 0.5, 0.0), 1000.0);
        let just_above = gravity_response(&prism, &Point3::new(0.5, 0.5, -1e-9), 1000.0);
        assert!(relative_error(on_face, just_above) < 1e-6);
    }

    #[test]
    fn centre_of_prism_has_zero_vertical_attraction() {
        let value = gravity_response(&unit_cube(), &Point3::new(0.5, 0.5, 0.5), 1000.0);
        assert!(value.abs() < 1e-15);
    }
}
