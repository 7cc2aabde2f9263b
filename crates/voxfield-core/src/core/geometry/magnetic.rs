use super::kernels::{atan_ratio, corners, ln_sum};
use super::prism::Prism;
use nalgebra::{Matrix3, Point3, Unit, Vector3};
use std::f64::consts::PI;

/// `μ0 / 4π` expressed so that a magnetization in A/m yields a field in nT.
const NT_PER_AM: f64 = 100.0;

/// Unit vector of a field direction given inclination (positive down) and declination
/// (clockwise from north), both in degrees.
///
/// Components are `(east, north, down)`, matching the model frame.
pub fn direction_from_angles(inclination_deg: f64, declination_deg: f64) -> Unit<Vector3<f64>> {
    let inclination = inclination_deg.to_radians();
    let declination = declination_deg.to_radians();
    Unit::new_normalize(Vector3::new(
        inclination.cos() * declination.sin(),
        inclination.cos() * declination.cos(),
        inclination.sin(),
    ))
}

/// The ambient (inducing) geomagnetic field of a forward run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InducingField {
    intensity: f64,
    direction: Unit<Vector3<f64>>,
}

impl InducingField {
    /// Creates an inducing field from its intensity (nT), inclination and declination (degrees).
    pub fn new(intensity_nt: f64, inclination_deg: f64, declination_deg: f64) -> Self {
        Self {
            intensity: intensity_nt,
            direction: direction_from_angles(inclination_deg, declination_deg),
        }
    }

    #[inline]
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    #[inline]
    pub fn direction(&self) -> &Unit<Vector3<f64>> {
        &self.direction
    }

    /// The inducing field as a vector, in nT.
    pub fn field_vector(&self) -> Vector3<f64> {
        self.direction.into_inner() * self.intensity
    }

    /// The magnetizing field `H = B / μ0`, in A/m.
    pub fn magnetizing_field(&self) -> Vector3<f64> {
        self.direction.into_inner() * (self.intensity / (400.0 * PI))
    }

    /// Induced magnetization (A/m) of a body with the given SI susceptibility.
    pub fn induced_magnetization(&self, susceptibility: f64) -> Vector3<f64> {
        self.magnetizing_field() * susceptibility
    }

    /// Projects an anomalous field onto the inducing direction (total-field anomaly).
    #[inline]
    pub fn total_field_anomaly(&self, anomaly: &Vector3<f64>) -> f64 {
        anomaly.dot(&self.direction.into_inner())
    }
}

/// Second-derivative tensor of `∫ 1/R dV` over the prism, evaluated at `point`.
///
/// Outside the prism the tensor is traceless. Inside it the trace is `−4π` and the tensor
/// reduces to the demagnetizing tensor of the prism.
pub fn prism_tensor(prism: &Prism, point: &Point3<f64>) -> Matrix3<f64> {
    let mut xx = 0.0;
    let mut yy = 0.0;
    let mut zz = 0.0;
    let mut xy = 0.0;
    let mut xz = 0.0;
    let mut yz = 0.0;

    for c in corners(prism, point) {
        xx -= c.sign * atan_ratio(c.y * c.z, c.x * c.r);
        yy -= c.sign * atan_ratio(c.x * c.z, c.y * c.r);
        zz -= c.sign * atan_ratio(c.x * c.y, c.z * c.r);
        xy += c.sign * ln_sum(c.z, c.x, c.y, c.r);
        xz += c.sign * ln_sum(c.y, c.x, c.z, c.r);
        yz += c.sign * ln_sum(c.x, c.y, c.z, c.r);
    }

    Matrix3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz)
}

/// Anomalous magnetic field (nT) of a prism carrying a uniform magnetization (A/m).
pub fn prism_field_from_magnetization(
    prism: &Prism,
    point: &Point3<f64>,
    magnetization: &Vector3<f64>,
) -> Vector3<f64> {
    if *magnetization == Vector3::zeros() {
        return Vector3::zeros();
    }
    prism_tensor(prism, point) * magnetization * NT_PER_AM
}

/// Anomalous magnetic field (nT) of a prism with induced and optional remanent magnetization.
///
/// Magnetization is the linear sum `χ · H₀ + M_r`; self-demagnetization is ignored.
pub fn magnetic_response(
    prism: &Prism,
    point: &Point3<f64>,
    susceptibility: f64,
    remanence: Option<&Vector3<f64>>,
    ambient_field: &InducingField,
) -> Vector3<f64> {
    let mut magnetization = ambient_field.induced_magnetization(susceptibility);
    if let Some(remanent) = remanence {
        magnetization += remanent;
    }
    prism_field_from_magnetization(prism, point, &magnetization)
}
