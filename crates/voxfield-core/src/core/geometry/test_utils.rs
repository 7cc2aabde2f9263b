use super::prism::Prism;
use nalgebra::{Point3, Vector3};

fn gauss_legendre_5() -> ([f64; 5], [f64; 5]) {
    let a = (5.0 - 2.0 * (10.0_f64 / 7.0).sqrt()).sqrt() / 3.0;
    let b = (5.0 + 2.0 * (10.0_f64 / 7.0).sqrt()).sqrt() / 3.0;
    let wa = (322.0 + 13.0 * 70.0_f64.sqrt()) / 900.0;
    let wb = (322.0 - 13.0 * 70.0_f64.sqrt()) / 900.0;
    ([-b, -a, 0.0, a, b], [wb, wa, 128.0 / 225.0, wa, wb])
}

/// Integrates `f` over the prism with a tensor-product 5-point Gauss–Legendre rule applied to
/// each of `subdivisions³` sub-boxes.
pub(crate) fn integrate_over_prism<F>(prism: &Prism, subdivisions: usize, f: F) -> f64
where
    F: Fn(Point3<f64>) -> f64,
{
    let (nodes, weights) = gauss_legendre_5();
    let step = prism.size() / subdivisions as f64;
    let half = step / 2.0;
    let mut total = 0.0;

    for si in 0..subdivisions {
        for sj in 0..subdivisions {
            for sk in 0..subdivisions {
                let centre = prism.min()
                    + Vector3::new(
                        (si as f64 + 0.5) * step.x,
                        (sj as f64 + 0.5) * step.y,
                        (sk as f64 + 0.5) * step.z,
                    );
                for (u, wu) in nodes.iter().zip(weights.iter()) {
                    for (v, wv) in nodes.iter().zip(weights.iter()) {
                        for (w, ww) in nodes.iter().zip(weights.iter()) {
                            let source = centre
                                + Vector3::new(u * half.x, v * half.y, w * half.z);
                            total += wu * wv * ww * f(source);
                        }
                    }
                }
            }
        }
    }
    total * half.x * half.y * half.z
}

pub(crate) fn relative_error(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        value.abs()
    } else {
        ((value - reference) / reference).abs()
    }
}
