use nalgebra::{Point3, Vector3};

/// An axis-aligned rectangular prism with uniform physical properties.
///
/// A prism is immutable once constructed and always has strictly positive, finite extents
/// along all three axes. Voxel models never store prisms; they derive them on demand from
/// cell indices, the grid origin and the cell size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prism {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Prism {
    /// Creates a prism from its minimum and maximum corners.
    ///
    /// # Return
    ///
    /// Returns `None` if any coordinate is non-finite or if any extent is not strictly positive.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Option<Self> {
        let valid = (0..3).all(|axis| {
            min[axis].is_finite() && max[axis].is_finite() && max[axis] > min[axis]
        });
        valid.then_some(Self { min, max })
    }

    /// Creates a prism whose corners the caller has already validated.
    pub(crate) fn from_corners_unchecked(min: Point3<f64>, max: Point3<f64>) -> Self {
        debug_assert!((0..3).all(|axis| max[axis] > min[axis]));
        Self { min, max }
    }

    /// Creates a prism from its bounds in the order used by most geophysical texts:
    /// `(x_min, x_max, y_min, y_max, z_min, z_max)`.
    pub fn from_bounds(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        z_min: f64,
        z_max: f64,
    ) -> Option<Self> {
        Self::new(
            Point3::new(x_min, y_min, z_min),
            Point3::new(x_max, y_max, z_max),
        )
    }

    #[inline]
    pub fn min(&self) -> &Point3<f64> {
        &self.min
    }

    #[inline]
    pub fn max(&self) -> &Point3<f64> {
        &self.max
    }

    /// Edge lengths along `x`, `y` and `z`.
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Returns `true` if the point lies inside the prism or on its boundary.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Returns a copy of this prism shifted by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
