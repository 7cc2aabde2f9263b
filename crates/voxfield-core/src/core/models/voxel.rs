use super::error::{Index3, ModelError};
use super::properties::{CellProperties, Property, PropertyField};
use crate::core::geometry::Prism;
use nalgebra::{Point3, Vector3};

/// An active cell as seen by a forward run: its index, properties and derived prism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveCell {
    pub index: Index3,
    /// Position of the cell in voxel index order.
    pub linear_index: usize,
    pub properties: CellProperties,
    pub prism: Prism,
}

/// A regular 3-D grid of rectangular cells with per-cell physical properties.
///
/// Cell `(i, j, k)` spans `[ox + i·dx, ox + (i+1)·dx] × [oy + j·dy, …] × [oz + k·dz, …]`, where
/// `z` is depth, positive downward. Cells are stored in lexicographic `(i, j, k)` order with `k`
/// varying fastest; this is the order in which forward runs sum cell contributions.
///
/// The dimensions are fixed at construction and every indexed access is bounds checked.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelModel {
    dimensions: Index3,
    cell_size: Vector3<f64>,
    origin: Point3<f64>,
    cells: Vec<CellProperties>,
}

#[inline]
fn cell_bound(origin: f64, size: f64, index: usize) -> f64 {
    origin + index as f64 * size
}

impl VoxelModel {
    /// Creates a model with every cell inactive and all properties zero.
    ///
    /// # Arguments
    ///
    /// * `dimensions` - Number of cells `(nx, ny, nz)` along `x`, `y` and `z`.
    /// * `cell_size` - Cell edge lengths `(dx, dy, dz)` in metres.
    /// * `origin` - Minimum corner of cell `(0, 0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidDimensions`] if any dimension is zero or the cells cannot
    /// be allocated, [`ModelError::InvalidCellSize`] if any cell size is not positive and finite
    /// (or is too small to be resolved at the model's coordinates), and
    /// [`ModelError::InvalidOrigin`] if the origin is not finite.
    pub fn new(
        dimensions: Index3,
        cell_size: (f64, f64, f64),
        origin: Point3<f64>,
    ) -> Result<Self, ModelError> {
        let (nx, ny, nz) = dimensions;
        let len = nx
            .checked_mul(ny)
            .and_then(|n| n.checked_mul(nz))
            .filter(|&n| n > 0)
            .ok_or(ModelError::InvalidDimensions(dimensions))?;

        let size = Vector3::new(cell_size.0, cell_size.1, cell_size.2);
        if !size.iter().all(|d| d.is_finite() && *d > 0.0) {
            return Err(ModelError::InvalidCellSize(cell_size));
        }
        if !origin.iter().all(|c| c.is_finite()) {
            return Err(ModelError::InvalidOrigin((origin.x, origin.y, origin.z)));
        }

        // Cell bounds grow monotonically, so checking the two end cells covers every cell.
        let counts = [nx, ny, nz];
        for axis in 0..3 {
            for index in [0, counts[axis] - 1] {
                let lo = cell_bound(origin[axis], size[axis], index);
                let hi = cell_bound(origin[axis], size[axis], index + 1);
                if !(hi.is_finite() && hi > lo) {
                    return Err(ModelError::InvalidCellSize(cell_size));
                }
            }
        }

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| ModelError::InvalidDimensions(dimensions))?;
        cells.resize(len, CellProperties::default());

        Ok(Self {
            dimensions,
            cell_size: size,
            origin,
            cells,
        })
    }

    #[inline]
    pub fn dimensions(&self) -> Index3 {
        self.dimensions
    }

    #[inline]
    pub fn cell_size(&self) -> (f64, f64, f64) {
        (self.cell_size.x, self.cell_size.y, self.cell_size.z)
    }

    #[inline]
    pub fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    /// Total number of cells, active or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.active).count()
    }

    /// Depth of the top of the model (the minimum `z`).
    #[inline]
    pub fn top(&self) -> f64 {
        self.origin.z
    }

    /// The bounding box of the whole model.
    pub fn extent(&self) -> Prism {
        let (nx, ny, nz) = self.dimensions;
        let max = Point3::new(
            cell_bound(self.origin.x, self.cell_size.x, nx),
            cell_bound(self.origin.y, self.cell_size.y, ny),
            cell_bound(self.origin.z, self.cell_size.z, nz),
        );
        Prism::from_corners_unchecked(self.origin, max)
    }

    /// Position of cell `(i, j, k)` in voxel index order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::OutOfBounds`] if any index is outside the model.
    pub fn linear_index(&self, i: usize, j: usize, k: usize) -> Result<usize, ModelError> {
        let (nx, ny, nz) = self.dimensions;
        if i >= nx || j >= ny || k >= nz {
            return Err(ModelError::OutOfBounds {
                index: (i, j, k),
                dimensions: self.dimensions,
            });
        }
        Ok((i * ny + j) * nz + k)
    }

    /// Inverse of [`VoxelModel::linear_index`].
    pub fn index_of(&self, linear_index: usize) -> Option<Index3> {
        if linear_index >= self.cells.len() {
            return None;
        }
        let (_, ny, nz) = self.dimensions;
        let k = linear_index % nz;
        let j = (linear_index / nz) % ny;
        let i = linear_index / (nz * ny);
        Some((i, j, k))
    }

    pub fn cell(&self, i: usize, j: usize, k: usize) -> Result<&CellProperties, ModelError> {
        let n = self.linear_index(i, j, k)?;
        Ok(&self.cells[n])
    }

    /// Replaces every property of a cell.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::OutOfBounds`] for an invalid index and
    /// [`ModelError::InvalidProperty`] if any value is non-finite. The model is left unchanged
    /// on error.
    pub fn set_cell(
        &mut self,
        i: usize,
        j: usize,
        k: usize,
        properties: CellProperties,
    ) -> Result<(), ModelError> {
        let n = self.linear_index(i, j, k)?;
        properties.validate()?;
        self.cells[n] = properties;
        Ok(())
    }

    /// Sets a single property of a cell, leaving the others untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::OutOfBounds`] for an invalid index and
    /// [`ModelError::InvalidProperty`] for a non-finite value.
    pub fn set_property(
        &mut self,
        i: usize,
        j: usize,
        k: usize,
        property: Property,
    ) -> Result<(), ModelError> {
        let n = self.linear_index(i, j, k)?;
        self.cells[n].apply(property)
    }

    /// Reads a single property of a cell.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::OutOfBounds`] for an invalid index.
    pub fn get_property(
        &self,
        i: usize,
        j: usize,
        k: usize,
        field: PropertyField,
    ) -> Result<Property, ModelError> {
        Ok(self.cell(i, j, k)?.get(field))
    }

    /// The prism occupied by cell `(i, j, k)`.
    pub fn prism_at(&self, i: usize, j: usize, k: usize) -> Result<Prism, ModelError> {
        self.linear_index(i, j, k)?;
        Ok(self.cell_prism((i, j, k)))
    }

    fn cell_prism(&self, (i, j, k): Index3) -> Prism {
        let o = &self.origin;
        let d = &self.cell_size;
        Prism::from_corners_unchecked(
            Point3::new(
                cell_bound(o.x, d.x, i),
                cell_bound(o.y, d.y, j),
                cell_bound(o.z, d.z, k),
            ),
            Point3::new(
                cell_bound(o.x, d.x, i + 1),
                cell_bound(o.y, d.y, j + 1),
                cell_bound(o.z, d.z, k + 1),
            ),
        )
    }

    /// Every cell with its index, in voxel index order.
    pub fn cells(&self) -> impl Iterator<Item = (Index3, &CellProperties)> + '_ {
        let (_, ny, nz) = self.dimensions;
        self.cells
            .iter()
            .enumerate()
            .map(move |(n, cell)| ((n / (ny * nz), (n / nz) % ny, n % nz), cell))
    }

    /// Iterates over the active cells in voxel index order.
    ///
    /// The iterator is lazy and borrows the model; call this again to restart.
    pub fn iterate_active(&self) -> impl Iterator<Item = ActiveCell> + '_ {
        self.cells()
            .enumerate()
            .filter(|(_, (_, cell))| cell.active)
            .map(move |(linear_index, (index, cell))| ActiveCell {
                index,
                linear_index,
                properties: *cell,
                prism: self.cell_prism(index),
            })
    }

    /// Assigns `properties` to every cell whose centre lies inside `region` (boundary included).
    ///
    /// # Return
    ///
    /// Returns the number of cells assigned.
    pub fn fill_region(
        &mut self,
        region: &Prism,
        properties: CellProperties,
    ) -> Result<usize, ModelError> {
        properties.validate()?;
        let mut assigned = 0;
        for n in 0..self.cells.len() {
            let Some(index) = self.index_of(n) else {
                continue;
            };
            if region.contains(&self.cell_prism(index).center()) {
                self.cells[n] = properties;
                assigned += 1;
            }
        }
        Ok(assigned)
    }

    /// Returns `true` if both models have identical dimensions, cell size and origin.
    pub fn same_geometry(&self, other: &VoxelModel) -> bool {
        self.dimensions == other.dimensions
            && self.cell_size == other.cell_size
            && self.origin == other.origin
    }

    /// Builds the union of two models with identical geometry.
    ///
    /// Each cell of the result takes its properties from whichever model has it active. Cells
    /// inactive in both keep the properties of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::GeometryMismatch`] if the geometries differ and
    /// [`ModelError::Overlap`] for the first cell active in both models.
    pub fn merge_disjoint(&self, other: &VoxelModel) -> Result<VoxelModel, ModelError> {
        if !self.same_geometry(other) {
            return Err(ModelError::GeometryMismatch);
        }
        let mut merged = self.clone();
        for (n, (mine, theirs)) in self.cells.iter().zip(&other.cells).enumerate() {
            match (mine.active, theirs.active) {
                (true, true) => {
                    let index = self.index_of(n).unwrap_or_default();
                    return Err(ModelError::Overlap { index });
                }
                (false, true) => merged.cells[n] = *theirs,
                _ => {}
            }
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> VoxelModel {
        VoxelModel::new((3, 4, 5), (10.0, 20.0, 5.0), Point3::new(100.0, 200.0, 0.0)).unwrap()
    }

    #[test]
    fn new_creates_inactive_cells() {
        let model = model();
        assert_eq!(model.len(), 60);
        assert_eq!(model.active_count(), 0);
        assert_eq!(model.dimensions(), (3, 4, 5));
        assert_eq!(model.cell_size(), (10.0, 20.0, 5.0));
        assert_eq!(model.iterate_active().count(), 0);
    }

    #[test]
    fn new_rejects_zero_dimension() {
        let err = VoxelModel::new((3, 0, 5), (1.0, 1.0, 1.0), Point3::origin()).unwrap_err();
        assert_eq!(err, ModelError::InvalidDimensions((3, 0, 5)));
    }

    #[test]
    fn new_rejects_overflowing_dimensions() {
        let err =
            VoxelModel::new((usize::MAX, 2, 1), (1.0, 1.0, 1.0), Point3::origin()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidDimensions(_)));
    }

    #[test]
    fn new_rejects_dimensions_too_large_to_allocate() {
        let dimensions = (1_000_000, 1_000_000, 1_000_000);
        let err = VoxelModel::new(dimensions, (1.0, 1.0, 1.0), Point3::origin()).unwrap_err();
        assert_eq!(err, ModelError::InvalidDimensions(dimensions));
    }

    #[test]
    fn new_rejects_non_positive_or_non_finite_cell_size() {
        for size in [(0.0, 1.0, 1.0), (1.0, -2.0, 1.0), (1.0, 1.0, f64::NAN)] {
            let err = VoxelModel::new((1, 1, 1), size, Point3::origin()).unwrap_err();
            assert!(matches!(err, ModelError::InvalidCellSize(_)));
        }
    }

    #[test]
    fn new_rejects_unresolvable_cell_size() {
        let err = VoxelModel::new((2, 1, 1), (1e-12, 1.0, 1.0), Point3::new(1e9, 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidCellSize(_)));
    }

    #[test]
    fn new_rejects_non_finite_origin() {
        let err =
            VoxelModel::new((1, 1, 1), (1.0, 1.0, 1.0), Point3::new(f64::INFINITY, 0.0, 0.0))
                .unwrap_err();
        assert!(matches!(err, ModelError::InvalidOrigin(_)));
    }

    #[test]
    fn linear_index_runs_k_fastest() {
        let model = model();
        assert_eq!(model.linear_index(0, 0, 1).unwrap(), 1);
        assert_eq!(model.linear_index(0, 1, 0).unwrap(), 5);
        assert_eq!(model.linear_index(1, 0, 0).unwrap(), 20);
        assert_eq!(model.index_of(27), Some((1, 1, 2)));
        assert_eq!(model.index_of(60), None);
    }

    #[test]
    fn out_of_bounds_access_is_reported_with_dimensions() {
        let mut model = model();
        let expected = ModelError::OutOfBounds {
            index: (3, 0, 0),
            dimensions: (3, 4, 5),
        };
        assert_eq!(model.cell(3, 0, 0).unwrap_err(), expected);
        assert_eq!(
            model
                .set_property(3, 0, 0, Property::Density(1.0))
                .unwrap_err(),
            expected
        );
        assert!(model.get_property(0, 4, 0, PropertyField::Active).is_err());
        assert!(model.prism_at(0, 0, 5).is_err());
    }

    #[test]
    fn set_property_and_get_property_round_trip() {
        let mut model = model();
        model.set_property(1, 2, 3, Property::Density(-150.0)).unwrap();
        model.set_property(1, 2, 3, Property::Active(true)).unwrap();
        let remanence = Some(Vector3::new(0.1, 0.2, 0.3));
        model
            .set_property(1, 2, 3, Property::Remanence(remanence))
            .unwrap();

        assert_eq!(
            model.get_property(1, 2, 3, PropertyField::Density).unwrap(),
            Property::Density(-150.0)
        );
        assert_eq!(
            model.get_property(1, 2, 3, PropertyField::Remanence).unwrap(),
            Property::Remanence(remanence)
        );
        assert_eq!(model.active_count(), 1);
    }

    #[test]
    fn set_cell_rejects_non_finite_properties_without_mutating() {
        let mut model = model();
        let bad = CellProperties::new(f64::NAN, 0.0);
        assert!(model.set_cell(0, 0, 0, bad).is_err());
        assert!(model.cell(0, 0, 0).unwrap().is_default());
    }

    #[test]
    fn prism_at_is_derived_from_origin_and_cell_size() {
        let prism = model().prism_at(2, 1, 4).unwrap();
        assert_eq!(*prism.min(), Point3::new(120.0, 220.0, 20.0));
        assert_eq!(*prism.max(), Point3::new(130.0, 240.0, 25.0));
    }

    #[test]
    fn extent_covers_all_cells() {
        let extent = model().extent();
        assert_eq!(*extent.min(), Point3::new(100.0, 200.0, 0.0));
        assert_eq!(*extent.max(), Point3::new(130.0, 280.0, 25.0));
    }

    #[test]
    fn iterate_active_yields_cells_in_index_order_and_restarts() {
        let mut model = model();
        model.set_cell(2, 0, 0, CellProperties::new(1.0, 0.0)).unwrap();
        model.set_cell(0, 3, 1, CellProperties::new(2.0, 0.0)).unwrap();
        model.set_cell(0, 3, 0, CellProperties::new(3.0, 0.0)).unwrap();

        let indices: Vec<_> = model.iterate_active().map(|c| c.index).collect();
        assert_eq!(indices, vec![(0, 3, 0), (0, 3, 1), (2, 0, 0)]);

        let linear: Vec<_> = model.iterate_active().map(|c| c.linear_index).collect();
        assert_eq!(linear, vec![15, 16, 40]);

        let first = model.iterate_active().next().unwrap();
        assert_eq!(first.prism, model.prism_at(0, 3, 0).unwrap());
        assert_eq!(first.properties.density, 3.0);
    }

    #[test]
    fn fill_region_assigns_cells_by_centre() {
        let mut model = model();
        let region = Prism::from_bounds(100.0, 112.0, 200.0, 280.0, 0.0, 10.0).unwrap();
        let assigned = model
            .fill_region(&region, CellProperties::new(300.0, 0.02))
            .unwrap();
        assert_eq!(assigned, 4 * 2);
        assert_eq!(model.active_count(), 8);
        assert!(model.cell(0, 3, 1).unwrap().active);
        assert!(!model.cell(1, 0, 0).unwrap().active);
    }

    #[test]
    fn merge_disjoint_combines_active_cells() {
        let mut a = model();
        let mut b = model();
        a.set_cell(0, 0, 0, CellProperties::new(1.0, 0.0)).unwrap();
        b.set_cell(1, 1, 1, CellProperties::new(0.0, 0.5)).unwrap();

        let merged = a.merge_disjoint(&b).unwrap();
        assert_eq!(merged.active_count(), 2);
        assert_eq!(merged.cell(1, 1, 1).unwrap().susceptibility, 0.5);
    }

    #[test]
    fn merge_disjoint_rejects_overlap() {
        let mut a = model();
        let mut b = model();
        a.set_cell(2, 3, 4, CellProperties::new(1.0, 0.0)).unwrap();
        b.set_cell(2, 3, 4, CellProperties::new(2.0, 0.0)).unwrap();
        assert_eq!(
            a.merge_disjoint(&b).unwrap_err(),
            ModelError::Overlap { index: (2, 3, 4) }
        );
    }

    #[test]
    fn merge_disjoint_rejects_geometry_mismatch() {
        let a = model();
        let b = VoxelModel::new((3, 4, 5), (10.0, 20.0, 5.0), Point3::origin()).unwrap();
        assert_eq!(
            a.merge_disjoint(&b).unwrap_err(),
            ModelError::GeometryMismatch
        );
    }
}
