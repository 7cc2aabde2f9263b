use super::error::ModelError;
use super::voxel::VoxelModel;
use crate::core::io::raster::RasterGrid;
use nalgebra::Point3;

/// How the points of an [`ObservationGrid`] are arranged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridLayout {
    /// A row-major lattice: point `(r, c)` sits at `origin + (c·dx, r·dy, drape)`, with row 0 on
    /// the southern edge.
    Regular {
        origin: Point3<f64>,
        spacing: (f64, f64),
        rows: usize,
        cols: usize,
    },
    Scattered,
}

/// An ordered set of observation points in the model frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationGrid {
    points: Vec<Point3<f64>>,
    layout: GridLayout,
}

fn invalid(message: impl Into<String>) -> ModelError {
    ModelError::InvalidGrid(message.into())
}

impl ObservationGrid {
    /// Creates a flat regular grid at depth `origin.z`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidGrid`] if `rows` or `cols` is zero, if either spacing is not
    /// positive and finite, or if the origin is not finite.
    pub fn regular(
        origin: Point3<f64>,
        spacing: (f64, f64),
        rows: usize,
        cols: usize,
    ) -> Result<Self, ModelError> {
        if rows == 0 || cols == 0 {
            return Err(invalid(format!(
                "regular grid needs at least one row and one column, got {rows}x{cols}"
            )));
        }
        let (dx, dy) = spacing;
        if !(dx.is_finite() && dx > 0.0 && dy.is_finite() && dy > 0.0) {
            return Err(invalid(format!(
                "grid spacing must be positive and finite, got ({dx}, {dy})"
            )));
        }
        if !origin.iter().all(|c| c.is_finite()) {
            return Err(invalid("grid origin must be finite"));
        }
        let count = rows
            .checked_mul(cols)
            .ok_or_else(|| invalid("grid point count overflows"))?;

        let mut points = Vec::with_capacity(count);
        for r in 0..rows {
            for c in 0..cols {
                points.push(Point3::new(
                    origin.x + c as f64 * dx,
                    origin.y + r as f64 * dy,
                    origin.z,
                ));
            }
        }
        if !points.iter().all(|p| p.iter().all(|v| v.is_finite())) {
            return Err(invalid("grid extends beyond the representable range"));
        }

        Ok(Self {
            points,
            layout: GridLayout::Regular {
                origin,
                spacing,
                rows,
                cols,
            },
        })
    }

    /// Creates a grid from an explicit list of points.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidGrid`] if the list is empty or any coordinate is not finite.
    pub fn scattered(points: Vec<Point3<f64>>) -> Result<Self, ModelError> {
        if points.is_empty() {
            return Err(invalid("scattered grid needs at least one point"));
        }
        if let Some(position) = points
            .iter()
            .position(|p| !p.iter().all(|v| v.is_finite()))
        {
            return Err(invalid(format!("point {position} has a non-finite coordinate")));
        }
        Ok(Self {
            points,
            layout: GridLayout::Scattered,
        })
    }

    /// A regular grid over the cell centres of the model footprint, `height` metres above the
    /// top of the model.
    pub fn above_model(model: &VoxelModel, height: f64) -> Result<Self, ModelError> {
        if !height.is_finite() {
            return Err(invalid(format!("observation height must be finite, got {height}")));
        }
        let (nx, ny, _) = model.dimensions();
        let (dx, dy, _) = model.cell_size();
        let origin = model.origin();
        Self::regular(
            Point3::new(
                origin.x + dx / 2.0,
                origin.y + dy / 2.0,
                model.top() - height,
            ),
            (dx, dy),
            ny,
            nx,
        )
    }

    /// A regular grid on the nodes of an elevation raster, `clearance` metres above the surface.
    ///
    /// Raster row 0 is north; grid row 0 is south, so rows are flipped.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidGrid`] if the raster contains null cells or has an invalid
    /// geometry.
    pub fn draped_over(raster: &RasterGrid, clearance: f64) -> Result<Self, ModelError> {
        if !clearance.is_finite() {
            return Err(invalid(format!("clearance must be finite, got {clearance}")));
        }
        let (rows, cols) = (raster.rows, raster.cols);
        if rows == 0 || cols == 0 {
            return Err(invalid("elevation raster is empty"));
        }
        let mut drape = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let elevation = raster.value_at(rows - 1 - r, c).ok_or_else(|| {
                    invalid(format!(
                        "elevation raster has no value at row {}, column {c}",
                        rows - 1 - r
                    ))
                })?;
                drape.push(-(elevation + clearance));
            }
        }
        let origin = Point3::new(raster.tlx, raster.tly - (rows - 1) as f64 * raster.ydim, 0.0);
        Self::regular(origin, (raster.xdim, raster.ydim), rows, cols)?.with_drape(&drape)
    }

    /// Adds a per-point vertical offset to every point.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidGrid`] if `offsets` does not have one finite entry per point.
    pub fn with_drape(mut self, offsets: &[f64]) -> Result<Self, ModelError> {
        if offsets.len() != self.points.len() {
            return Err(invalid(format!(
                "drape has {} offsets but the grid has {} points",
                offsets.len(),
                self.points.len()
            )));
        }
        if let Some(position) = offsets.iter().position(|v| !v.is_finite()) {
            return Err(invalid(format!("drape offset {position} is not finite")));
        }
        for (point, offset) in self.points.iter_mut().zip(offsets) {
            point.z += offset;
        }
        Ok(self)
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[inline]
    pub fn is_regular(&self) -> bool {
        matches!(self.layout, GridLayout::Regular { .. })
    }
}
