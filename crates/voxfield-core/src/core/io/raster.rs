use crate::core::io::traits::DataFile;
use crate::core::models::field::{FieldComponent, FieldSample};
use crate::core::models::survey::{GridLayout, ObservationGrid};
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Null value written for cells without data.
pub const DEFAULT_NULL_VALUE: f64 = -99999.0;

#[derive(Debug, Error)]
pub enum GridFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

/// A north-up, point-registered raster.
///
/// `(tlx, tly)` is the coordinate of the top-left (north-west) node, `xdim` and `ydim` are the
/// node spacings, and `data` is row-major with row 0 on the northern edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    pub tlx: f64,
    pub tly: f64,
    pub xdim: f64,
    pub ydim: f64,
    pub rows: usize,
    pub cols: usize,
    pub null_value: f64,
    pub data: Vec<f64>,
}

impl RasterGrid {
    /// Builds a raster from the samples of a forward run on a regular grid.
    ///
    /// Observation grids store row 0 on the southern edge, so rows are flipped. Samples of the
    /// wrong kind or with non-finite values become null cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridFileError::Inconsistency`] if the grid is not regular or the sample count
    /// does not match the grid.
    pub fn from_samples(
        grid: &ObservationGrid,
        samples: &[FieldSample],
        component: FieldComponent,
    ) -> Result<Self, GridFileError> {
        let GridLayout::Regular {
            origin,
            spacing: (dx, dy),
            rows,
            cols,
        } = *grid.layout()
        else {
            return Err(GridFileError::Inconsistency(
                "only regular observation grids can be rasterised".to_string(),
            ));
        };
        if samples.len() != rows * cols {
            return Err(GridFileError::Inconsistency(format!(
                "{} samples for a {rows}x{cols} grid",
                samples.len()
            )));
        }

        let mut data = Vec::with_capacity(samples.len());
        for out_row in 0..rows {
            let grid_row = rows - 1 - out_row;
            for c in 0..cols {
                let value = component
                    .value(&samples[grid_row * cols + c])
                    .filter(|v| v.is_finite())
                    .unwrap_or(DEFAULT_NULL_VALUE);
                data.push(value);
            }
        }

        Ok(Self {
            tlx: origin.x,
            tly: origin.y + (rows - 1) as f64 * dy,
            xdim: dx,
            ydim: dy,
            rows,
            cols,
            null_value: DEFAULT_NULL_VALUE,
            data,
        })
    }

    /// The value at `(row, col)`, or `None` if out of range or null.
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let value = *self.data.get(row * self.cols + col)?;
        (value.is_finite() && value != self.null_value).then_some(value)
    }

    /// Easting of column `col`.
    #[inline]
    pub fn x_at(&self, col: usize) -> f64 {
        self.tlx + col as f64 * self.xdim
    }

    /// Northing of row `row`.
    #[inline]
    pub fn y_at(&self, row: usize) -> f64 {
        self.tly - row as f64 * self.ydim
    }

    /// Minimum and maximum of the non-null values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v != self.null_value)
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// ESRI ASCII grids.
///
/// The reader accepts `xllcenter`/`yllcenter` or `xllcorner`/`yllcorner`, and either
/// `cellsize` or separate `dx`/`dy`. Header keys are case-insensitive and `NODATA_value` is
/// optional. The writer emits centre registration and shortest round-trip values.
pub struct AsciiGridFile;

#[derive(Default)]
struct AsciiHeader {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<(f64, bool)>,
    yll: Option<(f64, bool)>,
    cellsize: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
    nodata: Option<f64>,
}

fn parse_number<T: std::str::FromStr>(line: usize, token: &str) -> Result<T, GridFileError> {
    token.parse().map_err(|_| GridFileError::Parse {
        line,
        message: format!("invalid number '{token}'"),
    })
}

impl DataFile for AsciiGridFile {
    type Content = RasterGrid;
    type Error = GridFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<RasterGrid, GridFileError> {
        let mut header = AsciiHeader::default();
        let mut data = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let mut tokens = line.split_whitespace().peekable();
            let Some(&first) = tokens.peek() else {
                continue;
            };

            let is_header = data.is_empty()
                && first
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic());
            if is_header {
                let key = first.to_ascii_lowercase();
                tokens.next();
                let value = tokens.next().ok_or_else(|| GridFileError::Parse {
                    line: line_number,
                    message: format!("header '{first}' has no value"),
                })?;
                match key.as_str() {
                    "ncols" => header.ncols = Some(parse_number(line_number, value)?),
                    "nrows" => header.nrows = Some(parse_number(line_number, value)?),
                    "xllcenter" => header.xll = Some((parse_number(line_number, value)?, true)),
                    "xllcorner" => header.xll = Some((parse_number(line_number, value)?, false)),
                    "yllcenter" => header.yll = Some((parse_number(line_number, value)?, true)),
                    "yllcorner" => header.yll = Some((parse_number(line_number, value)?, false)),
                    "cellsize" => header.cellsize = Some(parse_number(line_number, value)?),
                    "dx" => header.dx = Some(parse_number(line_number, value)?),
                    "dy" => header.dy = Some(parse_number(line_number, value)?),
                    "nodata_value" => header.nodata = Some(parse_number(line_number, value)?),
                    _ => {
                        return Err(GridFileError::Parse {
                            line: line_number,
                            message: format!("unknown header '{first}'"),
                        });
                    }
                }
                continue;
            }

            for token in tokens {
                data.push(parse_number::<f64>(line_number, token)?);
            }
        }

        let cols = header.ncols.ok_or(GridFileError::MissingHeader("ncols"))?;
        let rows = header.nrows.ok_or(GridFileError::MissingHeader("nrows"))?;
        let (xll, x_centre) = header.xll.ok_or(GridFileError::MissingHeader("xllcenter"))?;
        let (yll, y_centre) = header.yll.ok_or(GridFileError::MissingHeader("yllcenter"))?;
        let xdim = header
            .dx
            .or(header.cellsize)
            .ok_or(GridFileError::MissingHeader("cellsize"))?;
        let ydim = header
            .dy
            .or(header.cellsize)
            .ok_or(GridFileError::MissingHeader("cellsize"))?;

        if rows == 0 || cols == 0 {
            return Err(GridFileError::Inconsistency(format!(
                "grid must have at least one row and column, got {rows}x{cols}"
            )));
        }
        if !(xdim > 0.0 && ydim > 0.0 && xdim.is_finite() && ydim.is_finite()) {
            return Err(GridFileError::Inconsistency(format!(
                "cell size must be positive, got ({xdim}, {ydim})"
            )));
        }
        if data.len() != rows * cols {
            return Err(GridFileError::Inconsistency(format!(
                "expected {} values for a {rows}x{cols} grid, found {}",
                rows * cols,
                data.len()
            )));
        }

        let x_left = if x_centre { xll } else { xll + xdim / 2.0 };
        let y_bottom = if y_centre { yll } else { yll + ydim / 2.0 };

        Ok(RasterGrid {
            tlx: x_left,
            tly: y_bottom + (rows - 1) as f64 * ydim,
            xdim,
            ydim,
            rows,
            cols,
            null_value: header.nodata.unwrap_or(DEFAULT_NULL_VALUE),
            data,
        })
    }

    fn write_to(raster: &RasterGrid, writer: &mut impl Write) -> Result<(), GridFileError> {
        if raster.data.len() != raster.rows * raster.cols {
            return Err(GridFileError::Inconsistency(format!(
                "raster holds {} values for a {}x{} grid",
                raster.data.len(),
                raster.rows,
                raster.cols
            )));
        }

        writeln!(writer, "ncols {}", raster.cols)?;
        writeln!(writer, "nrows {}", raster.rows)?;
        writeln!(writer, "xllcenter {}", raster.tlx)?;
        writeln!(
            writer,
            "yllcenter {}",
            raster.tly - raster.rows.saturating_sub(1) as f64 * raster.ydim
        )?;
        if raster.xdim == raster.ydim {
            writeln!(writer, "cellsize {}", raster.xdim)?;
        } else {
            writeln!(writer, "dx {}", raster.xdim)?;
            writeln!(writer, "dy {}", raster.ydim)?;
        }
        writeln!(writer, "NODATA_value {}", raster.null_value)?;

        for row in raster.data.chunks(raster.cols.max(1)) {
            let line = row
                .iter()
                .map(|v| {
                    if v.is_finite() {
                        v.to_string()
                    } else {
                        raster.null_value.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}
