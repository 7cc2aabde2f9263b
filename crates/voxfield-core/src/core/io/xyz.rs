//! Delimited point files (`x y elevation`), such as survey station lists or flight-line
//! exports.
//!
//! The first line is treated as a header if it contains any alphabetic character. Lines are
//! split on commas if the first line contains a comma, and on whitespace otherwise.
//! Elevations are positive up and are negated into depth-positive `z`.

use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PointFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("File contains no data rows")]
    Empty,
}

/// Column selection for [`read_points`]; indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XyzColumns {
    pub x: usize,
    pub y: usize,
    /// Column holding elevation (positive up). When `None`, `default_elevation` is used.
    pub elevation: Option<usize>,
    pub default_elevation: f64,
}

impl Default for XyzColumns {
    fn default() -> Self {
        Self {
            x: 0,
            y: 1,
            elevation: Some(2),
            default_elevation: 0.0,
        }
    }
}

/// Layout detected from the first line of a point file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XyzLayout {
    pub has_header: bool,
    pub comma_delimited: bool,
}

impl XyzLayout {
    pub fn detect(first_line: &str) -> Self {
        Self {
            has_header: first_line.chars().any(|c| c.is_alphabetic()),
            comma_delimited: first_line.contains(','),
        }
    }
}

fn field(line: usize, fields: &[&str], column: usize) -> Result<f64, PointFileError> {
    let token = fields.get(column).ok_or_else(|| PointFileError::Parse {
        line,
        message: format!("missing column {column}"),
    })?;
    token.trim().parse().map_err(|_| PointFileError::Parse {
        line,
        message: format!("invalid number '{token}' in column {column}"),
    })
}

fn to_point(
    line: usize,
    fields: &[&str],
    columns: &XyzColumns,
) -> Result<Point3<f64>, PointFileError> {
    let x = field(line, fields, columns.x)?;
    let y = field(line, fields, columns.y)?;
    let elevation = match columns.elevation {
        Some(column) => field(line, fields, column)?,
        None => columns.default_elevation,
    };
    Ok(Point3::new(x, y, -elevation))
}

/// Reads observation points from a delimited text file.
///
/// # Errors
///
/// Returns [`PointFileError::Parse`] with a 1-based line number for malformed rows and
/// [`PointFileError::Empty`] if no data rows remain after the header.
pub fn read_points(
    reader: &mut impl BufRead,
    columns: &XyzColumns,
) -> Result<Vec<Point3<f64>>, PointFileError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let Some(first_line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return Err(PointFileError::Empty);
    };
    let layout = XyzLayout::detect(first_line);
    debug!(
        has_header = layout.has_header,
        comma_delimited = layout.comma_delimited,
        "Detected point file layout."
    );

    let mut points = Vec::new();
    if layout.comma_delimited {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(layout.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            let fields: Vec<&str> = record.iter().collect();
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }
            points.push(to_point(line, &fields, columns)?);
        }
    } else {
        let mut seen_first = false;
        for (index, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if !seen_first {
                seen_first = true;
                if layout.has_header {
                    continue;
                }
            }
            points.push(to_point(index + 1, &fields, columns)?);
        }
    }

    if points.is_empty() {
        return Err(PointFileError::Empty);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn detect_layout_from_first_line() {
        assert_eq!(
            XyzLayout::detect("x,y,elev"),
            XyzLayout {
                has_header: true,
                comma_delimited: true
            }
        );
        assert_eq!(
            XyzLayout::detect("100.0 200.0 35.5"),
            XyzLayout {
                has_header: false,
                comma_delimited: false
            }
        );
    }

    #[test]
    fn reads_comma_file_with_header() {
        let text = "easting, northing, elevation\n100, 200, 35.5\n\n110,200,36\n";
        let points = read_points(&mut Cursor::new(text), &XyzColumns::default()).unwrap();
        assert_eq!(
            points,
            vec![
                Point3::new(100.0, 200.0, -35.5),
                Point3::new(110.0, 200.0, -36.0)
            ]
        );
    }

    #[test]
    fn reads_whitespace_file_without_header() {
        let text = "1 2 3\n4\t5   6\n";
        let points = read_points(&mut Cursor::new(text), &XyzColumns::default()).unwrap();
        assert_eq!(points[1], Point3::new(4.0, 5.0, -6.0));
    }

    #[test]
    fn honours_column_selection_and_default_elevation() {
        let text = "id x y\n7 10 20\n";
        let columns = XyzColumns {
            x: 1,
            y: 2,
            elevation: None,
            default_elevation: 80.0,
        };
        let points = read_points(&mut Cursor::new(text), &columns).unwrap();
        assert_eq!(points, vec![Point3::new(10.0, 20.0, -80.0)]);
    }

    #[test]
    fn reports_line_of_malformed_value() {
        let text = "x y z\n1 2 3\n4 oops 6\n";
        let err = read_points(&mut Cursor::new(text), &XyzColumns::default()).unwrap_err();
        assert!(matches!(err, PointFileError::Parse { line: 3, .. }));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = read_points(&mut Cursor::new("x,y,z\n"), &XyzColumns::default()).unwrap_err();
        assert!(matches!(err, PointFileError::Empty));
    }
}
