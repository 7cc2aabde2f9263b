use crate::core::io::traits::DataFile;
use crate::core::models::field::{FieldKind, FieldSample};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unrecognised sample table header: {0}")]
    UnknownHeader(String),
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

/// Observation points paired with the samples computed at them, in observation order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    pub points: Vec<Point3<f64>>,
    pub samples: Vec<FieldSample>,
}

impl SampleTable {
    pub fn new(points: Vec<Point3<f64>>, samples: Vec<FieldSample>) -> Self {
        Self { points, samples }
    }

    /// The field kind shared by every sample, or `None` if empty or mixed.
    pub fn kind(&self) -> Option<FieldKind> {
        let first = self.samples.first()?.kind();
        self.samples
            .iter()
            .all(|s| s.kind() == first)
            .then_some(first)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GravityRecord {
    index: usize,
    x: f64,
    y: f64,
    z: f64,
    gz: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct MagneticRecord {
    index: usize,
    x: f64,
    y: f64,
    z: f64,
    bx: f64,
    by: f64,
    bz: f64,
    total: f64,
}

/// Sample tables as CSV: `index,x,y,z,gz` for gravity or `index,x,y,z,bx,by,bz,total` for
/// magnetics.
pub struct SampleTableFile;

fn check_index(expected: usize, found: usize) -> Result<(), SampleFileError> {
    if expected == found {
        Ok(())
    } else {
        Err(SampleFileError::Inconsistency(format!(
            "row {expected} has index {found}"
        )))
    }
}

impl DataFile for SampleTableFile {
    type Content = SampleTable;
    type Error = SampleFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<SampleTable, SampleFileError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let has = |name: &str| headers.iter().any(|h| h == name);

        let mut table = SampleTable::new(Vec::new(), Vec::new());
        if has("gz") {
            for (row, record) in csv_reader.deserialize::<GravityRecord>().enumerate() {
                let record = record?;
                check_index(row, record.index)?;
                table.points.push(Point3::new(record.x, record.y, record.z));
                table.samples.push(FieldSample::Gravity { gz: record.gz });
            }
        } else if has("total") {
            for (row, record) in csv_reader.deserialize::<MagneticRecord>().enumerate() {
                let record = record?;
                check_index(row, record.index)?;
                table.points.push(Point3::new(record.x, record.y, record.z));
                table.samples.push(FieldSample::Magnetic {
                    b: Vector3::new(record.bx, record.by, record.bz),
                    total: record.total,
                });
            }
        } else {
            let header = headers.iter().collect::<Vec<_>>().join(",");
            return Err(SampleFileError::UnknownHeader(header));
        }
        Ok(table)
    }

    fn write_to(table: &SampleTable, writer: &mut impl Write) -> Result<(), SampleFileError> {
        if table.points.len() != table.samples.len() {
            return Err(SampleFileError::Inconsistency(format!(
                "{} points but {} samples",
                table.points.len(),
                table.samples.len()
            )));
        }
        let kind = match table.kind() {
            Some(kind) => kind,
            None if table.samples.is_empty() => FieldKind::Gravity,
            None => {
                return Err(SampleFileError::Inconsistency(
                    "sample table mixes gravity and magnetic samples".to_string(),
                ));
            }
        };

        let mut csv_writer = csv::Writer::from_writer(writer);
        if table.samples.is_empty() {
            match kind {
                FieldKind::Gravity => csv_writer.write_record(["index", "x", "y", "z", "gz"])?,
                FieldKind::Magnetic => csv_writer.write_record([
                    "index", "x", "y", "z", "bx", "by", "bz", "total",
                ])?,
            }
        }
        for (index, (p, sample)) in table.points.iter().zip(&table.samples).enumerate() {
            match *sample {
                FieldSample::Gravity { gz } => csv_writer.serialize(GravityRecord {
                    index,
                    x: p.x,
                    y: p.y,
                    z: p.z,
                    gz,
                })?,
                FieldSample::Magnetic { b, total } => csv_writer.serialize(MagneticRecord {
                    index,
                    x: p.x,
                    y: p.y,
                    z: p.z,
                    bx: b.x,
                    by: b.y,
                    bz: b.z,
                    total,
                })?,
            }
        }
        csv_writer.flush()?;
        Ok(())
    }
}
