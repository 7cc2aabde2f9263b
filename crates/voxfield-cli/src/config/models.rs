use std::path::PathBuf;
use std::time::Duration;
use voxfield::core::geometry::Prism;
use voxfield::core::io::xyz::XyzColumns;
use voxfield::core::models::lithology::LithologyTable;
use voxfield::engine::config::ForwardConfig;
use voxfield::engine::constants::PhysicalConstants;
use voxfield::workflows::survey::SurveySetup;

/// A resolved `[model]` section: grid geometry, lithologies and the bodies to fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub dimensions: (usize, usize, usize),
    pub cell_size: (f64, f64, f64),
    pub origin: [f64; 3],
    pub lithologies: LithologyTable,
    /// Lithology index and region of each body, in application order.
    pub bodies: Vec<(usize, Prism)>,
}

/// Where the observation points of a `forward` run come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SurveySpec {
    Regular {
        origin: [f64; 2],
        spacing: [f64; 2],
        rows: usize,
        cols: usize,
        elevation: f64,
    },
    Points {
        path: PathBuf,
        columns: XyzColumns,
    },
    Drape {
        path: PathBuf,
        clearance: f64,
    },
    Footprint {
        height: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardSettings {
    pub constants: PhysicalConstants,
    pub config: ForwardConfig,
    pub survey: SurveySpec,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurveySettings {
    pub constants: PhysicalConstants,
    pub config: ForwardConfig,
    pub setup: SurveySetup,
    pub timeout: Option<Duration>,
}
