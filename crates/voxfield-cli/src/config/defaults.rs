use voxfield::core::models::lithology::DEFAULT_BACKGROUND_DENSITY;
use voxfield::engine::constants::PhysicalConstants;
use voxfield::workflows::survey::SurveySetup;

pub struct DefaultsConfig {
    pub origin: [f64; 3],
    pub background_density: f64,
    pub constants: PhysicalConstants,
    pub field: String,
    pub footprint_height: f64,
    pub footprint: SurveySetup,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0, 0.0],
            background_density: DEFAULT_BACKGROUND_DENSITY,
            constants: PhysicalConstants::default(),
            field: "gravity".to_string(),
            footprint_height: 1.0,
            footprint: SurveySetup::default(),
        }
    }
}
