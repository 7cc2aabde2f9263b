mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_forward_settings, build_model_spec, build_survey_settings};
pub use models::{ModelSpec, SurveySpec};
