use crate::cli::ModelArgs;
use crate::config::{self, ModelSpec};
use crate::error::{CliError, Result};
use nalgebra::Point3;
use tracing::{info, warn};
use voxfield::core::io::traits::DataFile;
use voxfield::core::io::voxel_toml::VoxelModelFile;
use voxfield::core::models::voxel::VoxelModel;

pub fn run(args: ModelArgs) -> Result<()> {
    let spec = config::build_model_spec(&args)?;
    info!(
        dimensions = ?spec.dimensions,
        lithologies = spec.lithologies.len(),
        bodies = spec.bodies.len(),
        "Building voxel model."
    );

    let model = build_model(&spec)?;

    VoxelModelFile::write_to_path(&model, &args.output).map_err(|e| CliError::FileWriting {
        path: args.output.clone(),
        source: e.into(),
    })?;

    println!(
        "✓ Voxel model with {} active of {} cells written to: {}",
        model.active_count(),
        model.len(),
        args.output.display()
    );
    Ok(())
}

/// Creates the model grid and fills each body in order; later bodies overwrite earlier ones.
pub(crate) fn build_model(spec: &ModelSpec) -> Result<VoxelModel> {
    let mut model = VoxelModel::new(spec.dimensions, spec.cell_size, Point3::from(spec.origin))?;
    for (index, region) in &spec.bodies {
        let properties = spec.lithologies.cell_properties(*index)?;
        let assigned = model.fill_region(region, properties)?;
        let name = spec
            .lithologies
            .get(*index)
            .map_or("?", |lithology| lithology.name.as_str());
        if assigned == 0 {
            warn!(lithology = name, "Body contains no cell centres and was skipped.");
        } else {
            info!(lithology = name, cells = assigned, "Filled body.");
        }
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxfield::core::geometry::Prism;
    use voxfield::core::models::lithology::{Lithology, LithologyTable};

    fn spec() -> ModelSpec {
        let mut lithologies = LithologyTable::new(2670.0);
        let dyke = lithologies.add(Lithology::new("dyke", 2970.0, 0.02));
        let sill = lithologies.add(Lithology::new("sill", 2470.0, 0.0));
        ModelSpec {
            dimensions: (4, 2, 2),
            cell_size: (10.0, 10.0, 10.0),
            origin: [0.0, 0.0, 0.0],
            lithologies,
            bodies: vec![
                (dyke, Prism::from_bounds(0.0, 40.0, 0.0, 20.0, 0.0, 20.0).unwrap()),
                (sill, Prism::from_bounds(20.0, 40.0, 0.0, 20.0, 10.0, 20.0).unwrap()),
            ],
        }
    }

    #[test]
    fn later_bodies_overwrite_earlier_ones() {
        let model = build_model(&spec()).unwrap();
        assert_eq!(model.active_count(), 16);

        let dyke = model.cell(0, 0, 1).unwrap();
        assert!((dyke.density - 300.0).abs() < 1e-9);
        assert_eq!(dyke.susceptibility, 0.02);

        let sill = model.cell(3, 1, 1).unwrap();
        assert!((sill.density + 200.0).abs() < 1e-9);
        assert_eq!(sill.susceptibility, 0.0);
    }

    #[test]
    fn body_outside_the_grid_assigns_nothing() {
        let mut spec = spec();
        spec.bodies = vec![(1, Prism::from_bounds(100.0, 200.0, 0.0, 10.0, 0.0, 10.0).unwrap())];
        let model = build_model(&spec).unwrap();
        assert_eq!(model.active_count(), 0);
    }

    #[test]
    fn invalid_cell_size_is_a_model_error() {
        let mut spec = spec();
        spec.cell_size = (0.0, 10.0, 10.0);
        assert!(matches!(build_model(&spec), Err(CliError::Model(_))));
    }

    #[test]
    fn written_model_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("voxfield.toml");
        std::fs::write(
            &config_path,
            r#"
            [model]
            dimensions = [3, 3, 2]
            cell-size = [5.0, 5.0, 5.0]
            [[model.lithology]]
            name = "ore"
            density = 3400.0
            susceptibility = 0.1
            [[model.body]]
            lithology = "ore"
            min = [5.0, 5.0, 0.0]
            max = [10.0, 10.0, 5.0]
            "#,
        )
        .unwrap();
        let output = dir.path().join("model.toml");

        run(ModelArgs {
            config: config_path,
            output: output.clone(),
            set_values: vec![],
        })
        .unwrap();

        let model = VoxelModelFile::read_from_path(&output).unwrap();
        assert_eq!(model.dimensions(), (3, 3, 2));
        assert_eq!(model.active_count(), 1);
        assert_eq!(model.cell(1, 1, 0).unwrap().susceptibility, 0.1);
    }
}
