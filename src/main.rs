use rt_scene_viewer::utils;
use rt_scene_viewer::viewer::cli::{CLI, CliCommand};
use rt_scene_viewer::viewer::mock_data::ScenePreset;
use rt_scene_viewer::viewer::windowing::Windowing;
use rt_scene_viewer::viewer::{ViewerConfig, ViewerResult};

fn main() {
    utils::logger::init();

    if let Err(err) = run(CLI::parse()) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run(cli: CLI) -> ViewerResult<()> {
    let config = match &cli.config {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        CliCommand::Save { filename } => {
            ScenePreset::default().write_json_file(&filename)?;
            log::info!("Scene preset written to {}", filename);
            Ok(())
        }
        CliCommand::Load { filename } => {
            let preset = ScenePreset::from_json_file(&filename)?;
            log::info!(
                "Loaded {} ROIs and {} beams from {}",
                preset.rois.len(),
                preset.beams.len(),
                filename
            );
            Windowing::run_app(config, preset)
        }
        CliCommand::Run => Windowing::run_app(config, ScenePreset::default()),
    }
}
