//! redtri - draws a red triangle on a black background

use redtri::config::AppConfig;
use redtri::scene;
use redtri::toolkit::{Toolkit, ToolkitError};

fn run(config: &AppConfig) -> Result<(), ToolkitError> {
    let (mut toolkit, _args) = Toolkit::init(std::env::args())?;
    scene::setup(toolkit.state_mut())?;
    toolkit.main_loop(config.gpu_options())
}

fn main() {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.debug.log_level),
    )
    .init();

    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting redtri");

    if let Err(e) = run(&config) {
        eprintln!("redtri: {}", e);
        std::process::exit(1);
    }
}
