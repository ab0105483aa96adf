use particle_engine::config::EngineConfig;

fn main() {
    let mut config = match EngineConfig::load_or_default() {
        Ok((config, _)) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    config.apply_env_overrides();

    if let Err(e) = particle_engine::core::Engine::run(config) {
        eprintln!("Engine failed to start: {}", e);
        std::process::exit(1);
    }
}
