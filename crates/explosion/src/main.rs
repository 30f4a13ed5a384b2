use explosion::config;
use explosion::host::Host;
use explosion::sys::runtime;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match config::write_default_config() {
        Ok(path) => log::info!("Using config at {}", path.display()),
        Err(e) => log::warn!("Could not write default config: {}", e),
    }

    let config = config::load_or_default();
    let mut host = Host::new(&config);

    let (tx, rx) = async_channel::bounded(256);

    // Start Background Services
    runtime::start_background_services(tx.clone());

    let started = Instant::now();
    log::info!(
        "Menu host ready with {} items, send touches with `orbit down X Y`",
        config.items.len()
    );

    while let Ok(event) = rx.recv_blocking() {
        host.update(event, started.elapsed());
    }

    Ok(())
}
