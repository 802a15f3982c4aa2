use std::{env, error::Error, sync::Arc, thread};

use clap::Parser;
use tokio::sync::{mpsc, watch};

use padbridge::{
    bridge::{Bridge, BridgeState},
    config::Config,
    input::{detector::DeviceDetector, profile::ProfileRegistry, target::DualSenseFactory},
    watcher,
};

mod cli;

const BUFFER_SIZE: usize = 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args = cli::Args::parse();
    let log_level = match args.log_level.clone() {
        Some(value) => value,
        None => env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting padbridge v{}", VERSION);

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    log::debug!("Using config: {:?}", config);

    let detector = DeviceDetector::new(
        ProfileRegistry::default(),
        &config.input_dir,
        &config.hidraw_dir,
        &config.dmi_product_path,
    );
    let bridge = Bridge::new(
        config.clone(),
        Arc::new(detector),
        Arc::new(DualSenseFactory),
    );

    if config.hotplug {
        let (watcher_tx, watcher_rx) = mpsc::channel(BUFFER_SIZE);
        let paths = vec![config.input_dir.clone(), config.hidraw_dir.clone()];
        // Blocks on inotify for the lifetime of the process
        thread::spawn(move || {
            log::debug!("Started watcher thread");
            if let Err(e) = watcher::watch(paths, watcher_tx) {
                log::error!("Device watcher stopped: {e}");
            }
        });
        let hotplug = bridge.clone();
        tokio::spawn(async move { hotplug.run_hotplug(watcher_rx).await });
    }

    match bridge.start().await {
        Ok(true) => (),
        Ok(false) => log::info!("No supported controller found"),
        Err(e) => log::error!("Unable to bridge controller: {e}"),
    }
    if !config.hotplug && !bridge.is_connected().await {
        log::info!("Nothing to bridge, exiting");
        return Ok(());
    }

    let mut state_rx = bridge.subscribe();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                log::error!("Unable to listen for interrupt: {e}");
            }
            log::info!("Interrupted");
        }
        _ = wait_for_idle(&mut state_rx), if !config.hotplug => {
            log::info!("Controller is gone");
        }
    }

    bridge.shutdown().await;
    log::info!("padbridge stopped");

    Ok(())
}

/// Resolve once the bridge is back to idle
async fn wait_for_idle(rx: &mut watch::Receiver<BridgeState>) {
    if let Err(e) = rx.wait_for(|state| *state == BridgeState::Idle).await {
        log::debug!("Bridge state channel closed: {e}");
    }
}
