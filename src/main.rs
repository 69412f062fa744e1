//! Immersive FX - Main Entry Point
//!
//! Loads settings, publishes the built-in components and serves them to the
//! configured OSC nodes from a fixed-rate control loop.

use tokio::sync::mpsc;

use immersive_fx::fx::register_builtin_components;
use immersive_fx::osc::{Inbound, OscEndpoint};
use immersive_fx::settings::FxSettings;
use immersive_fx::telemetry::{init_logging, LogConfig};
use immersive_fx::FxApp;

fn main() {
    let settings = FxSettings::load();

    let log_config = LogConfig {
        file_dir: Some(settings.data_dir.join("logs")),
        ..LogConfig::default()
    };
    // Keep the guard alive for the program duration
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("Immersive FX v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        data_dir = %settings.data_dir.display(),
        bpm = settings.bpm,
        tick_rate_hz = settings.tick_rate_hz,
        nodes = settings.osc.nodes.len(),
        "settings loaded"
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    runtime.block_on(run(settings));
}

async fn run(settings: FxSettings) {
    let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel::<Inbound>();
    let mut endpoints = Vec::with_capacity(settings.osc.nodes.len());
    for (node, node_settings) in settings.osc.nodes.iter().enumerate() {
        match OscEndpoint::bind(node, node_settings, inbound_tx.clone()).await {
            Ok(endpoint) => endpoints.push(Some(endpoint)),
            Err(e) => {
                tracing::error!(node, port = node_settings.local_port, "Failed to open OSC node: {}", e);
                endpoints.push(None);
            }
        }
    }
    drop(inbound_tx);

    let tick_interval = settings.tick_interval();
    let mut app = FxApp::new(settings);
    if let Err(e) = register_builtin_components(app.registry_mut()) {
        tracing::error!("Failed to register built-in components: {}", e);
        return;
    }
    app.start();

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last = tokio::time::Instant::now();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
        }

        while let Ok(Inbound { node, message }) = inbound_rx.try_recv() {
            app.receive(node, &message);
        }

        let now = tokio::time::Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;

        for (node, message) in app.tick(delta) {
            let Some(Some(endpoint)) = endpoints.get(node) else {
                continue;
            };
            if let Err(e) = endpoint.send(&message) {
                tracing::warn!(node, address = %message.address, "Failed to send OSC message: {}", e);
            }
        }
    }
}
