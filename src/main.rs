use std::sync::Arc;

use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod imaging;
mod logger;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path (without extension) may be passed as the first argument
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let state = Arc::new(config::AppState::new(&cfg));

    if state.routes.is_empty() {
        logger::log_warning("No image routes configured; only /health will be served");
    }
    for route in state.routes.iter() {
        if !route.base_dir.is_dir() {
            logger::log_warning(&format!(
                "Directory for route {} does not exist: {}",
                route.prefix,
                route.base_dir.display()
            ));
        }
    }
    logger::log_server_start(&addr, &cfg, &state.routes);

    let shutdown = Arc::new(Notify::new());
    server::spawn_shutdown_listener(Arc::clone(&shutdown));
    server::run_server(listener, state, shutdown).await;

    Ok(())
}
