use dispatch::Worker;
use log::{error, info};
use push::Manager;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!(
        "Starting connect platform [{}] on {}:{}",
        config.runtime_env(),
        config.interface.as_deref().unwrap_or("127.0.0.1"),
        config.port
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let push_manager = Arc::new(Manager::new());

    let (dispatch_queue, job_receiver) = dispatch::channel();
    let worker = Worker::new(
        db.clone(),
        push_manager.clone(),
        config.dispatch_max_attempts,
        Duration::from_millis(config.dispatch_retry_base_ms),
    );
    tokio::spawn(worker.run(job_receiver));

    let listen_address = format!(
        "{}:{}",
        config.interface.as_deref().unwrap_or("127.0.0.1"),
        config.port
    );

    let app_state = AppState::new(config, &db, push_manager, dispatch_queue);
    let router = web::router::define_routes(app_state);

    let listener = match tokio::net::TcpListener::bind(&listen_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {listen_address}: {e}");
            std::process::exit(1);
        }
    };

    info!("Server starting... listening for requests on {listen_address}");

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
