use aldente_core::RecipeSaver;
use aldente_server::config::Config;
use aldente_server::{api, app, telemetry, ServerState};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi()
            .to_pretty_json()
            .expect("Failed to serialize OpenAPI spec");
        println!("{}", spec);
        return;
    }

    telemetry::init_telemetry();

    let config = Config::from_env().expect("Invalid server configuration");
    let store = config
        .blob
        .build()
        .expect("Failed to configure blob store");

    tracing::info!(
        store = %store.describe(),
        key = %config.save.key,
        fetch_failure = ?config.save.fetch_failure,
        "recipe repository configured"
    );

    let state = Arc::new(ServerState {
        saver: RecipeSaver::new(store, config.save.clone()),
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .expect("Failed to bind listener");
    let local_addr = listener
        .local_addr()
        .expect("Listener has no local address");

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        local_addr.port()
    );

    axum::serve(listener, app(state))
        .await
        .expect("Server terminated unexpectedly");
}
