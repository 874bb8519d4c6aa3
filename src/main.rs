use std::sync::Arc;

use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;

use labtrack_backend::api::{AuditApi, HealthApi, ReportsApi, SamplesApi};
use labtrack_backend::config::{init_logging, BootstrapSettings, DatabaseConnections};
use labtrack_backend::AppData;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let settings = BootstrapSettings::from_env().expect("Failed to load bootstrap settings");

    let connections = DatabaseConnections::init(&settings)
        .await
        .expect("Failed to connect to databases");
    connections
        .migrate()
        .await
        .expect("Failed to run migrations");

    let app_data = Arc::new(
        AppData::init(connections, settings.document_store_dir())
            .await
            .expect("Failed to initialize application data"),
    );

    let api_service = OpenApiService::new(
        (
            HealthApi,
            SamplesApi::new(app_data.clone()),
            ReportsApi::new(app_data.clone()),
            AuditApi::new(app_data.clone()),
        ),
        "LabTrack API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!(
        "http://{}:{}/api",
        settings.server_host(),
        settings.server_port()
    ));

    let ui = api_service.swagger_ui();

    let app = Route::new().nest("/api", api_service).nest("/swagger", ui);

    let bind = format!("{}:{}", settings.server_host(), settings.server_port());
    tracing::info!("Starting server on http://{}", bind);

    Server::new(TcpListener::bind(bind)).run(app).await
}
