// File: services/careslot_backend/src/main.rs
use axum::{routing::get, Router};
use careslot_booking::routes::routes as booking_routes;
use careslot_booking::BookingState;
use careslot_common::logging;
use careslot_config::load_config;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod service_factory;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    // Keep the guard so the rolling log file is flushed on exit.
    let _log_guard = logging::init_with_config(&config.logging);

    let booking = match service_factory::booking_service(&config).await {
        Ok(booking) => Arc::new(booking),
        Err(e) => {
            error!("Failed to start booking service: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Serving {} caregivers in {}",
        booking.directory().len(),
        booking.policy().time_zone()
    );

    let state = Arc::new(BookingState { booking });

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Careslot API!" }))
        .merge(booking_routes(state));

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use careslot_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Careslot API",
                version = "0.1.0",
                description = "Caregiver availability and reservations",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
