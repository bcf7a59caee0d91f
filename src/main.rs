use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use medtrack_server::auth::handlers::{login, register};
use medtrack_server::routes::{drugs, health_journals, medication_history, users};
use medtrack_server::{health_check, AppError, AppState, Settings};
use std::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> medtrack_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    info!("Starting server at {}:{}", config.server.host, config.server.port);

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    let state = web::Data::new(state);

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if config.cors.enabled {
            let cors_config = Cors::default();

            let cors_config = if config.cors.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
            } else {
                cors_config
                    .allowed_origin("http://localhost:8080")
                    .allowed_origin("http://127.0.0.1:8080")
                    .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
                    .allowed_headers(vec!["Authorization", "Content-Type"])
                    .supports_credentials()
            };

            cors_config.max_age(config.cors.max_age as usize)
        } else {
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .route("/auth/token", web::post().to(login))
            .route("/auth/register", web::post().to(register))
            .route("/users", web::post().to(users::create_user))
            .route("/users", web::get().to(users::list_users))
            .route("/users/{username}", web::get().to(users::get_user))
            .route("/users/{username}", web::patch().to(users::update_user))
            .route("/users/{username}", web::delete().to(users::delete_user))
            .route(
                "/users/{username}/med_history",
                web::get().to(medication_history::list_medication_history),
            )
            .route(
                "/users/{username}/med_history",
                web::post().to(medication_history::create_medication_history),
            )
            .route(
                "/users/{username}/med_history/{id}",
                web::get().to(medication_history::get_medication_history),
            )
            .route(
                "/users/{username}/med_history/{id}",
                web::patch().to(medication_history::update_medication_history),
            )
            .route(
                "/users/{username}/med_history/{id}",
                web::delete().to(medication_history::delete_medication_history),
            )
            .route(
                "/users/{username}/health_journal",
                web::get().to(health_journals::get_health_journal),
            )
            .route(
                "/users/{username}/health_journal",
                web::post().to(health_journals::create_health_journal),
            )
            .route(
                "/users/{username}/health_journal",
                web::patch().to(health_journals::update_health_journal),
            )
            .route(
                "/users/{username}/health_journal",
                web::delete().to(health_journals::delete_health_journal),
            )
            .route("/drugs/{name}", web::get().to(drugs::get_drug_info))
            .route("/spls/{set_id}", web::get().to(drugs::get_spl_document))
            .route("/news", web::get().to(drugs::get_health_news))
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
