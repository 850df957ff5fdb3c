use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::middleware::{DefaultHeaders, ErrorHandlers, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use rand::{distributions::Alphanumeric, Rng};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use votebox::middleware::ClientCtx;
use votebox::storage::{LocalStorage, StorageBackend};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    votebox::app_config::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.");
    let db = votebox::db::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    votebox::db::create_tables(&db)
        .await
        .expect("Failed to create database tables");

    let images_path = PathBuf::from(votebox::app_config::storage().images_path);
    let storage: Arc<dyn StorageBackend> =
        Arc::new(LocalStorage::new(images_path).expect("Failed to initialize image storage"));

    let secret_key = match std::env::var("SECRET_KEY") {
        Ok(key) if key.len() >= 64 => Key::from(key.as_bytes()),
        other => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!("SECRET_KEY was invalid. Reason: {:?}\r\nThis means the key used for signing session cookies will invalidate every time the application is restarted. A secret key must be at least 64 bytes to be accepted.\r\n\r\nNeed a key? How about:\r\n{}", other.map(|k| format!("{} bytes", k.len())), random_string);
            Key::from(random_string.as_bytes())
        }
    };

    // Spawn rate limiter cleanup task
    actix_web::rt::spawn(async {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(300)); // Every 5 minutes
        loop {
            interval.tick().await;
            votebox::rate_limit::cleanup_old_entries_public();
            log::debug!("Rate limiter cleanup completed");
        }
    });

    let server_config = votebox::app_config::server();
    let secure_cookies = server_config.secure_cookies;
    log::info!("Listening on {}", server_config.bind);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(db.clone()))
            .app_data(Data::new(storage.clone()))
            // Security headers - applied to all responses
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("X-XSS-Protection", "0")) // Disable legacy XSS filter
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
                    .add((
                        "Permissions-Policy",
                        "geolocation=(), microphone=(), camera=()",
                    )),
            )
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::BAD_REQUEST, votebox::web::error::render_400)
                    .handler(StatusCode::NOT_FOUND, votebox::web::error::render_404)
                    .handler(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        votebox::web::error::render_500,
                    ),
            )
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(secure_cookies)
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %T"))
            .configure(votebox::web::configure)
    })
    .bind(server_config.bind.as_str())?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // A missing .env is fine; the environment may already be set.
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
