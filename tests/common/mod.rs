//! Shared helpers for the integration tests
#![allow(dead_code)]

pub mod database;
pub mod fixtures;
pub mod http;

/// Builds the application service the same way the server binary does, minus
/// the logging and header middleware. A second argument replaces the image
/// storage with any `Arc<dyn StorageBackend>`.
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {
        $crate::test_app!($ctx, $ctx.storage())
    };
    ($ctx:expr, $storage:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($ctx.db.clone()))
                .app_data(actix_web::web::Data::new($storage))
                .wrap(
                    actix_web::middleware::ErrorHandlers::new()
                        .handler(
                            actix_web::http::StatusCode::NOT_FOUND,
                            votebox::web::error::render_404,
                        )
                        .handler(
                            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                            votebox::web::error::render_500,
                        ),
                )
                .wrap(votebox::middleware::ClientCtx::default())
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::from(&[7u8; 64]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(votebox::web::configure),
        )
        .await
    };
}
