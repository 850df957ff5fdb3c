pub mod dashboard;
pub mod error;
pub mod index;
pub mod login;
pub mod logout;
pub mod polls;
pub mod register;

use actix_files::Files;
use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;
use std::path::Path;

/// Uploaded files are user content. They may never run script or load
/// anything, even when opened directly.
const IMAGES_CSP: &str = "default-src 'none'; style-src 'unsafe-inline'; sandbox";

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    index::configure(conf);
    dashboard::configure(conf);
    login::configure(conf);
    logout::configure(conf);
    register::configure(conf);
    polls::configure(conf);

    configure_images(conf, Path::new(&crate::app_config::storage().images_path));
}

/// Serves uploaded option images from `images_path` under `/images`.
pub fn configure_images(conf: &mut actix_web::web::ServiceConfig, images_path: &Path) {
    conf.service(
        actix_web::web::scope("/images")
            .wrap(
                DefaultHeaders::new()
                    .add((header::CONTENT_SECURITY_POLICY, IMAGES_CSP))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff")),
            )
            .service(Files::new("/", images_path)),
    );
}
