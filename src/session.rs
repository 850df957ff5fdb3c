//! Password hashing and session identity.
//!
//! The signed session cookie carries the authenticated user's id. It is resolved
//! into a [`crate::user::Profile`] once per request by the client context middleware.

use actix_session::Session;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use once_cell::sync::Lazy;

const USER_ID_KEY: &str = "user_id";

/// Optional pepper mixed into every hash. Changing it invalidates stored passwords.
static SALT: Lazy<String> = Lazy::new(|| std::env::var("SALT").unwrap_or_default());

static ARGON2: Lazy<Argon2<'static>> = Lazy::new(|| {
    if SALT.is_empty() {
        return Argon2::default();
    }

    Argon2::new_with_secret(
        SALT.as_bytes(),
        Algorithm::default(),
        Version::default(),
        Params::default(),
    )
    .unwrap_or_else(|e| {
        log::warn!("SALT rejected by Argon2 ({}), hashing without a secret", e);
        Argon2::default()
    })
});

/// Returns the shared Argon2 instance.
pub fn get_argon2() -> &'static Argon2<'static> {
    &ARGON2
}

/// Hashes `password` into a PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(get_argon2()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Checks `password` against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => get_argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("verify_password: stored hash is malformed: {}", e);
            false
        }
    }
}

/// Returns the user id stored in the session, if any.
pub fn get_session_user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(USER_ID_KEY) {
        Ok(id) => id,
        Err(e) => {
            log::warn!("get_session_user_id: unreadable session value: {}", e);
            None
        }
    }
}

/// Binds the session to `user_id`, issuing a fresh session cookie.
pub fn sign_in(session: &Session, user_id: i32) -> Result<(), actix_web::Error> {
    session.renew();
    session
        .insert(USER_ID_KEY, user_id)
        .map_err(|_| actix_web::error::ErrorInternalServerError("middleware error"))
}

/// Drops every value held by the session and rotates the cookie. The session
/// itself survives so a flash can still be carried to the next page.
pub fn sign_out(session: &Session) {
    session.clear();
    session.renew();
}
