/// CSRF (Cross-Site Request Forgery) protection
///
/// Every session carries one token. Forms embed it as a hidden field named
/// `csrf_token` and every POST handler checks it before touching anything:
///
/// ```html,ignore
/// <form method="post">
///     <input type="hidden" name="csrf_token" value="{{ client.get_csrf_token() }}">
/// </form>
/// ```
///
/// Multipart handlers read the field out of the stream and call
/// [`validate_csrf_token`] once the form has been collected.
use actix_session::Session;
use actix_web::{error, Error};
use rand::{distributions::Alphanumeric, Rng};

pub const CSRF_TOKEN_LENGTH: usize = 32;
pub const CSRF_FIELD_NAME: &str = "csrf_token";
const CSRF_SESSION_KEY: &str = "csrf_token";

/// Generate a new CSRF token
pub fn generate_csrf_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Get or create CSRF token for the current session
///
/// Called when the client context is built, so every rendered form has a token.
pub fn get_or_create_csrf_token(session: &Session) -> Result<String, Error> {
    match session.get::<String>(CSRF_SESSION_KEY) {
        Ok(Some(token)) => Ok(token),
        _ => {
            let token = generate_csrf_token();
            session
                .insert(CSRF_SESSION_KEY, token.clone())
                .map_err(|_| error::ErrorInternalServerError("Failed to store CSRF token"))?;
            Ok(token)
        }
    }
}

/// Compares without stopping at the first differing byte.
fn tokens_match(provided: &str, expected: &str) -> bool {
    provided.len() == expected.len()
        && provided
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Validate CSRF token from form data. Mismatches are `403 Forbidden`.
pub fn validate_csrf_token(session: &Session, provided_token: &str) -> Result<(), Error> {
    let expected_token = session
        .get::<String>(CSRF_SESSION_KEY)
        .map_err(|_| error::ErrorInternalServerError("Failed to get CSRF token"))?
        .ok_or_else(|| error::ErrorForbidden("CSRF token not found in session"))?;

    if !tokens_match(provided_token, &expected_token) {
        log::warn!("CSRF token validation failed");
        return Err(error::ErrorForbidden("Invalid CSRF token"));
    }

    Ok(())
}
