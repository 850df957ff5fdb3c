//! One-shot flash messages carried across a redirect in the session.
//!
//! Mutating handlers store a [`Flash`] and answer with a redirect back to the page
//! the form came from. The next GET request takes the flash out of the session
//! (see [`crate::middleware::ClientCtx`]) so it is rendered exactly once.

use actix_session::Session;
use actix_web::{http::header, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FLASH_SESSION_KEY: &str = "flash";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
    /// Validation messages keyed by form field name.
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    /// An error flash carrying per-field validation messages.
    pub fn invalid(errors: BTreeMap<String, String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: "Please correct the highlighted fields.".to_owned(),
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == FlashLevel::Success
    }

    pub fn level_name(&self) -> &'static str {
        match self.level {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

/// Stores `flash` for the next request. Failure is logged, not raised.
pub fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(FLASH_SESSION_KEY, flash) {
        log::error!("set_flash: unable to store flash message: {}", e);
    }
}

/// Removes and returns the pending flash, if any.
pub fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove_as::<Flash>(FLASH_SESSION_KEY) {
        Some(Ok(flash)) => Some(flash),
        Some(Err(raw)) => {
            log::warn!("take_flash: discarding unreadable flash {}", raw);
            None
        }
        None => None,
    }
}

/// Picks the redirect target for "back": the same-site Referer, else `fallback`.
pub fn back_location(req: &HttpRequest, fallback: &str) -> String {
    req.headers()
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(same_site_path)
        .unwrap_or_else(|| fallback.to_owned())
}

/// Reduces an absolute or relative Referer to a local path. Foreign hosts are rejected
/// by comparing against the configured site URL.
fn same_site_path(referer: &str) -> Option<String> {
    if referer.starts_with('/') && !referer.starts_with("//") {
        return Some(referer.to_owned());
    }

    let base_url = crate::app_config::site().base_url;
    let rest = referer.strip_prefix(base_url.trim_end_matches('/'))?;
    if rest.is_empty() {
        Some("/".to_owned())
    } else if rest.starts_with('/') {
        Some(rest.to_owned())
    } else {
        None
    }
}

/// Stores `flash` and redirects back.
pub fn redirect_back(
    req: &HttpRequest,
    session: &Session,
    flash: Flash,
    fallback: &str,
) -> HttpResponse {
    set_flash(session, flash);
    redirect_to(&back_location(req, fallback))
}

/// A plain `302 Found`.
pub fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}
