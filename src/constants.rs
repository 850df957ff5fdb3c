//! Application-wide constants
//!
//! Limits that operators may want to tune live in [`crate::app_config`] instead.

/// Minimum number of options a poll is created with
pub const MIN_POLL_OPTIONS: usize = 1;

/// Length of the public short code used in poll URLs
pub const POLL_CODE_LENGTH: usize = 8;

/// Attempts at drawing an unused short code before giving up
pub const POLL_CODE_ATTEMPTS: usize = 5;

/// Length of the random stem of a stored image filename
pub const IMAGE_NAME_LENGTH: usize = 12;

/// Default username displayed for unauthenticated users
pub const GUEST_USERNAME: &str = "Guest";

/// Flash message shown when a write fails for a reason we do not disclose
pub const GENERIC_FAILURE_MESSAGE: &str = "internal server error";
