//! Rendering of command and job failures.

use std::any::Any;

use crate::response::Response;

/// Shown instead of the error chain when `display_exceptions` is off.
pub const GENERIC_ERROR: &str =
    "An error occurred. Please check your application logs for more details.";

/// Turns a caught panic payload into an error.
pub(crate) fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    if let Some(message) = payload.downcast_ref::<&str>() {
        anyhow::anyhow!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        anyhow::anyhow!("panicked: {message}")
    } else {
        anyhow::anyhow!("panicked")
    }
}

/// Writes exactly one error message for `error`.
pub(crate) fn render_fault(
    response: &mut Response,
    error: &anyhow::Error,
    display_exceptions: bool,
) {
    if display_exceptions {
        response.write_error(format!("{error:#}"));
    } else {
        response.write_error(GENERIC_ERROR);
    }
}
