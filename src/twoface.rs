//! `twoface::TfError` wraps a Rust error type with an operator-facing description. The internal
//! half keeps transport details (URLs, response bodies, socket errors) for the logs, while the
//! external half is what the view shows next to the table or the export button.

mod extensions;
pub mod externalerror;
mod integrations;

pub use extensions::*;
pub use externalerror::{Cause, ExternalError};
pub use integrations::check_status;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Wraps a Rust error type with an operator-facing description.
#[derive(Debug)]
pub struct TfError {
    /// The underlying error. May contain request URLs or server bodies, so it is only logged.
    pub internal: anyhow::Error,
    /// A short explanation that is safe to surface in the view.
    pub external: ExternalError,
}

impl TfError {
    pub fn cause(&self) -> Cause {
        self.external.cause
    }

    /// For callers that report errors with anyhow: the external text becomes context around the
    /// internal error.
    pub fn into_anyhow(self) -> anyhow::Error {
        self.internal.context(self.external.to_string())
    }
}

/// Displaying a TfError only displays the external section. The internal error stays in the logs.
impl Display for TfError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(f, "{}", self.external)
    }
}

/// Result of anything that talks to the posts service or checks operator input.
pub type Fallible<T> = Result<T, TfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_hides_internal_error() {
        let io_err = std::fs::read("secret-token-file").unwrap_err();
        let err = io_err.describe(ExternalError {
            cause: Cause::ListingFailed,
            text: "Could not load posts",
        });
        assert_eq!(err.to_string(), "ListingFailed: Could not load posts");
        assert_eq!(err.cause(), Cause::ListingFailed);
        assert!(!err.to_string().contains("secret"));
    }
}
