//! Integrate twoface with the awc HTTP client.

use crate::twoface::externalerror::{EXPORT_REJECTED, NOT_FOUND};
use crate::twoface::{ExternalError, Fallible, TfError};
use anyhow::anyhow;
use awc::http::StatusCode;
use tracing::error;

/// Server error bodies are logged, but only this much of them.
const MAX_LOGGED_BODY: usize = 512;

/// Turn a non-success HTTP status into a TfError. `failure` describes the operation that was
/// attempted; it is used unless the status says something more specific.
pub fn check_status(status: StatusCode, body: &[u8], failure: ExternalError) -> Fallible<()> {
    if status.is_success() {
        return Ok(());
    }
    let external = match status {
        StatusCode::NOT_FOUND => NOT_FOUND,
        s if s.is_client_error() && failure.cause.is_export() => EXPORT_REJECTED,
        _ => failure,
    };
    let snippet = String::from_utf8_lossy(&body[..body.len().min(MAX_LOGGED_BODY)]);
    let err = TfError {
        internal: anyhow!("server responded {}: {}", status, snippet),
        external,
    };
    error!(status = status.as_u16(), "{}", err.internal);
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twoface::externalerror::{EXPORT_FAILED, LISTING_FAILED};
    use crate::twoface::Cause;

    #[test]
    fn test_success_passes_through() {
        assert!(check_status(StatusCode::OK, b"", LISTING_FAILED).is_ok());
    }

    #[test]
    fn test_status_picks_cause() {
        let err = check_status(StatusCode::NOT_FOUND, b"", LISTING_FAILED).unwrap_err();
        assert_eq!(err.cause(), Cause::NotFound);

        let body = br#"{"detail":"Export limit exceeded. Maximum 10000 rows allowed."}"#;
        let err = check_status(StatusCode::BAD_REQUEST, body, EXPORT_FAILED).unwrap_err();
        assert_eq!(err.cause(), Cause::ExportRejected);
        assert!(err.internal.to_string().contains("Export limit exceeded"));

        let err = check_status(StatusCode::BAD_GATEWAY, b"", EXPORT_FAILED).unwrap_err();
        assert_eq!(err.cause(), Cause::ExportFailed);

        // A rejected listing is still a listing failure.
        let err = check_status(StatusCode::UNPROCESSABLE_ENTITY, b"", LISTING_FAILED).unwrap_err();
        assert_eq!(err.cause(), Cause::ListingFailed);
    }
}
