use std::fmt;

/// What the view shows when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalError {
    /// An operator-facing explanation of what caused the error.
    pub cause: Cause,
    /// Error text that will describe the problem to the operator.
    pub text: &'static str,
}

/// Which operation failed, and how. Listing and export failures are kept apart so an export
/// error never gets mistaken for a problem with the rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    ServerError,
    InvalidFilter,
    ListingFailed,
    ExportFailed,
    ExportRejected,
    ChannelsUnavailable,
    NotFound,
}

impl Cause {
    /// True for failures of the one-shot export call.
    pub fn is_export(self) -> bool {
        matches!(self, Self::ExportFailed | Self::ExportRejected)
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        // Make fmt::Display the same as fmt::Debug, i.e. each variant's name.
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}: {}", self.cause, self.text)
    }
}

impl Default for ExternalError {
    // Default to ServerError and a very vague generic message.
    fn default() -> Self {
        Self {
            cause: Cause::ServerError,
            text: "Unexpected error talking to the posts service",
        }
    }
}

pub const LISTING_FAILED: ExternalError = ExternalError {
    cause: Cause::ListingFailed,
    text: "Could not load posts",
};

pub const EXPORT_FAILED: ExternalError = ExternalError {
    cause: Cause::ExportFailed,
    text: "Export failed",
};

pub const EXPORT_REJECTED: ExternalError = ExternalError {
    cause: Cause::ExportRejected,
    text: "The server refused the export, try narrowing the filters",
};

pub const CHANNELS_UNAVAILABLE: ExternalError = ExternalError {
    cause: Cause::ChannelsUnavailable,
    text: "Could not load channels",
};

pub const NOT_FOUND: ExternalError = ExternalError {
    cause: Cause::NotFound,
    text: "Not found",
};

pub const INVALID_FILTER: ExternalError = ExternalError {
    cause: Cause::InvalidFilter,
    text: "Invalid filter",
};
