//! Ways to turn errors from other libraries into TfErrors.
use crate::twoface::{ExternalError, TfError};
use anyhow::anyhow;
use std::fmt::Display;

pub trait Describe {
    /// Pair an error with what the operator should be told about it.
    fn describe(self, external: ExternalError) -> TfError;
}

impl<Internal: Into<anyhow::Error>> Describe for Internal {
    fn describe(self, external: ExternalError) -> TfError {
        TfError {
            internal: self.into(),
            external,
        }
    }
}

/// Errors with no more specific description become `ServerError`s.
impl<Internal: Into<anyhow::Error>> From<Internal> for TfError {
    fn from(internal: Internal) -> TfError {
        internal.describe(Default::default())
    }
}

pub trait DescribeErr<T> {
    /// `result.describe_err(external)` is `result.map_err(|e| e.describe(external))`.
    fn describe_err(self, external: ExternalError) -> Result<T, TfError>;
}

impl<T, E> DescribeErr<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn describe_err(self, external: ExternalError) -> Result<T, TfError> {
        self.map_err(|e| e.describe(external))
    }
}

/// For errors that can't become an anyhow::Error because they aren't Send, like awc's. Only their
/// message is kept, prefixed by what was being attempted.
pub trait DescribeDisplay<T> {
    fn describe_display(self, attempt: &str, external: ExternalError) -> Result<T, TfError>;
}

impl<T, E: Display> DescribeDisplay<T> for Result<T, E> {
    fn describe_display(self, attempt: &str, external: ExternalError) -> Result<T, TfError> {
        self.map_err(|e| TfError {
            internal: anyhow!("{}: {}", attempt, e),
            external,
        })
    }
}
