//! Exports of the whole filtered result set. An export is one request, independent of whatever page
//! the view is showing, and it fails on its own without touching the view.
use crate::client::Client;
use crate::query::params::export_params;
use crate::query::{FilterError, FilterState};
use crate::twoface::externalerror::INVALID_FILTER;
use crate::twoface::{DescribeErr, Fallible};
use anyhow::Context;
use bytes::Bytes;
use chrono::NaiveDate;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// How the exported rows are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Comma-delimited text.
    Csv,
    /// An XLSX spreadsheet.
    Excel,
}

impl ExportFormat {
    /// The value of the `export_format` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, FilterError> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            other => Err(FilterError::UnknownValue {
                field: "ExportFormat",
                value: other.to_owned(),
            }),
        }
    }
}

/// What the operator asked to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Columns to include, in order. Empty exports every column.
    pub columns: Vec<String>,
}

impl ExportRequest {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            columns: Vec::new(),
        }
    }
}

/// A finished export, ready to be handed to the host as a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Bytes,
}

impl ExportArtifact {
    /// Write the artifact into `dir`. An existing file of the same name is replaced; telling two
    /// same-day exports apart is up to whoever picks the directory.
    pub fn save(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("couldn't write export to {}", path.display()))?;
        Ok(path)
    }
}

/// `posts_export_2024-01-31.csv`
pub fn file_name(format: ExportFormat, day: NaiveDate) -> String {
    format!("posts_export_{}.{}", day.format("%Y-%m-%d"), format.extension())
}

/// Export every post matching `filters`. Reads only the filters; the page cursor plays no part.
pub async fn export_all<C: Client + ?Sized>(
    client: &C,
    filters: &FilterState,
    request: &ExportRequest,
    today: NaiveDate,
) -> Fallible<ExportArtifact> {
    filters.validate().describe_err(INVALID_FILTER)?;
    let params = export_params(filters, request.format, &request.columns);
    let bytes = client.export_posts(&params).await?;
    let artifact = ExportArtifact {
        file_name: file_name(request.format, today),
        format: request.format,
        bytes,
    };
    info!(
        file_name = artifact.file_name.as_str(),
        bytes = artifact.bytes.len(),
        "export finished"
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{self, post};
    use crate::query::params::{CHANNEL_ID, EXPORT_FORMAT, PAGE, PAGE_SIZE};
    use crate::query::FilterEdit;
    use crate::twoface::externalerror::{EXPORT_FAILED, EXPORT_REJECTED};
    use crate::twoface::Cause;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name(ExportFormat::Csv, day()), "posts_export_2024-01-31.csv");
        assert_eq!(file_name(ExportFormat::Excel, day()), "posts_export_2024-01-31.xlsx");
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[actix_rt::test]
    async fn test_export_uses_filters_without_cursor() {
        let mut client = mock::Client::default();
        client.set_posts(vec![
            post(1, 5, "photo", "a"),
            post(2, 6, "photo", "b"),
            post(3, 5, "text", "c"),
        ]);
        let filters = FilterState::reset()
            .apply(FilterEdit::Channel(Some(5)))
            .unwrap();

        let artifact = export_all(&client, &filters, &ExportRequest::new(ExportFormat::Csv), day())
            .await
            .unwrap();
        assert_eq!(artifact.file_name, "posts_export_2024-01-31.csv");
        let body = String::from_utf8(artifact.bytes.to_vec()).unwrap();
        assert!(body.contains("1,1001,5"));
        assert!(body.contains("3,1003,5"));
        assert!(!body.contains("2,1002,6"));

        let sent = &client.requests()[0];
        assert_eq!(sent.get(CHANNEL_ID).and_then(|v| v.as_int()), Some(5));
        assert_eq!(sent.get(EXPORT_FORMAT).and_then(|v| v.as_text()), Some("csv"));
        assert!(!sent.contains(PAGE));
        assert!(!sent.contains(PAGE_SIZE));
    }

    #[actix_rt::test]
    async fn test_export_failures_are_export_errors() {
        let client = mock::Client::default();
        client.fail_with(Some(EXPORT_REJECTED));
        let err = export_all(
            &client,
            &FilterState::reset(),
            &ExportRequest::new(ExportFormat::Excel),
            day(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.cause(), Cause::ExportRejected);

        client.fail_with(Some(EXPORT_FAILED));
        let err = export_all(
            &client,
            &FilterState::reset(),
            &ExportRequest::new(ExportFormat::Csv),
            day(),
        )
        .await
        .unwrap_err();
        assert!(err.cause().is_export());
    }

    #[test]
    fn test_save_writes_named_file() {
        let artifact = ExportArtifact {
            file_name: file_name(ExportFormat::Csv, day()),
            format: ExportFormat::Csv,
            bytes: Bytes::from_static(b"id\n1\n"),
        };
        let dir = std::env::temp_dir().join(format!("postview-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = artifact.save(&dir).unwrap();
        assert!(path.ends_with("posts_export_2024-01-31.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"id\n1\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
