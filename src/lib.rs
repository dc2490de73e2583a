use crate::model::{ConversionSummary, Dataset};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub mod json_writer;
pub mod model;
pub mod record_reader;

pub type GResult<T> = Result<T, Csv2JsonError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ErrorKind {
    InvalidArguments,
    NotFound,
    PermissionDenied,
    ParseError,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Csv2JsonError {
    #[error("Usage: csv2json <input_csv> <output_json>")]
    InvalidArguments,
    #[error("The file {} was not found.", .0.display())]
    NotFound(PathBuf),
    #[error("Permission denied when accessing {}.", .0.display())]
    PermissionDenied(PathBuf),
    #[error("The file {} is not valid UTF-8 (line {line}).", .path.display())]
    InvalidEncoding { path: PathBuf, line: u64 },
    #[error("Could not parse {} on line {line}: {reason}", .path.display())]
    ParseError {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("CSV parse error on line {line}: {reason}")]
    Malformed { line: u64, reason: String },
    #[error("CsvError: {0}")]
    CsvError(#[from] csv::Error),
    #[error("I/O error on {}: {source}", .path.display())]
    IoError { path: PathBuf, source: io::Error },
    #[error("IoError: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Csv2JsonError {
    /// Classifies an I/O error that happened on `path`.
    pub fn at_path(err: io::Error, path: &Path) -> Csv2JsonError {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Csv2JsonError::NotFound(path),
            io::ErrorKind::PermissionDenied => Csv2JsonError::PermissionDenied(path),
            _ => Csv2JsonError::IoError { path, source: err },
        }
    }

    /// Attributes an error raised while handling `path` to that path.
    /// Errors that already carry a path pass through.
    pub fn located(self, path: &Path) -> Csv2JsonError {
        match self {
            Csv2JsonError::Io(err) => Csv2JsonError::at_path(err, path),
            Csv2JsonError::Malformed { line, reason } => Csv2JsonError::ParseError {
                path: path.to_path_buf(),
                line,
                reason,
            },
            Csv2JsonError::CsvError(err) => {
                let line = err.position().map_or(0, |pos| pos.line());
                let reason = err.to_string();
                match err.into_kind() {
                    csv::ErrorKind::Io(err) => Csv2JsonError::at_path(err, path),
                    csv::ErrorKind::Utf8 { .. } => Csv2JsonError::InvalidEncoding {
                        path: path.to_path_buf(),
                        line,
                    },
                    _ => Csv2JsonError::ParseError {
                        path: path.to_path_buf(),
                        line,
                        reason,
                    },
                }
            }
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Csv2JsonError::InvalidArguments => ErrorKind::InvalidArguments,
            Csv2JsonError::NotFound(_) => ErrorKind::NotFound,
            Csv2JsonError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Csv2JsonError::InvalidEncoding { .. }
            | Csv2JsonError::ParseError { .. }
            | Csv2JsonError::Malformed { .. }
            | Csv2JsonError::CsvError(_) => ErrorKind::ParseError,
            Csv2JsonError::IoError { .. } | Csv2JsonError::Io(_) | Csv2JsonError::JsonError(_) => {
                ErrorKind::Io
            }
        }
    }
}

/// Converts the CSV file at `input` into a JSON array written to `output`.
///
/// The input is fully parsed before `output` is created, so a failed read
/// leaves no output file behind.
pub async fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> GResult<ConversionSummary> {
    let (input, output) = (input.as_ref(), output.as_ref());

    let file = File::open(input)
        .await
        .map_err(|err| Csv2JsonError::at_path(err, input))?;
    let dataset = read_dataset(file)
        .await
        .map_err(|err| err.located(input))?;
    let summary = ConversionSummary::from(&dataset);
    debug!(input = %input.display(), rows = summary.rows, columns = summary.columns, "parsed csv");

    let mut file = File::create(output)
        .await
        .map_err(|err| Csv2JsonError::at_path(err, output))?;
    write_dataset(&mut file, &dataset)
        .await
        .map_err(|err| err.located(output))?;
    debug!(output = %output.display(), "wrote json");

    Ok(summary)
}

/// Reads a header and its rows from `reader`. Empty input yields an empty dataset.
pub async fn read_dataset<R: AsyncRead + Unpin>(mut reader: R) -> GResult<Dataset> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw).await?;
    record_reader::parse_dataset(&raw)
}

pub async fn write_dataset<W: AsyncWrite + Unpin>(
    writer: &mut W,
    dataset: &Dataset,
) -> GResult<()> {
    let json = json_writer::to_pretty_json(dataset)?;
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}
