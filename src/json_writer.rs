use crate::model::Dataset;
use crate::GResult;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

const INDENT: &[u8] = b"    ";

/// Serializes the rows of `dataset` as a JSON array indented by four spaces.
/// No trailing newline is written.
pub fn to_pretty_json(dataset: &Dataset) -> GResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    dataset.rows().serialize(&mut serializer)?;
    Ok(buf)
}
