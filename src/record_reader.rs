use crate::model::Dataset;
use crate::{Csv2JsonError, GResult};
use csv::{ReaderBuilder, StringRecord};

const BYTE_ORDER_MARK: &[u8] = b"\xEF\xBB\xBF";

/// One logical CSV record. `line` is the 1-based line the record starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: u64,
    pub fields: Vec<String>,
}

impl From<&StringRecord> for Record {
    fn from(record: &StringRecord) -> Self {
        Record {
            line: record.position().map_or(0, |pos| pos.line()),
            fields: record.iter().map(String::from).collect(),
        }
    }
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    // Short rows are padded by `Row::from_record`, long rows rejected there.
    builder.flexible(true);
    builder
}

/// Parses a whole CSV document: the first record is the header, every other
/// record becomes a row. Empty input yields an empty dataset.
pub fn parse_dataset(raw: &[u8]) -> GResult<Dataset> {
    let data = normalize_newlines(raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw));
    let mut reader = reader_builder().from_reader(data.as_slice());

    let header = reader.headers()?.clone();
    let mut dataset = Dataset::new(header.iter().map(String::from).collect());

    let mut last = (0, Record::from(&header).line.max(1));
    let mut raw_record = StringRecord::new();
    loop {
        let start = reader.position().byte();
        if !reader.read_record(&mut raw_record)? {
            break;
        }
        let record = Record::from(&raw_record);
        last = (start, record.line);
        dataset.push_record(record)?;
    }

    let (start, line) = last;
    ensure_quotes_closed(&data[start as usize..], line)?;
    Ok(dataset)
}

/// The reader accepts an open quote running to end of input. Reparsing the
/// final record with one more line break shows whether it was still open.
fn ensure_quotes_closed(tail: &[u8], line: u64) -> GResult<()> {
    let terminated = [tail, &b"\n"[..]].concat();
    if last_record(tail)? != last_record(&terminated)? {
        return Err(Csv2JsonError::Malformed {
            line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    Ok(())
}

fn last_record(data: &[u8]) -> GResult<Option<StringRecord>> {
    let mut reader = reader_builder().has_headers(false).from_reader(data);
    let mut last = None;
    for record in reader.records() {
        last = Some(record?);
    }
    Ok(last)
}

/// Line breaks inside fields come out as `\n`, whatever the file used.
fn normalize_newlines(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        if b == b'\r' {
            bytes.next_if_eq(&b'\n');
            out.push(b'\n');
        } else {
            out.push(b);
        }
    }
    out
}
