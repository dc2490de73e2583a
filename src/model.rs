use crate::record_reader::Record;
use crate::{Csv2JsonError, GResult};
use serde_json::{Map, Value};

pub type Column = String;

/// A CSV record keyed by the header. Keys keep header order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Builds a row from a record. Missing trailing fields become `null`;
    /// a record with more fields than the header is rejected.
    pub fn from_record(columns: &[Column], record: Record) -> GResult<Row> {
        if record.fields.len() > columns.len() {
            return Err(Csv2JsonError::Malformed {
                line: record.line,
                reason: format!(
                    "record has {} fields but the header has {}",
                    record.fields.len(),
                    columns.len()
                ),
            });
        }

        let mut values = record.fields.into_iter();
        let mut map = Map::with_capacity(columns.len());
        for column in columns {
            let value = values.next().map(Value::String).unwrap_or(Value::Null);
            // A repeated column keeps its first position and its last value.
            map.insert(column.clone(), value);
        }
        Ok(Row(map))
    }
}

/// The parsed file: header columns plus rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Dataset {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_record(&mut self, record: Record) -> GResult<()> {
        let row = Row::from_record(&self.columns, record)?;
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub rows: usize,
    pub columns: usize,
}

impl From<&Dataset> for ConversionSummary {
    fn from(dataset: &Dataset) -> Self {
        ConversionSummary {
            rows: dataset.rows.len(),
            columns: dataset.columns.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(line: u64, fields: &[&str]) -> Record {
        Record {
            line,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn columns(names: &[&str]) -> Vec<Column> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_row_keys_follow_header_order() -> GResult<()> {
        let row = Row::from_record(&columns(&["z", "a", "m"]), record(2, &["1", "2", "3"]))?;
        assert_eq!(serde_json::to_string(&row)?, r#"{"z":"1","a":"2","m":"3"}"#);
        Ok(())
    }

    #[test]
    fn test_short_row_gets_nulls() -> GResult<()> {
        let row = Row::from_record(&columns(&["a", "b", "c"]), record(2, &["1"]))?;
        assert_eq!(serde_json::to_value(&row)?, json!({"a": "1", "b": null, "c": null}));
        Ok(())
    }

    #[test]
    fn test_long_row_rejected() {
        let err = Row::from_record(&columns(&["a"]), record(7, &["1", "2"])).unwrap_err();
        match err {
            Csv2JsonError::Malformed { line, reason } => {
                assert_eq!(line, 7);
                assert!(reason.contains("2 fields"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_column_keeps_last_value() -> GResult<()> {
        let row = Row::from_record(&columns(&["a", "b", "a"]), record(2, &["1", "2", "3"]))?;
        assert_eq!(serde_json::to_string(&row)?, r#"{"a":"3","b":"2"}"#);
        Ok(())
    }

    #[test]
    fn test_dataset_summary() -> GResult<()> {
        let mut dataset = Dataset::new(columns(&["a", "b"]));
        dataset.push_record(record(2, &["1", "2"]))?;
        dataset.push_record(record(3, &["3"]))?;

        let summary = ConversionSummary::from(&dataset);
        assert_eq!(summary, ConversionSummary { rows: 2, columns: 2 });
        Ok(())
    }
}
