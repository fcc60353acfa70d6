use chrono::{DateTime, Local};
use serde_json::Value;

use crate::data::DatasetError;
use crate::data::record::Record;

/// Immutable set of procedure records, header row already removed.
#[derive(Clone, Debug)]
pub struct Dataset {
    records: Vec<Record>,
    pub loaded_at: DateTime<Local>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            loaded_at: Local::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Parse the endpoint payload: a JSON array of rows whose first row is
    /// a header, or an object carrying an `error` field.
    pub fn from_json(payload: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        match value {
            Value::Array(rows) => {
                let records = rows
                    .iter()
                    .skip(1)
                    .filter_map(|row| row.as_array())
                    .map(|cells| Record::from_row(cells))
                    .collect();
                Ok(Self::new(records))
            }
            Value::Object(map) => match map.get("error") {
                Some(Value::String(msg)) => Err(DatasetError::Remote(msg.clone())),
                Some(other) => Err(DatasetError::Remote(other.to_string())),
                None => Err(DatasetError::Shape("expected an array of rows".to_string())),
            },
            _ => Err(DatasetError::Shape("expected an array of rows".to_string())),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_row_is_dropped() {
        let payload = r#"[
            ["id","idioma","categoria","sub","texto","a","b","video"],
            ["1","PT","QUEIMADURA","Leve","Resfrie com água","","",""]
        ]"#;
        let dataset = Dataset::from_json(payload).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].category, "QUEIMADURA");
    }

    #[test]
    fn test_error_payload_is_reported() {
        let err = Dataset::from_json(r#"{"error":"quota exceeded"}"#).unwrap_err();
        match err {
            DatasetError::Remote(msg) => assert_eq!(msg, "quota exceeded"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_array_payload_is_rejected() {
        assert!(matches!(
            Dataset::from_json("42"),
            Err(DatasetError::Shape(_))
        ));
        assert!(matches!(
            Dataset::from_json("not json"),
            Err(DatasetError::Parse(_))
        ));
    }

    #[test]
    fn test_header_only_payload_is_empty() {
        let dataset = Dataset::from_json(r#"[["h"]]"#).unwrap();
        assert!(dataset.is_empty());
    }
}
