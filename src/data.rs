use anyhow::{anyhow, Result};
use serde_json::Value;

/// One row of the source table. Cells line up with `Dataset::headers`; a
/// `None` cell means the column is absent for this record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    cells: Vec<Option<String>>,
}

impl Record {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    /// Value at a column position, `None` when the record has no such cell
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// An ordered, immutable collection of records sharing one column list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from plain string rows. Rows shorter than the header leave their
    /// trailing columns absent; extra cells are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let records = rows
            .into_iter()
            .map(|row| Record::new(row.into_iter().take(width).map(Some).collect()))
            .collect();
        Self { headers, records }
    }

    /// Build from per-record `(column, value)` pairs. The column list is the
    /// union of all names in first-seen order.
    pub fn from_records<I, R, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut headers: Vec<String> = Vec::new();
        let mut pending: Vec<Vec<(usize, String)>> = Vec::new();

        for record in records {
            let mut cells = Vec::new();
            for (key, value) in record {
                let key = key.into();
                let idx = match headers.iter().position(|h| *h == key) {
                    Some(idx) => idx,
                    None => {
                        headers.push(key);
                        headers.len() - 1
                    }
                };
                cells.push((idx, value.into()));
            }
            pending.push(cells);
        }

        let width = headers.len();
        let records = pending
            .into_iter()
            .map(|cells| {
                let mut row = vec![None; width];
                for (idx, value) in cells {
                    row[idx] = Some(value);
                }
                Record::new(row)
            })
            .collect();

        Self { headers, records }
    }

    /// Create a Dataset from a JSON array of objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut rows = Vec::with_capacity(array.len());
        for (idx, item) in array.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Item {} in array is not an object", idx))?;

            let mut row = Vec::with_capacity(obj.len());
            for (key, val) in obj {
                let val_str = match val {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null => continue,
                    _ => {
                        return Err(anyhow!(
                            "Unsupported value type for field '{}' in item {}",
                            key,
                            idx
                        ))
                    }
                };
                row.push((key.clone(), val_str));
            }
            rows.push(row);
        }

        Ok(Self::from_records(rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
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

    /// Position of a column, matched exactly
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Every record's cell in `name`, front to back. Yields nothing when the
    /// column is unknown.
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        let index = self.column_index(name);
        self.records
            .iter()
            .filter(move |_| index.is_some())
            .map(move |r| index.and_then(|i| r.get(i)))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.records.get(row)?.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_rows_short_row_leaves_column_absent() {
        let ds = Dataset::from_rows(
            vec!["Make".into(), "County".into()],
            vec![
                vec!["TESLA".into(), "King".into()],
                vec!["NISSAN".into()],
            ],
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value(0, "County"), Some("King"));
        assert_eq!(ds.value(1, "County"), None);
        assert_eq!(ds.value(1, "Make"), Some("NISSAN"));
    }

    #[test]
    fn test_from_records_builds_header_union() {
        let ds = Dataset::from_records(vec![
            vec![("Make", "TESLA")],
            vec![("Make", "KIA"), ("County", "Yakima")],
        ]);
        assert_eq!(ds.headers(), &["Make".to_string(), "County".to_string()]);
        assert_eq!(ds.value(0, "County"), None);
        assert_eq!(ds.value(1, "County"), Some("Yakima"));
    }

    #[test]
    fn test_column_lookup_is_case_sensitive() {
        let ds = Dataset::from_records(vec![vec![("Make", "TESLA")]]);
        assert!(ds.column_index("make").is_none());
        assert_eq!(ds.column("make").count(), 0);
        assert_eq!(ds.column("Make").collect::<Vec<_>>(), vec![Some("TESLA")]);
    }

    #[test]
    fn test_from_json() {
        let value = json!([
            {"Make": "TESLA", "Model Year": 2020, "Clean": true},
            {"Make": "NISSAN", "Model Year": null}
        ]);
        let ds = Dataset::from_json(&value).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value(0, "Model Year"), Some("2020"));
        assert_eq!(ds.value(0, "Clean"), Some("true"));
        assert_eq!(ds.value(1, "Model Year"), None);
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let value = json!([
            {"Zeta": "1", "Alpha": "2"},
            {"Middle": "3", "Alpha": "4"}
        ]);
        let ds = Dataset::from_json(&value).unwrap();
        assert_eq!(ds.headers(), ["Zeta", "Alpha", "Middle"]);
        assert_eq!(ds.value(1, "Alpha"), Some("4"));
        assert_eq!(ds.value(1, "Zeta"), None);
    }

    #[test]
    fn test_from_json_empty_array() {
        let ds = Dataset::from_json(&json!([])).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Dataset::from_json(&json!({"Make": "TESLA"})).is_err());
        assert!(Dataset::from_json(&json!([1, 2])).is_err());
        assert!(Dataset::from_json(&json!([{"Make": ["a"]}])).is_err());
    }
}
