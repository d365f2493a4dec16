#![warn(clippy::all, rust_2018_idioms)]

//! Tabular datasets as exchanged with the PCA service: rows of named cells,
//! read from delimited text files or JSON records and written back as CSV.

use std::{
    borrow::Cow,
    collections::HashMap,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use serde::{ser::SerializeMap, ser::SerializeSeq, Deserialize, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("unable to parse CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unable to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Value>")]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// A row keyed by its position in the table.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    key: usize,
    cells: Vec<Value>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns: unique_column_names(columns),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding missing cells with `null` and dropping
    /// surplus ones.
    pub fn push_row(&mut self, mut cells: Vec<Value>) {
        if cells.len() != self.columns.len() {
            log::debug!(
                "row {} has {} cells for {} columns",
                self.rows.len(),
                cells.len(),
                self.columns.len()
            );
        }
        cells.resize(self.columns.len(), Value::Null);
        self.rows.push(Row {
            key: self.rows.len(),
            cells,
        });
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let mut raw = String::new();
        std::fs::File::open(path)
            .and_then(|mut file| file.read_to_string(&mut raw))
            .map_err(|source| TableError::Io {
                path: path.to_owned(),
                source,
            })?;
        let table = Self::from_csv_str(&raw)?;
        log::debug!(
            "loaded {} rows and {} columns from {:?}",
            table.len(),
            table.columns.len(),
            path
        );
        Ok(table)
    }

    /// Parses delimited text, guessing the delimiter from the header line.
    pub fn from_csv_str(raw: &str) -> Result<Self, TableError> {
        let header = raw.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
        Self::from_csv_reader(raw.as_bytes(), sniff_delimiter(header))
    }

    /// Parses delimited text whose first record holds the column names.
    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let columns = rdr.headers()?.iter().map(str::to_owned).collect();
        let mut table = Self::new(columns);
        for record in rdr.records() {
            let record = record?;
            // Lines holding nothing but delimiters carry no data.
            if record.iter().all(str::is_empty) {
                continue;
            }
            table.push_row(
                record
                    .iter()
                    .map(|cell| Value::String(cell.to_owned()))
                    .collect(),
            );
        }
        Ok(table)
    }

    /// Builds a table from JSON records. The first record's keys define the
    /// columns; later records are read by column name.
    pub fn from_records(records: &[Value]) -> Result<Self, TableError> {
        let columns = match records.first() {
            Some(Value::Object(first)) => first.keys().cloned().collect(),
            Some(_) => return Err(TableError::NotAnObject { index: 0 }),
            None => Vec::new(),
        };
        let mut table = Self::new(columns);
        for (index, record) in records.iter().enumerate() {
            let Value::Object(record) = record else {
                return Err(TableError::NotAnObject { index });
            };
            let cells = table
                .columns
                .iter()
                .map(|col| record.get(col).cloned().unwrap_or(Value::Null))
                .collect();
            table.push_row(cells);
        }
        Ok(table)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in self.rows.iter() {
            wtr.write_record(row.cells.iter().map(|cell| cell_text(cell).into_owned()))?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path) -> Result<(), TableError> {
        let file = std::fs::File::create(path).map_err(|source| TableError::Io {
            path: path.to_owned(),
            source,
        })?;
        self.write_csv(file)?;
        log::info!("wrote {} rows to {:?}", self.len(), path);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }
}

impl Row {
    pub fn key(&self) -> usize {
        self.key
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    pub fn text(&self, column: usize) -> Cow<'_, str> {
        self.cells
            .get(column)
            .map(cell_text)
            .unwrap_or(Cow::Borrowed(""))
    }
}

/// Text shown for a cell: strings unquoted, `null` empty.
pub fn cell_text(cell: &Value) -> Cow<'_, str> {
    match cell {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

impl TryFrom<Vec<Value>> for Table {
    type Error = TableError;

    fn try_from(records: Vec<Value>) -> Result<Self, Self::Error> {
        Self::from_records(&records)
    }
}

// Serialized as an array of records, which is what the service consumes.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.rows.iter() {
            seq.serialize_element(&RowRecord {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

struct RowRecord<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl Serialize for RowRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (col, cell) in self.columns.iter().zip(self.row.cells.iter()) {
            map.serialize_entry(col, cell)?;
        }
        map.end()
    }
}

// Counts how often each candidate occurs in the header line.
fn sniff_delimiter(header: &str) -> u8 {
    let mut counts: HashMap<u8, usize> = HashMap::new();
    for byte in header.bytes().filter(|b| matches!(b, b',' | b';' | b'\t')) {
        *counts.entry(byte).or_default() += 1;
    }
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|candidate| (counts.get(candidate).copied().unwrap_or(0), *candidate == b','))
        .unwrap_or(b',')
}

// Empty names become `column_<n>`, repeated names get a numeric suffix.
fn unique_column_names(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    columns
        .into_iter()
        .enumerate()
        .map(|(i, col)| {
            let col = if col.is_empty() {
                format!("column_{}", i + 1)
            } else {
                col
            };
            let count = seen.entry(col.clone()).or_default();
            *count += 1;
            if *count > 1 {
                format!("{}_{}", col, *count - 1)
            } else {
                col
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_three_row_csv() {
        init();
        let table = Table::from_csv_str("id,x,y\nA,1,2\nB,3,4\nC,5,6\n").unwrap();
        assert_eq!(table.columns(), ["id", "x", "y"]);
        let keys: Vec<usize> = table.rows().iter().map(Row::key).collect();
        assert_eq!(keys, vec![0, 1, 2]);
        assert_eq!(table.rows()[1].text(2), "4");
    }

    #[test]
    fn test_semicolon_and_tab_delimiters() {
        init();
        let table = Table::from_csv_str("gene;H2O_A;H2O_B\ng1;20,01;10,77\n").unwrap();
        assert_eq!(table.columns(), ["gene", "H2O_A", "H2O_B"]);
        assert_eq!(table.rows()[0].text(1), "20,01");

        let table = Table::from_csv_str("gene\tA\tB\ng1\t1\t2\n").unwrap();
        assert_eq!(table.columns().len(), 3);
    }

    #[test]
    fn test_ragged_rows_and_blank_lines() {
        init();
        let table = Table::from_csv_str("a,b,c\n1,2\n,,\n4,5,6,7\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].cells()[2], Value::Null);
        assert_eq!(table.rows()[1].cells().len(), 3);
        assert_eq!(table.rows()[1].key(), 1);
    }

    #[test]
    fn test_duplicate_and_empty_headers() {
        let table = Table::new(vec!["x".into(), "".into(), "x".into()]);
        assert_eq!(table.columns(), ["x", "column_2", "x_1"]);
    }

    #[test]
    fn test_records_keep_first_row_column_order() {
        init();
        let records = vec![
            json!({"locus_tag": "gene_1", "PC1": 0.5, "PC2": -0.1}),
            json!({"PC2": 0.3, "locus_tag": "gene_2"}),
        ];
        let table = Table::from_records(&records).unwrap();
        assert_eq!(table.columns(), ["locus_tag", "PC1", "PC2"]);
        assert_eq!(table.rows()[1].cells()[1], Value::Null);
        assert_eq!(table.rows()[0].text(1), "0.5");

        let back = serde_json::to_value(&table).unwrap();
        assert_eq!(back[1]["locus_tag"], "gene_2");
        assert_eq!(back[1]["PC1"], Value::Null);
    }

    #[test]
    fn test_deserialize_records() {
        let table: Table =
            serde_json::from_str(r#"[{"id": "a", "v": 1}, {"id": "b", "v": 2}]"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("v"), Some(1));

        let err = serde_json::from_str::<Table>(r#"[1, 2]"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_not_an_object() {
        let err = Table::from_records(&[json!({"a": 1}), json!("b")]).unwrap_err();
        assert!(matches!(err, TableError::NotAnObject { index: 1 }));
    }

    #[test]
    fn test_write_csv() {
        init();
        let table = Table::from_records(&[
            json!({"Principal component": "PC1", "gene": "g, 1", "Loadings": 0.25}),
        ])
        .unwrap();
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Principal component,gene,Loadings\nPC1,\"g, 1\",0.25\n"
        );
    }

    #[test]
    fn test_empty_input() {
        let table = Table::from_records(&[]).unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        let table = Table::from_csv_str("").unwrap();
        assert!(table.is_empty());
    }
}
