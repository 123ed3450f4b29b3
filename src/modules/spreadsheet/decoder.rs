use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::io::Cursor;

/// One decoded data row, keyed by header in sheet column order
pub type Row = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook contains no sheets")]
    NoSheets,

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Container format, chosen from the declared MIME type and file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
}

impl SheetFormat {
    pub fn detect(filename: &str, mimetype: &str) -> Self {
        let mimetype = mimetype.to_ascii_lowercase();
        let is_csv_ext = filename
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("csv"));

        if is_csv_ext || mimetype == "text/csv" || mimetype == "application/csv" {
            SheetFormat::Csv
        } else {
            SheetFormat::Workbook
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedSheet {
    /// Keys of the first row; empty when the sheet has no data rows
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl DecodedSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Decode the first sheet of `bytes`.
///
/// Missing cells become `""`, fully blank rows are skipped, empty header cells
/// are named `__EMPTY`, `__EMPTY_1`, ... and repeated headers get `_1`, `_2`, ...
pub fn decode(bytes: &[u8], format: SheetFormat) -> Result<DecodedSheet, DecodeError> {
    let grid = match format {
        SheetFormat::Workbook => workbook_grid(bytes)?,
        SheetFormat::Csv => csv_grid(bytes)?,
    };
    Ok(rows_from_grid(grid))
}

fn workbook_grid(bytes: &[u8]) -> Result<Vec<Vec<Value>>, DecodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoSheets)??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect())
}

fn csv_grid(bytes: &[u8]) -> Result<Vec<Vec<Value>>, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(csv_value).collect());
    }
    Ok(grid)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::String(String::new()),
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        // Excel serial date, the same number the cell holds
        Data::DateTime(dt) => float_value(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(e.to_string()),
    }
}

fn csv_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::String(field.to_string());
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => float_value(f),
        _ => Value::String(field.to_string()),
    }
}

fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        return Value::Number((f as i64).into());
    }
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(f.to_string()))
}

fn header_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

/// Turn the header row into unique keys.
///
/// A repeated header takes the next `_n` suffix that no other key uses yet,
/// so `A, A_1, A` becomes `A, A_1, A_2`.
fn header_keys(header: &[Value]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .map(|cell| {
            let text = header_text(cell);
            let base = if text.is_empty() {
                "__EMPTY".to_string()
            } else {
                text
            };

            let mut counter = seen.get(&base).copied().unwrap_or(0);
            if counter == 0 {
                seen.insert(base.clone(), 1);
                return base;
            }

            let mut key = format!("{}_{}", base, counter);
            while seen.contains_key(&key) {
                counter += 1;
                key = format!("{}_{}", base, counter);
            }
            seen.insert(base, counter + 1);
            seen.insert(key.clone(), 1);
            key
        })
        .collect()
}

fn rows_from_grid(grid: Vec<Vec<Value>>) -> DecodedSheet {
    let mut lines = grid.into_iter();
    let Some(header) = lines.next() else {
        return DecodedSheet::default();
    };
    let keys = header_keys(&header);

    let rows: Vec<Row> = lines
        .filter(|cells| !cells.iter().all(is_blank))
        .map(|cells| {
            let mut cells = cells.into_iter();
            keys.iter()
                .map(|key| {
                    let value = cells
                        .next()
                        .unwrap_or_else(|| Value::String(String::new()));
                    (key.clone(), value)
                })
                .collect()
        })
        .collect();

    let columns = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();

    DecodedSheet { columns, rows }
}
