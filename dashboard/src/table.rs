use crate::loaders::Record;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    pub id: String,
    pub name: String,
}

/// One page of tabular issue data.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TablePage {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub page: usize,
    pub page_count: usize,
    pub total_rows: usize,
}

impl TablePage {
    /// Builds the requested page. Columns come from the first record's keys;
    /// `page` is 1-based and clamped into range.
    pub fn build(records: &[Record], page: usize, page_size: usize) -> Self {
        let columns: Vec<Column> = records
            .first()
            .map(|first| {
                first
                    .keys()
                    .map(|key| Column {
                        id: key.clone(),
                        name: capitalize(key),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let page_size = page_size.max(1);
        let page_count = records.len().div_ceil(page_size).max(1);
        let page = page.clamp(1, page_count);

        let rows = records
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(&column.id).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        TablePage {
            columns,
            rows,
            page,
            page_count,
            total_rows: records.len(),
        }
    }
}

// First character upper-cased, the rest lower-cased.
fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
