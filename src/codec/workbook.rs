//! In-memory workbook: named sheets of row-major cells.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::cells;
use super::layout::{END_ROW, TOTAL_ROW};

static EMPTY: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Enum)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Cell {
    #[default]
    Empty,
    Number {
        value: f64,
    },
    Text {
        value: String,
    },
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text {
            value: value.into(),
        }
    }

    pub fn number(value: f64) -> Self {
        Cell::Number { value }
    }

    pub fn optional(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::number)
    }

    pub fn flag(value: bool) -> Self {
        Cell::text(if value { "Yes" } else { "No" })
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text { value } => value.trim().is_empty(),
            Cell::Number { .. } => false,
        }
    }

    /// Display text of the cell; numbers are rendered without trailing zeros.
    /// Text is returned as stored, surrounding whitespace included.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number { value } => value.to_string(),
            Cell::Text { value } => value.clone(),
        }
    }

    /// Numeric value of a number cell, or of text that parses as one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number { value } => value.is_finite().then_some(*value),
            Cell::Text { value } => cells::parse_number(value),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::text(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text { value }
    }
}

/// Normalizes a label or header for comparison: trimmed, lower-cased,
/// single-spaced, trailing colon dropped.
pub fn normalize_label(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(':')
        .trim_end()
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

/// Column positions of a located header row.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMap {
    pub row: usize,
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn index(&self, name: &str) -> Option<usize> {
        self.columns.get(&normalize_label(name)).copied()
    }

    pub fn cell<'a>(&self, row: &'a [Cell], name: &str) -> &'a Cell {
        self.index(name)
            .and_then(|i| row.get(i))
            .unwrap_or(&EMPTY)
    }

    pub fn text(&self, row: &[Cell], name: &str) -> String {
        self.cell(row, name).as_text()
    }

    pub fn number(&self, row: &[Cell], name: &str) -> Option<f64> {
        self.cell(row, name).as_number()
    }
}

/// Closing row of a table: a bare `Total` or `END` marker in the first
/// column and nothing but numbers or empty cells after it.
fn is_sentinel(row: &[Cell]) -> bool {
    let Some((Cell::Text { value }, rest)) = row.split_first() else {
        return false;
    };
    let marker = value.trim();
    (marker.eq_ignore_ascii_case(TOTAL_ROW) || marker.eq_ignore_ascii_case(END_ROW))
        && rest
            .iter()
            .all(|c| matches!(c, Cell::Empty | Cell::Number { .. }))
}

pub fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn push_blank(&mut self) {
        self.rows.push(Vec::new());
    }

    /// Appends a `label | value [| extra...]` row.
    pub fn push_labeled(&mut self, label: &str, value: Cell) {
        self.rows.push(vec![Cell::text(label), value]);
    }

    /// Row whose first non-blank cell matches `label`; returns the cells after it.
    pub fn lookup(&self, label: &str) -> Option<&[Cell]> {
        let wanted = normalize_label(label);
        self.rows.iter().find_map(|row| {
            let start = row.iter().position(|c| !c.is_blank())?;
            (normalize_label(&row[start].as_text()) == wanted).then(|| &row[start + 1..])
        })
    }

    /// First non-blank cell next to `label`.
    pub fn lookup_cell(&self, label: &str) -> Option<&Cell> {
        self.lookup(label)?.iter().find(|c| !c.is_blank())
    }

    pub fn lookup_text(&self, label: &str) -> Option<String> {
        self.lookup_cell(label).map(Cell::as_text)
    }

    pub fn lookup_number(&self, label: &str) -> Option<f64> {
        self.lookup_cell(label).and_then(Cell::as_number)
    }

    /// Finds the first row that contains every one of `required` as a cell.
    pub fn find_header(&self, required: &[&str]) -> Option<HeaderMap> {
        let wanted: Vec<String> = required.iter().map(|r| normalize_label(r)).collect();
        self.rows.iter().enumerate().find_map(|(i, row)| {
            let columns: HashMap<String, usize> = row
                .iter()
                .enumerate()
                .filter(|(_, c)| matches!(c, Cell::Text { .. }))
                .map(|(j, c)| (normalize_label(&c.as_text()), j))
                .collect();
            wanted
                .iter()
                .all(|w| columns.contains_key(w))
                .then_some(HeaderMap { row: i, columns })
        })
    }

    /// Data rows below a header, up to the first blank or sentinel row.
    pub fn table_rows(&self, header: &HeaderMap) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows
            .iter()
            .skip(header.row + 1)
            .take_while(|row| !is_blank_row(row) && !is_sentinel(row))
            .map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Sheet by name, ignoring case and surrounding whitespace.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        let wanted = normalize_label(name);
        self.sheets
            .iter()
            .find(|s| normalize_label(&s.name) == wanted)
    }

    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sheet {
        let mut sheet = Sheet::new("A_InstData");
        sheet.push_row(vec![Cell::text("A. Installation data")]);
        sheet.push_labeled("Installation name:", Cell::text("Works"));
        sheet.push_row(vec![Cell::Empty, Cell::text("Latitude"), Cell::Empty, Cell::number(48.1)]);
        sheet.push_blank();
        sheet.push_row(vec![Cell::text("ID"), Cell::text("Name"), Cell::text("Amount")]);
        sheet.push_row(vec![Cell::text("x1"), Cell::text("First"), Cell::text("1,5")]);
        sheet.push_row(vec![Cell::text("x2"), Cell::text("Second"), Cell::number(2.0)]);
        sheet.push_row(vec![Cell::text("Total"), Cell::Empty, Cell::number(3.5)]);
        sheet.push_row(vec![Cell::text("x3"), Cell::text("Hidden"), Cell::number(9.0)]);
        sheet
    }

    #[test]
    fn test_label_lookup() {
        let sheet = sample();
        assert_eq!(sheet.lookup_text("installation NAME"), Some("Works".to_string()));
        assert_eq!(sheet.lookup_number("Latitude"), Some(48.1));
        assert_eq!(sheet.lookup_text("Operator"), None);
    }

    #[test]
    fn test_header_mapping_stops_at_sentinel() {
        let sheet = sample();
        let header = sheet.find_header(&["id", "amount"]).unwrap();
        assert_eq!(header.row, 4);
        let rows: Vec<_> = sheet.table_rows(&header).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(header.number(rows[0], "Amount"), Some(1.5));
        assert_eq!(header.text(rows[1], "name"), "Second");
        assert_eq!(header.cell(rows[1], "missing"), &Cell::Empty);
    }

    #[test]
    fn test_ids_resembling_markers_are_data() {
        let mut sheet = Sheet::new("B_EmInst");
        sheet.push_row(vec![Cell::text("ID"), Cell::text("Name"), Cell::text("Amount")]);
        for id in ["Totalizer-A", "TOTAL-2", "End", " total "] {
            sheet.push_row(vec![Cell::text(id), Cell::text("Meter"), Cell::number(1.0)]);
        }
        sheet.push_row(vec![Cell::text("Total"), Cell::Empty, Cell::number(4.0)]);
        sheet.push_row(vec![Cell::text("x9"), Cell::text("After"), Cell::number(9.0)]);

        let header = sheet.find_header(&["id", "amount"]).unwrap();
        let ids: Vec<String> = sheet
            .table_rows(&header)
            .map(|row| header.text(row, "id"))
            .collect();
        assert_eq!(ids, ["Totalizer-A", "TOTAL-2", "End", " total "]);
    }

    #[test]
    fn test_text_keeps_surrounding_whitespace() {
        assert_eq!(Cell::text("  Kiln 1 ").as_text(), "  Kiln 1 ");
        assert!(Cell::text("   ").is_blank());
    }

    #[test]
    fn test_missing_header() {
        assert!(sample().find_header(&["id", "unit"]).is_none());
    }

    #[test]
    fn test_sheet_lookup_ignores_case() {
        let book = Workbook {
            sheets: vec![sample()],
        };
        assert!(book.sheet("a_instdata").is_some());
        assert!(book.sheet("B_EmInst").is_none());
    }

    #[test]
    fn test_cell_serde_shape() {
        let json = serde_json::to_string(&Cell::number(1.5)).unwrap();
        assert_eq!(json, r#"{"type":"number","value":1.5}"#);
    }
}
