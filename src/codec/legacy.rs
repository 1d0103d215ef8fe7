//! Reader for the older purchased-precursor layout.
//!
//! That layout has no table: each precursor is a block opened by a
//! "Purchased precursor N" heading, followed by free-form rows whose text
//! contains a marker ("Name of precursor", "Total quantity", ...) and whose
//! value sits in the next non-blank cell. Emission values are specific
//! (per tonne) and are scaled by the quantity on import.

use nom::{
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0, multispace1, u32 as number},
    combinator::{all_consuming, opt},
    sequence::{delimited, preceded},
    IResult, Parser,
};

use super::cells::is_not_provided;
use super::layout::legacy as marker;
use super::workbook::{normalize_label, Cell, Sheet};
use crate::precursors::{PurchasedPrecursor, SupplierIdentity};

/// "Purchased precursor 3" -> 3
fn heading(input: &str) -> IResult<&str, u32> {
    all_consuming(delimited(
        multispace0,
        preceded(
            (tag_no_case(marker::PRECURSOR), multispace1),
            number,
        ),
        (multispace0, opt(char(':'))),
    ))
    .parse(input)
}

pub fn parse_heading(text: &str) -> Option<u32> {
    heading(text.trim()).ok().map(|(_, n)| n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Name,
    Quantity,
    SpecificDirect,
    SpecificIndirect,
    ElectricitySource,
    ElectricityFactor,
    Electricity,
    Justification,
    SupplierInstallation,
}

// Longer markers first: "source/method of electricity emission factor"
// contains "electricity emission factor".
const MARKERS: [(&str, Marker); 9] = [
    (marker::ELECTRICITY_SOURCE, Marker::ElectricitySource),
    (marker::ELECTRICITY_EF, Marker::ElectricityFactor),
    (marker::ELECTRICITY, Marker::Electricity),
    (marker::SPECIFIC_DIRECT, Marker::SpecificDirect),
    (marker::SPECIFIC_INDIRECT, Marker::SpecificIndirect),
    (marker::JUSTIFICATION, Marker::Justification),
    (marker::SUPPLIER_INSTALLATION, Marker::SupplierInstallation),
    (marker::NAME, Marker::Name),
    (marker::QUANTITY, Marker::Quantity),
];

/// One precursor block as read, before scaling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyEntry {
    pub index: u32,
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: String,
    pub specific_direct: Option<f64>,
    pub specific_indirect: Option<f64>,
    /// MWh per tonne.
    pub specific_electricity: Option<f64>,
    pub electricity_factor: Option<f64>,
    pub electricity_source: String,
    pub justification: Option<String>,
    pub supplier_installation: String,
}

impl LegacyEntry {
    fn is_empty(&self) -> bool {
        *self
            == LegacyEntry {
                index: self.index,
                ..LegacyEntry::default()
            }
    }

    pub fn into_precursor(self) -> PurchasedPrecursor {
        let quantity = self.quantity.unwrap_or(0.0);
        let justification = self
            .justification
            .filter(|text| !is_not_provided(text));
        PurchasedPrecursor {
            id: self.index.to_string(),
            name: self.name,
            total_quantity: quantity,
            unit: self.unit,
            supplier: SupplierIdentity {
                installation_id: self.supplier_installation,
                ..SupplierIdentity::default()
            },
            direct_embedded_emissions: self.specific_direct.unwrap_or(0.0) * quantity,
            indirect_embedded_emissions: self.specific_indirect.map(|s| s * quantity),
            electricity_consumption: self.specific_electricity.map(|s| s * quantity),
            electricity_emission_factor: self.electricity_factor,
            electricity_factor_source: self.electricity_source,
            uses_default_values: justification.is_some(),
            default_value_justification: justification.unwrap_or_default(),
            ..PurchasedPrecursor::default()
        }
    }
}

/// Row-at-a-time scanner over a legacy sheet. Each [`step`](Self::step)
/// consumes the scan state and returns the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerScan {
    current_index: Option<usize>,
    entries: Vec<LegacyEntry>,
}

fn find_marker(row: &[Cell]) -> Option<(Marker, usize)> {
    row.iter().enumerate().find_map(|(i, cell)| {
        let Cell::Text { value } = cell else {
            return None;
        };
        let text = normalize_label(value);
        MARKERS
            .iter()
            .find(|(m, _)| text.contains(&m.to_lowercase()))
            .map(|(_, kind)| (*kind, i))
    })
}

impl MarkerScan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, row: &[Cell]) -> Self {
        self.apply(row);
        self
    }

    fn apply(&mut self, row: &[Cell]) {
        let Some(first) = row.iter().find(|c| !c.is_blank()) else {
            return;
        };
        if let Some(index) = parse_heading(&first.as_text()) {
            let position = match self.entries.iter().position(|e| e.index == index) {
                Some(position) => position,
                None => {
                    self.entries.push(LegacyEntry {
                        index,
                        ..LegacyEntry::default()
                    });
                    self.entries.len() - 1
                }
            };
            self.current_index = Some(position);
            return;
        }

        let Some(entry) = self.current_index.and_then(|i| self.entries.get_mut(i)) else {
            return;
        };
        let Some((kind, at)) = find_marker(row) else {
            return;
        };
        let mut values = row[at + 1..].iter().filter(|c| !c.is_blank());
        let value = values.next();
        let text = value.map(Cell::as_text).unwrap_or_default();
        let number = value.and_then(Cell::as_number);

        match kind {
            Marker::Name => entry.name = text,
            Marker::Quantity => {
                entry.quantity = number;
                entry.unit = values.next().map(Cell::as_text).unwrap_or_default();
            }
            Marker::SpecificDirect => entry.specific_direct = number,
            Marker::SpecificIndirect => entry.specific_indirect = number,
            Marker::Electricity => entry.specific_electricity = number,
            Marker::ElectricityFactor => entry.electricity_factor = number,
            Marker::ElectricitySource => entry.electricity_source = text,
            Marker::Justification => entry.justification = value.map(Cell::as_text),
            Marker::SupplierInstallation => entry.supplier_installation = text,
        }
    }

    pub fn finish(self) -> Vec<LegacyEntry> {
        let mut entries: Vec<_> = self.entries.into_iter().filter(|e| !e.is_empty()).collect();
        entries.sort_by_key(|e| e.index);
        entries
    }
}

/// Reads every legacy block on a sheet.
pub fn scan(sheet: &Sheet) -> Vec<PurchasedPrecursor> {
    sheet
        .rows
        .iter()
        .fold(MarkerScan::new(), |scan, row| scan.step(row))
        .finish()
        .into_iter()
        .map(LegacyEntry::into_precursor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells
            .iter()
            .map(|c| if c.is_empty() { Cell::Empty } else { Cell::text(*c) })
            .collect()
    }

    #[test]
    fn test_heading() {
        assert_eq!(parse_heading("Purchased precursor 2"), Some(2));
        assert_eq!(parse_heading("  PURCHASED PRECURSOR 10: "), Some(10));
        assert_eq!(parse_heading("Purchased precursors summary"), None);
        assert_eq!(parse_heading("Purchased precursor"), None);
    }

    #[test]
    fn test_scan_scales_specific_values() {
        let mut sheet = Sheet::new("E_PurchPrec");
        sheet.push_row(row(&["Purchased precursor 1"]));
        sheet.push_row(row(&["", "Name of precursor:", "", "Pig iron"]));
        sheet.push_row(row(&["Total quantity", "1.000,5", "t"]));
        sheet.push_row(row(&["(a) Specific embedded direct emissions", "2"]));
        sheet.push_row(row(&["(b) Specific embedded indirect emissions", "0,5"]));
        sheet.push_row(row(&["Electricity consumption", "0.5"]));
        sheet.push_row(row(&["Electricity emission factor", "0.4"]));
        sheet.push_row(row(&["Source/method of electricity emission factor", "Grid mix"]));
        sheet.push_row(row(&["Justification for use of default values", "n.a."]));

        let precursors = scan(&sheet);
        assert_eq!(precursors.len(), 1);
        let p = &precursors[0];
        assert_eq!(p.name, "Pig iron");
        assert_eq!(p.total_quantity, 1000.5);
        assert_eq!(p.unit, "t");
        assert_eq!(p.direct_embedded_emissions, 2001.0);
        assert_eq!(p.indirect_embedded_emissions, Some(500.25));
        assert_eq!(p.electricity_consumption, Some(500.25));
        assert_eq!(p.electricity_emission_factor, Some(0.4));
        assert_eq!(p.electricity_factor_source, "Grid mix");
        assert!(!p.uses_default_values);
    }

    #[test]
    fn test_rows_before_first_heading_are_ignored() {
        let scan = MarkerScan::new().step(&row(&["Total quantity", "50"]));
        assert_eq!(scan, MarkerScan::new());

        let entries = scan
            .step(&row(&["Purchased precursor 2"]))
            .step(&row(&["Justification for use of default values", "No supplier data"]))
            .step(&row(&["Purchased precursor 1"]))
            .step(&row(&["Name of precursor", "Coke"]))
            .step(&row(&["Purchased precursor 3"]))
            .finish();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].quantity, None);
        assert_eq!(entries[1].index, 2);
        assert_eq!(entries[1].justification.as_deref(), Some("No supplier data"));
        let p = entries[1].clone().into_precursor();
        assert!(p.uses_default_values);
        assert_eq!(p.id, "2");
    }
}
