use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::extract::RawTable;

/// Canonical field names, in the one and only order that matters. The
/// source file's columns are mapped onto these strictly by position.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    "company_name",
    "ship_name",
    "built_year",
    "gross_tonnage",
    "deadweight_tonnage",
    "length",
    "width",
];

/// One vessel in the canonical schema. Field order mirrors
/// [`CANONICAL_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipRecord {
    /// Owning/operating entity. Many ships share a company.
    pub company_name: String,
    /// Vessel name. Not guaranteed unique.
    pub ship_name: String,
    /// Calendar year of construction.
    pub built_year: i32,
    /// Gross tonnage (volumetric).
    pub gross_tonnage: f64,
    /// Deadweight tonnage (carrying capacity).
    pub deadweight_tonnage: f64,
    /// Length overall, meters.
    pub length: f64,
    /// Beam, meters.
    pub width: f64,
}

/// How to treat the source file's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Ignore header names entirely; columns map by position. This is the
    /// original contract: reordering the source columns silently corrupts
    /// the mapping.
    Positional,
    /// Additionally require the header names to match the canonical seven
    /// (case-insensitive, trimmed). Opt-in guard against reordered files.
    Strict,
}

/// Map `table` onto the canonical schema, preserving row order.
///
/// Fails with `MalformedInput` when the table is not exactly seven columns
/// wide, when a numeric field does not parse, or (in strict mode) when the
/// header names do not match.
pub fn normalize(table: &RawTable, mode: HeaderMode) -> Result<Vec<ShipRecord>> {
    if table.headers.len() != CANONICAL_COLUMNS.len() {
        return Err(PipelineError::MalformedInput(format!(
            "expected {} columns, found {}",
            CANONICAL_COLUMNS.len(),
            table.headers.len()
        )));
    }

    if mode == HeaderMode::Strict {
        for (found, expected) in table.headers.iter().zip(CANONICAL_COLUMNS) {
            if !found.trim().eq_ignore_ascii_case(expected) {
                return Err(PipelineError::MalformedInput(format!(
                    "strict header check: found `{found}` where `{expected}` was expected"
                )));
            }
        }
    }

    let ships = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| record_from_row(row, i + 1))
        .collect::<Result<Vec<_>>>()?;

    info!(rows = ships.len(), "normalized");
    Ok(ships)
}

fn record_from_row(row: &[String], row_no: usize) -> Result<ShipRecord> {
    // Row width matches the header's; the extractor rejects ragged rows.
    Ok(ShipRecord {
        company_name: row[0].clone(),
        ship_name: row[1].clone(),
        built_year: parse_field(&row[2], CANONICAL_COLUMNS[2], row_no)?,
        gross_tonnage: parse_field(&row[3], CANONICAL_COLUMNS[3], row_no)?,
        deadweight_tonnage: parse_field(&row[4], CANONICAL_COLUMNS[4], row_no)?,
        length: parse_field(&row[5], CANONICAL_COLUMNS[5], row_no)?,
        width: parse_field(&row[6], CANONICAL_COLUMNS[6], row_no)?,
    })
}

fn parse_field<T>(raw: &str, column: &str, row_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e| {
        PipelineError::MalformedInput(format!("row {row_no}: {column} `{raw}`: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn fleet_headers() -> Vec<&'static str> {
        vec!["Company_Name", "Ship_Name", "Built_Year", "GT", "DWT", "Length", "Width"]
    }

    #[test]
    fn maps_columns_by_position_and_keeps_order() {
        let raw = table(
            &fleet_headers(),
            &[
                &["Maersk", "Alpha", "2001", "50000", "80000", "300", "40"],
                &["MSC", "Gamma", "2010", "60000", "90000", "320", "42"],
            ],
        );
        let ships = normalize(&raw, HeaderMode::Positional).unwrap();
        assert_eq!(ships.len(), 2);
        assert_eq!(ships[0].company_name, "Maersk");
        assert_eq!(ships[0].built_year, 2001);
        assert_eq!(ships[1].ship_name, "Gamma");
        assert_eq!(ships[1].width, 42.0);
    }

    #[test]
    fn header_names_are_not_consulted_in_positional_mode() {
        // Nonsense headers still map fine; only position counts.
        let raw = table(
            &["x1", "x2", "x3", "x4", "x5", "x6", "x7"],
            &[&["Maersk", "Alpha", "2001", "50000", "80000", "300", "40"]],
        );
        let ships = normalize(&raw, HeaderMode::Positional).unwrap();
        assert_eq!(ships[0].ship_name, "Alpha");
    }

    #[test]
    fn wrong_column_count_is_malformed() {
        let raw = table(&["a", "b", "c"], &[]);
        let err = normalize(&raw, HeaderMode::Positional).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput(_)));
    }

    #[test]
    fn unparseable_numeric_is_malformed() {
        let raw = table(
            &fleet_headers(),
            &[&["Maersk", "Alpha", "not-a-year", "50000", "80000", "300", "40"]],
        );
        let err = normalize(&raw, HeaderMode::Positional).unwrap_err();
        match err {
            PipelineError::MalformedInput(msg) => {
                assert!(msg.contains("built_year"), "{msg}");
                assert!(msg.contains("row 1"), "{msg}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn strict_mode_rejects_mismatched_headers() {
        let raw = table(
            &fleet_headers(),
            &[&["Maersk", "Alpha", "2001", "50000", "80000", "300", "40"]],
        );
        // "GT" is not the canonical "gross_tonnage".
        let err = normalize(&raw, HeaderMode::Strict).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput(_)));
    }

    #[test]
    fn strict_mode_accepts_canonical_headers_case_insensitively() {
        let raw = table(
            &[
                "Company_Name",
                "SHIP_NAME",
                "built_year",
                "Gross_Tonnage",
                "deadweight_tonnage",
                "Length",
                "width",
            ],
            &[&["Maersk", "Alpha", "2001", "50000", "80000", "300", "40"]],
        );
        assert!(normalize(&raw, HeaderMode::Strict).is_ok());
    }

    #[test]
    fn empty_table_normalizes_to_zero_records() {
        let raw = table(&fleet_headers(), &[]);
        assert!(normalize(&raw, HeaderMode::Positional).unwrap().is_empty());
    }
}
