use tracing::info;

use crate::error::{PipelineError, Result};
use crate::transform::ShipRecord;

/// In-memory fleet store with the same replace contract as
/// [`super::pg::PgFleet`]: rows are staged first and only swapped in once
/// every insert has succeeded. Backs offline runs and lets the atomicity
/// property be exercised without a server.
#[derive(Debug, Default)]
pub struct MemFleet {
    rows: Vec<ShipRecord>,
    fail_after: Option<usize>,
}

impl MemFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects the insert of row `k` (0-based). Failure
    /// injection for the all-or-nothing swap contract.
    pub fn with_fault(k: usize) -> Self {
        Self {
            rows: Vec::new(),
            fail_after: Some(k),
        }
    }

    /// Replace the table's entire content with `rows`, or leave it exactly
    /// as it was.
    pub fn replace_all(&mut self, rows: &[ShipRecord]) -> Result<u64> {
        let mut staged = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if self.fail_after == Some(i) {
                return Err(PipelineError::WriteFailed(format!(
                    "injected failure at row {i}"
                )));
            }
            staged.push(row.clone());
        }

        let loaded = staged.len() as u64;
        self.rows = staged; // the swap
        info!(rows = loaded, "in-memory fleet table replaced");
        Ok(loaded)
    }

    pub fn fetch_all(&self) -> Vec<ShipRecord> {
        self.rows.clone()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(name: &str, length: f64) -> ShipRecord {
        ShipRecord {
            company_name: "Maersk".into(),
            ship_name: name.into(),
            built_year: 2001,
            gross_tonnage: 50_000.0,
            deadweight_tonnage: 80_000.0,
            length,
            width: 40.0,
        }
    }

    #[test]
    fn replace_is_idempotent() {
        let rows = vec![ship("Alpha", 300.0), ship("Beta", 280.0)];
        let mut fleet = MemFleet::new();

        assert_eq!(fleet.replace_all(&rows).unwrap(), 2);
        assert_eq!(fleet.replace_all(&rows).unwrap(), 2);
        // No duplication, no residue from the first load.
        assert_eq!(fleet.fetch_all(), rows);
    }

    #[test]
    fn failed_load_leaves_prior_extent_untouched() {
        let before = vec![ship("Alpha", 300.0)];
        let mut fleet = MemFleet::new();
        fleet.replace_all(&before).unwrap();
        fleet.fail_after = Some(1);

        let next = vec![ship("Beta", 280.0), ship("Gamma", 320.0), ship("Delta", 310.0)];
        let err = fleet.replace_all(&next).unwrap_err();
        assert!(matches!(err, PipelineError::WriteFailed(_)));

        // Exactly the pre-load state: never a mixture.
        assert_eq!(fleet.fetch_all(), before);
    }

    #[test]
    fn fault_on_first_row_keeps_empty_table_empty() {
        let mut fleet = MemFleet::with_fault(0);
        assert!(fleet.replace_all(&[ship("Alpha", 300.0)]).is_err());
        assert!(fleet.is_empty());
    }

    #[test]
    fn loading_zero_rows_succeeds_with_empty_table() {
        let mut fleet = MemFleet::new();
        fleet.replace_all(&[ship("Alpha", 300.0)]).unwrap();
        assert_eq!(fleet.replace_all(&[]).unwrap(), 0);
        assert!(fleet.is_empty());
    }
}
