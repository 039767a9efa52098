//! Types for CSV bulk import of deliveries

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::defaults::MAX_REPORTED_IMPORT_ERRORS;

/// Columns every delivery row must fill in
pub const REQUIRED_DELIVERY_COLUMNS: [&str; 4] = [
    "customerName",
    "customerStreet",
    "customerCity",
    "customerPostcode",
];

pub const OPTIONAL_DELIVERY_COLUMNS: [&str; 11] = [
    "pickupName",
    "pickupStreet",
    "pickupCity",
    "pickupPostcode",
    "packageWeight",
    "packageDimensions",
    "packageType",
    "customerLat",
    "customerLng",
    "pickupLat",
    "pickupLng",
];

/// One data line of the uploaded file
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// Line in the file as the user sees it; the first data row is 2
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

impl ImportRow {
    /// Trimmed value, `None` when the column is absent or blank
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Succeeded,
    Failed(String),
}

/// A failed row as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

/// Result of a bulk import run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// First failures in row order, capped
    pub errors: Vec<ImportRowError>,
}

impl ImportSummary {
    /// Count one processed row
    pub fn record(&mut self, row_number: usize, outcome: RowOutcome) {
        self.total += 1;
        match outcome {
            RowOutcome::Succeeded => self.successful += 1,
            RowOutcome::Failed(message) => {
                self.failed += 1;
                if self.errors.len() < MAX_REPORTED_IMPORT_ERRORS {
                    self.errors.push(ImportRowError { row: row_number, message });
                }
            }
        }
    }

    /// Plain-text report for logs and the CLI
    pub fn report(&self, filename: &str) -> String {
        let mut report = format!("Delivery import from '{}'\n", filename);
        report.push_str(&format!("Total rows: {}\n", self.total));
        report.push_str(&format!("Imported: {}\n", self.successful));
        report.push_str(&format!("Failed: {}\n", self.failed));

        if !self.errors.is_empty() {
            report.push_str("\nErrors:\n");
            for err in &self.errors {
                report.push_str(&format!("Row {}: {}\n", err.row, err.message));
            }
            let hidden = self.failed.saturating_sub(self.errors.len());
            if hidden > 0 {
                report.push_str(&format!("... and {} more\n", hidden));
            }
        }

        report
    }
}
