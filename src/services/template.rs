//! Downloadable CSV template for the delivery import

use anyhow::{Context, Result};

use crate::types::{OPTIONAL_DELIVERY_COLUMNS, REQUIRED_DELIVERY_COLUMNS};

const EXAMPLE_ROW: [&str; 15] = [
    "Jane Cooper",
    "22 Baker Street",
    "London",
    "NW1 6XE",
    "Main Warehouse",
    "1 Depot Road",
    "London",
    "E1 6AN",
    "2.5",
    "30x20x15",
    "Parcel",
    "51.5237",
    "-0.1585",
    "51.5074",
    "-0.1278",
];

/// Header row with every known column plus one filled-in example
pub fn delivery_template() -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(
        REQUIRED_DELIVERY_COLUMNS
            .iter()
            .chain(OPTIONAL_DELIVERY_COLUMNS.iter()),
    )?;
    writer.write_record(EXAMPLE_ROW)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV template: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV template is not valid UTF-8")
}
