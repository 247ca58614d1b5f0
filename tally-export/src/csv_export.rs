//! CSV export.
//!
//! One header row, then one row per transaction in view order:
//! ID,Date,Description,Amount,Type,Category,Status,Counterparty,Due Date

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use tally_core::Transaction;
use tally_core::draft::DATE_FORMAT;

pub const HEADER: [&str; 9] = [
    "ID",
    "Date",
    "Description",
    "Amount",
    "Type",
    "Category",
    "Status",
    "Counterparty",
    "Due Date",
];

#[derive(Debug, Serialize)]
struct Row<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Type")]
    kind: &'static str,
    #[serde(rename = "Category")]
    category: &'static str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Counterparty")]
    counterparty: &'a str,
    #[serde(rename = "Due Date")]
    due_date: String,
}

impl<'a> From<&'a Transaction> for Row<'a> {
    fn from(t: &'a Transaction) -> Self {
        Row {
            id: t.id(),
            date: t.date().format(DATE_FORMAT).to_string(),
            description: t.description(),
            amount: format!("{:.2}", t.amount()),
            kind: t.kind().as_str(),
            category: t.category().label(),
            status: t.status().as_str(),
            counterparty: t.counterparty().unwrap_or_default(),
            due_date: t
                .due_date()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

pub fn write_csv<W: Write>(view: &[Transaction], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    // written by hand so an empty view still gets a header
    wtr.write_record(HEADER).context("writing csv header")?;
    for t in view {
        wtr.serialize(Row::from(t))
            .with_context(|| format!("writing csv row {}", t.id()))?;
    }
    wtr.flush().context("flushing csv")?;
    Ok(())
}
