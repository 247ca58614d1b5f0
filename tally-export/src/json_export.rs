use anyhow::{Context, Result};
use std::io::Write;
use tally_core::Transaction;

/// Pretty-printed JSON array, same field names as the stored records.
pub fn write_json<W: Write>(view: &[Transaction], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, view).context("serializing json")?;
    writer.write_all(b"\n").context("writing json")?;
    Ok(())
}
