use std::path::Path;

use anyhow::{Context, Result};

use crate::spectrum::PartitionSet;

/// Write a per-partition Hs summary table as CSV.
///
/// Columns: spectrum index, timestamp (blank when unknown), partition index,
/// significant wave height. One row per (spectrum, partition).
pub fn write_hs_summary(
    path: &Path,
    sets: &[PartitionSet],
    times: &[Option<String>],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating summary CSV")?;
    writer
        .write_record(["spectrum", "time", "partition", "hs"])
        .context("writing CSV header")?;

    for (i, set) in sets.iter().enumerate() {
        let time = times.get(i).cloned().flatten().unwrap_or_default();
        for k in 0..set.len() {
            writer
                .write_record([
                    i.to_string(),
                    time.clone(),
                    k.to_string(),
                    format!("{:.6}", set.hs(k)),
                ])
                .with_context(|| format!("writing row for spectrum {i}, partition {k}"))?;
        }
    }
    writer.flush().context("flushing summary CSV")?;
    Ok(())
}
