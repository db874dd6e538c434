use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::LoadedSpectra;
use crate::partition::WindContext;
use crate::spectrum::{PartitionSet, Spectrum};

// ---------------------------------------------------------------------------
// Records-oriented JSON schema
// ---------------------------------------------------------------------------

/// One spectrum record.
///
/// ```json
/// {
///   "freq": [0.04, 0.05, ...],
///   "dir":  [0.0, 15.0, ...],
///   "efth": [[0.0, 0.1, ...], ...],
///   "wspd": 12.5, "wdir": 270.0, "dpt": 50.0,
///   "time": "2023-01-01T00:00:00"
/// }
/// ```
/// `efth` rows follow the frequency axis; wind fields and `time` are
/// optional.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpectrumRecord {
    pub freq: Vec<f64>,
    pub dir: Vec<f64>,
    pub efth: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wspd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wdir: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Read a records-oriented JSON spectra file.
pub fn read_json(path: &Path) -> Result<LoadedSpectra> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<SpectrumRecord> =
        serde_json::from_str(&text).context("parsing JSON spectra records")?;

    let mut out = LoadedSpectra::default();
    for (i, rec) in records.into_iter().enumerate() {
        let nfreq = rec.freq.len();
        let ndir = rec.dir.len();
        if rec.efth.len() != nfreq {
            bail!(
                "Record {i}: efth has {} rows but freq has {} values",
                rec.efth.len(),
                nfreq
            );
        }
        let mut energy = Array2::zeros((nfreq, ndir));
        for (r, row) in rec.efth.iter().enumerate() {
            if row.len() != ndir {
                bail!(
                    "Record {i}, row {r}: {} values but dir has {}",
                    row.len(),
                    ndir
                );
            }
            for (c, &v) in row.iter().enumerate() {
                energy[[r, c]] = v;
            }
        }

        let spectrum = Spectrum::new(rec.freq, rec.dir, energy)
            .with_context(|| format!("Record {i}: invalid spectrum"))?;

        let wind = match (rec.wspd, rec.wdir) {
            (Some(wspd), Some(wdir)) => Some(WindContext::new(wspd, wdir, rec.dpt)),
            _ => None,
        };
        out.spectra.push(spectrum);
        out.winds.push(wind);
        out.times.push(rec.time);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Partitioned output
// ---------------------------------------------------------------------------

/// One partitioned spectrum: the input grid split along a partition index
/// axis. Partition meaning is positional, per the method that produced it.
#[derive(Debug, Serialize, Deserialize)]
pub struct PartitionRecord {
    pub freq: Vec<f64>,
    pub dir: Vec<f64>,
    /// `parts[k][i][j]` = energy of partition `k` at frequency `i`,
    /// direction `j`.
    pub parts: Vec<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Write partitioned spectra as records-oriented JSON.
pub fn write_partitions_json(
    path: &Path,
    sets: &[PartitionSet],
    times: &[Option<String>],
) -> Result<()> {
    let records: Vec<PartitionRecord> = sets
        .iter()
        .enumerate()
        .map(|(i, set)| PartitionRecord {
            freq: set.freq.clone(),
            dir: set.dir.clone(),
            parts: set
                .parts
                .iter()
                .map(|p| p.rows().into_iter().map(|row| row.to_vec()).collect())
                .collect(),
            time: times.get(i).cloned().flatten(),
        })
        .collect();

    let file = std::fs::File::create(path).context("creating output JSON file")?;
    serde_json::to_writer(std::io::BufWriter::new(file), &records)
        .context("writing partitioned JSON")?;
    Ok(())
}
