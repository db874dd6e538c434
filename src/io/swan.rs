use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;
use ndarray::Array2;

use super::LoadedSpectra;
use crate::spectrum::Spectrum;

/// Exception value written for missing data, per SWAN convention.
const EXCEPTION: &str = "-0.9900E+02";

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Read a SWAN ASCII spectral file.
///
/// Supports stationary and nonstationary files with one or more locations;
/// spectra are emitted in (time, location) order. Directions are kept in
/// file order. `NODATA` blocks produce all-zero spectra.
pub fn read_swan(path: &Path) -> Result<LoadedSpectra> {
    let text = std::fs::read_to_string(path).context("reading SWAN file")?;
    let mut lines = text.lines().peekable();

    // Header
    let first = lines.next().context("empty SWAN file")?;
    if !first.contains("SWAN") {
        bail!("Not a SWAN spectral file: first line is {first:?}");
    }
    while lines.peek().is_some_and(|l| l.trim_start().starts_with('$')) {
        lines.next();
    }

    let mut has_time = false;
    if lines.peek().is_some_and(|l| l.contains("TIME")) {
        lines.next();
        // Time coding option line.
        lines.next().context("missing time coding line")?;
        has_time = true;
    }

    let locations = read_block(&mut lines, &["LONLAT", "LOCATIONS"])?;
    let npoints = locations.len();

    let freq: Vec<f64> = read_block(&mut lines, &["AFREQ", "RFREQ"])?
        .iter()
        .map(|l| parse_f64(l, "frequency"))
        .collect::<Result<_>>()?;
    let dir: Vec<f64> = read_block(&mut lines, &["NDIR", "CDIR"])?
        .iter()
        .map(|l| parse_f64(l, "direction"))
        .collect::<Result<_>>()?;

    // QUANT block: count line, then (name, unit, exception) per quantity.
    let quant_line = lines.next().context("missing QUANT header")?;
    if !quant_line.contains("QUANT") {
        bail!("Expected QUANT header, got {quant_line:?}");
    }
    let nquant: usize = lines
        .next()
        .context("missing quantity count")?
        .split_whitespace()
        .next()
        .context("empty quantity count line")?
        .parse()
        .context("parsing quantity count")?;
    for _ in 0..3 * nquant {
        lines.next().context("truncated QUANT block")?;
    }

    debug!(
        "SWAN header: {npoints} locations, {} freqs, {} dirs, time={has_time}",
        freq.len(),
        dir.len()
    );

    // Data blocks
    let mut out = LoadedSpectra::default();
    loop {
        let time = if has_time {
            match lines.next() {
                Some(line) if !line.trim().is_empty() => Some(line.trim().to_string()),
                _ => break,
            }
        } else {
            if lines.peek().is_none() {
                break;
            }
            None
        };

        for _ in 0..npoints {
            let marker = match lines.next() {
                Some(line) => line.trim().to_string(),
                None if !has_time => break,
                None => bail!("truncated data block"),
            };
            let energy = if marker.starts_with("NODATA") || marker.starts_with("ZERO") {
                Array2::zeros((freq.len(), dir.len()))
            } else if marker.starts_with("FACTOR") {
                let factor = parse_f64(
                    lines.next().context("missing FACTOR value")?,
                    "scale factor",
                )?;
                let mut energy = Array2::zeros((freq.len(), dir.len()));
                for i in 0..freq.len() {
                    let row = lines.next().context("truncated spectrum block")?;
                    let values: Vec<f64> = row
                        .split_whitespace()
                        .map(|tok| parse_f64(tok, "energy"))
                        .collect::<Result<_>>()?;
                    if values.len() != dir.len() {
                        bail!(
                            "spectrum row has {} values, expected {}",
                            values.len(),
                            dir.len()
                        );
                    }
                    for (j, v) in values.into_iter().enumerate() {
                        energy[[i, j]] = v * factor;
                    }
                }
                energy
            } else {
                bail!("Unexpected data marker {marker:?}");
            };

            out.spectra
                .push(Spectrum::new(freq.clone(), dir.clone(), energy)?);
            out.winds.push(None);
            out.times.push(time.clone());
        }
        if !has_time && lines.peek().is_none() {
            break;
        }
    }
    Ok(out)
}

/// Read a `KEYWORD / count / count lines` block from the header.
fn read_block<'a, I>(
    lines: &mut std::iter::Peekable<I>,
    keywords: &[&str],
) -> Result<Vec<&'a str>>
where
    I: Iterator<Item = &'a str>,
{
    let header = lines
        .next()
        .with_context(|| format!("missing {} header", keywords[0]))?;
    if !keywords.iter().any(|k| header.contains(k)) {
        bail!("Expected one of {keywords:?}, got {header:?}");
    }
    let n: usize = lines
        .next()
        .context("missing block count")?
        .split_whitespace()
        .next()
        .context("empty block count line")?
        .parse()
        .with_context(|| format!("parsing {} count", keywords[0]))?;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(lines.next().context("truncated header block")?);
    }
    Ok(out)
}

fn parse_f64(s: &str, what: &str) -> Result<f64> {
    s.split_whitespace()
        .next()
        .with_context(|| format!("empty {what} line"))?
        .parse::<f64>()
        .with_context(|| format!("parsing {what}: {s:?}"))
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Write spectra to a SWAN ASCII file at a single location.
///
/// Each grid is scaled to integers under a per-spectrum `FACTOR`, the way
/// SWAN itself writes variance density; all-zero spectra use the `ZERO`
/// marker.
pub fn write_swan(path: &Path, spectra: &[Spectrum], times: &[Option<String>]) -> Result<()> {
    let first = spectra.first().context("no spectra to write")?;
    // The header carries a single grid; every spectrum must share it.
    for (k, spec) in spectra.iter().enumerate().skip(1) {
        if spec.freq != first.freq || spec.dir != first.dir {
            bail!("spectrum {k} has different axes from the first");
        }
    }
    let has_time = times.iter().any(|t| t.is_some());

    let file = std::fs::File::create(path).context("creating SWAN file")?;
    let mut f = std::io::BufWriter::new(file);

    writeln!(f, "SWAN   1")?;
    writeln!(f, "$ Wave spectra written by wavepart")?;
    if has_time {
        writeln!(f, "TIME")?;
        writeln!(f, "     1")?;
    }
    writeln!(f, "LONLAT")?;
    writeln!(f, "     1")?;
    writeln!(f, "   0.000000   0.000000")?;
    writeln!(f, "AFREQ")?;
    writeln!(f, "{:6}", first.nfreq())?;
    for fr in &first.freq {
        writeln!(f, "{fr:12.4}")?;
    }
    writeln!(f, "NDIR")?;
    writeln!(f, "{:6}", first.ndir())?;
    for d in &first.dir {
        writeln!(f, "{d:12.4}")?;
    }
    writeln!(f, "QUANT")?;
    writeln!(f, "     1")?;
    writeln!(f, "VaDens")?;
    writeln!(f, "m2/Hz/degr")?;
    writeln!(f, "{EXCEPTION}")?;

    for (k, spec) in spectra.iter().enumerate() {
        if has_time {
            let t = times
                .get(k)
                .cloned()
                .flatten()
                .unwrap_or_else(|| "19700101.000000".to_string());
            writeln!(f, "{t}")?;
        }
        let max = spec
            .energy
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0f64, f64::max);
        if max <= 0.0 {
            writeln!(f, "ZERO")?;
            continue;
        }
        let factor = max / 99999.0;
        writeln!(f, "FACTOR")?;
        writeln!(f, "{factor:18.8E}")?;
        for i in 0..spec.nfreq() {
            let row: Vec<String> = (0..spec.ndir())
                .map(|j| {
                    let v = spec.energy[[i, j]];
                    let scaled = if v.is_finite() { (v / factor).round() } else { 0.0 };
                    format!("{:6}", scaled as i64)
                })
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
    }
    f.flush().context("flushing SWAN file")?;
    Ok(())
}
