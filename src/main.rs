use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;

use wavepart::batch::{ptm1_batch, ptm3_batch, ptm4_batch, ptm5_batch};
use wavepart::io::{json, summary};
use wavepart::{Ptm1Options, Ptm3Options, WindContext};

const USAGE: &str = "\
Usage: wavepart <input.spec|input.json> [options]

Options:
  --method <ptm1|ptm2|ptm3|ptm4|ptm5>   Partitioning method (default ptm1)
  --swells <N>        Swell partitions for ptm1 (default 3)
  --parts <N>         Partitions to keep for ptm3 (default 3)
  --agefac <F>        Wave-age multiplier (default 1.7)
  --wscut <F>         Wind-sea fraction cutoff (default 0.3333)
  --hs-min <F>        Minimum partition Hs (default 0, disabled)
  --smooth            Compute watershed labels over a smoothed spectrum
  --window <N>        Smoothing window size (default 3)
  --combine           Merge excess partitions instead of discarding them
  --fcut <F>          Cutoff frequency for ptm5 (Hz)
  --no-interpolate    Do not insert fcut into the frequency grid (ptm5)
  --wspd <F>          Wind speed override applied to every spectrum
  --wdir <F>          Wind direction override (degrees)
  --dpt <F>           Depth override (m)
  --output <FILE>     Partitioned spectra JSON (default <input>.part.json)
  --summary <FILE>    Per-partition Hs summary CSV
";

struct Args {
    input: PathBuf,
    method: String,
    ptm1: Ptm1Options,
    ptm3: Ptm3Options,
    fcut: Option<f64>,
    interpolate: bool,
    wind_override: (Option<f64>, Option<f64>, Option<f64>),
    output: Option<PathBuf>,
    summary: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut argv = std::env::args().skip(1);
    let mut input = None;
    let mut args = Args {
        input: PathBuf::new(),
        method: "ptm1".to_string(),
        ptm1: Ptm1Options::default(),
        ptm3: Ptm3Options::default(),
        fcut: None,
        interpolate: true,
        wind_override: (None, None, None),
        output: None,
        summary: None,
    };

    while let Some(arg) = argv.next() {
        let mut value = |name: &str| -> Result<String> {
            argv.next().with_context(|| format!("{name} needs a value"))
        };
        match arg.as_str() {
            "--method" => args.method = value("--method")?.to_ascii_lowercase(),
            "--swells" => args.ptm1.swells = value("--swells")?.parse()?,
            "--parts" => args.ptm3.parts = value("--parts")?.parse()?,
            "--agefac" => args.ptm1.agefac = value("--agefac")?.parse()?,
            "--wscut" => args.ptm1.wscut = value("--wscut")?.parse()?,
            "--hs-min" => {
                let v: f64 = value("--hs-min")?.parse()?;
                args.ptm1.hs_min = v;
                args.ptm3.hs_min = v;
            }
            "--smooth" => {
                args.ptm1.smooth = true;
                args.ptm3.smooth = true;
            }
            "--window" => {
                let v: usize = value("--window")?.parse()?;
                args.ptm1.window = v;
                args.ptm3.window = v;
            }
            "--combine" => {
                args.ptm1.combine = true;
                args.ptm3.combine = true;
            }
            "--fcut" => args.fcut = Some(value("--fcut")?.parse()?),
            "--no-interpolate" => args.interpolate = false,
            "--wspd" => args.wind_override.0 = Some(value("--wspd")?.parse()?),
            "--wdir" => args.wind_override.1 = Some(value("--wdir")?.parse()?),
            "--dpt" => args.wind_override.2 = Some(value("--dpt")?.parse()?),
            "--output" => args.output = Some(PathBuf::from(value("--output")?)),
            "--summary" => args.summary = Some(PathBuf::from(value("--summary")?)),
            "--help" | "-h" => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("Unknown option {other}\n\n{USAGE}"),
            other => {
                if input.replace(PathBuf::from(other)).is_some() {
                    bail!("More than one input file given\n\n{USAGE}");
                }
            }
        }
    }

    args.input = input.with_context(|| format!("No input file given\n\n{USAGE}"))?;
    Ok(args)
}

/// One wind context per spectrum: a CLI override applies to the whole batch,
/// otherwise each record must carry its own wind data.
fn resolve_winds(
    loaded: &wavepart::io::LoadedSpectra,
    over: (Option<f64>, Option<f64>, Option<f64>),
) -> Result<Vec<WindContext>> {
    if let (Some(wspd), Some(wdir)) = (over.0, over.1) {
        return Ok(vec![WindContext::new(wspd, wdir, over.2)]);
    }
    loaded
        .winds
        .iter()
        .enumerate()
        .map(|(i, w)| {
            w.with_context(|| {
                format!("Spectrum {i} has no wind data; pass --wspd/--wdir or use ptm3/ptm5")
            })
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let loaded = wavepart::io::load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!(
        "loaded {} spectra from {}",
        loaded.spectra.len(),
        args.input.display()
    );

    let sets = match args.method.as_str() {
        "ptm1" => {
            let winds = resolve_winds(&loaded, args.wind_override)?;
            ptm1_batch(&loaded.spectra, &winds, &args.ptm1)?
        }
        "ptm2" => bail!("{}", wavepart::PartitionError::UnsupportedMethod("PTM2")),
        "ptm3" => ptm3_batch(&loaded.spectra, &args.ptm3),
        "ptm4" => {
            let winds = resolve_winds(&loaded, args.wind_override)?;
            ptm4_batch(&loaded.spectra, &winds, args.ptm1.agefac)?
        }
        "ptm5" => {
            let fcut = args.fcut.context("ptm5 needs --fcut")?;
            ptm5_batch(&loaded.spectra, fcut, args.interpolate)
        }
        other => bail!("Unknown method {other:?}\n\n{USAGE}"),
    };
    info!("partitioned {} spectra with {}", sets.len(), args.method);

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("part.json"));
    json::write_partitions_json(&output, &sets, &loaded.times)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("wrote {}", output.display());

    if let Some(summary_path) = &args.summary {
        summary::write_hs_summary(summary_path, &sets, &loaded.times)
            .with_context(|| format!("writing {}", summary_path.display()))?;
        info!("wrote {}", summary_path.display());
    }
    Ok(())
}
