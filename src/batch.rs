//! Data-parallel application of the per-spectrum methods over collections.
//!
//! Spectra in a batch (a time series, a set of sites, ensemble members) have
//! no data dependency on one another, so each method is applied as an
//! embarrassingly parallel map: one independent set of working entities per
//! spectrum, no shared mutable state, correctness independent of which
//! worker handles which spectrum.

use rayon::prelude::*;

use crate::error::PartitionError;
use crate::partition::{ptm1, ptm3, ptm4, ptm5, Ptm1Options, Ptm3Options, WindContext};
use crate::spectrum::{PartitionSet, Spectrum};

// ---------------------------------------------------------------------------
// Wind broadcast
// ---------------------------------------------------------------------------

/// Validate wind-context cardinality against the batch: one context per
/// spectrum, or a single context shared by all. Reported before any
/// computation starts.
fn broadcast_winds<'a>(
    winds: &'a [WindContext],
    nspectra: usize,
) -> Result<impl Fn(usize) -> &'a WindContext, PartitionError> {
    if winds.len() != nspectra && winds.len() != 1 {
        return Err(PartitionError::WindBroadcast {
            got: winds.len(),
            expected: nspectra,
        });
    }
    let shared = winds.len() == 1;
    Ok(move |i: usize| if shared { &winds[0] } else { &winds[i] })
}

// ---------------------------------------------------------------------------
// Batched methods
// ---------------------------------------------------------------------------

/// Apply PTM1 across a batch of spectra in parallel.
pub fn ptm1_batch(
    spectra: &[Spectrum],
    winds: &[WindContext],
    opts: &Ptm1Options,
) -> Result<Vec<PartitionSet>, PartitionError> {
    let wind_at = broadcast_winds(winds, spectra.len())?;
    Ok(spectra
        .par_iter()
        .enumerate()
        .map(|(i, spec)| ptm1(spec, wind_at(i), opts))
        .collect())
}

/// Apply PTM3 across a batch of spectra in parallel.
pub fn ptm3_batch(spectra: &[Spectrum], opts: &Ptm3Options) -> Vec<PartitionSet> {
    spectra.par_iter().map(|spec| ptm3(spec, opts)).collect()
}

/// Apply PTM4 across a batch of spectra in parallel.
pub fn ptm4_batch(
    spectra: &[Spectrum],
    winds: &[WindContext],
    agefac: f64,
) -> Result<Vec<PartitionSet>, PartitionError> {
    let wind_at = broadcast_winds(winds, spectra.len())?;
    Ok(spectra
        .par_iter()
        .enumerate()
        .map(|(i, spec)| ptm4(spec, wind_at(i), agefac))
        .collect())
}

/// Apply PTM5 across a batch of spectra in parallel.
pub fn ptm5_batch(spectra: &[Spectrum], fcut: f64, interpolate: bool) -> Vec<PartitionSet> {
    spectra
        .par_iter()
        .map(|spec| ptm5(spec, fcut, interpolate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn small_spectrum(amp: f64) -> Spectrum {
        let freq: Vec<f64> = (0..12).map(|i| 0.05 + 0.02 * i as f64).collect();
        let dir: Vec<f64> = (0..12).map(|j| 30.0 * j as f64).collect();
        let mut energy = Array2::zeros((12, 12));
        for ((i, j), cell) in energy.indexed_iter_mut() {
            let df = (freq[i] - 0.11) / 0.03;
            let dd = (dir[j] - 180.0) / 60.0;
            let v = amp * (-0.5 * (df * df + dd * dd)).exp();
            if v > 1e-4 {
                *cell = v;
            }
        }
        Spectrum::new(freq, dir, energy).unwrap()
    }

    #[test]
    fn batch_matches_sequential_application() {
        let spectra: Vec<Spectrum> = (1..=4).map(|k| small_spectrum(k as f64)).collect();
        let opts = Ptm3Options::default();
        let batched = ptm3_batch(&spectra, &opts);
        assert_eq!(batched.len(), 4);
        for (spec, set) in spectra.iter().zip(&batched) {
            let single = ptm3(spec, &opts);
            assert_eq!(single.len(), set.len());
            for (a, b) in single.parts.iter().zip(&set.parts) {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn single_wind_context_broadcasts() {
        let spectra: Vec<Spectrum> = (1..=3).map(|k| small_spectrum(k as f64)).collect();
        let wind = [WindContext::new(5.0, 180.0, None)];
        let sets = ptm1_batch(&spectra, &wind, &Ptm1Options::default()).unwrap();
        assert_eq!(sets.len(), 3);
        for set in &sets {
            assert_eq!(set.len(), 4);
        }
    }

    #[test]
    fn mismatched_wind_cardinality_is_fatal_up_front() {
        let spectra: Vec<Spectrum> = (1..=3).map(|k| small_spectrum(k as f64)).collect();
        let winds = [
            WindContext::new(5.0, 0.0, None),
            WindContext::new(6.0, 0.0, None),
        ];
        let res = ptm4_batch(&spectra, &winds, 1.7);
        assert!(matches!(
            res,
            Err(PartitionError::WindBroadcast {
                got: 2,
                expected: 3
            })
        ));
    }
}
