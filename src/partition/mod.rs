//! Partitioning interface: the five partition test methods (PTM1–PTM5).
//!
//! Each method decomposes one directional spectrum into an ordered,
//! fixed-length [`PartitionSet`]. The per-spectrum algorithms are pure
//! functions of their inputs; batching lives in [`crate::batch`].

pub mod inflection;
pub mod specpart;
pub mod watershed;
pub mod windsea;

use ndarray::Array2;

use crate::error::PartitionError;
use crate::smooth::{interp_frequency, smooth_spectrum};
use crate::spectrum::{PartitionSet, Spectrum};

pub use specpart::{Segmentation, SteepestAscent};
pub use windsea::{celerity, wind_sea_mask, WindContext, DEFAULT_AGEFAC, DEFAULT_WSCUT};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options for [`ptm1`].
#[derive(Debug, Clone, Copy)]
pub struct Ptm1Options {
    /// Number of swell partitions to compute (output has `swells + 1` slots).
    pub swells: usize,
    /// Wave-age multiplier.
    pub agefac: f64,
    /// Wind-energy fraction above which a partition is aggregated into the
    /// sea slot.
    pub wscut: f64,
    /// Minimum Hs below which a swell candidate is folded into the sea slot
    /// as noise. Zero disables the check.
    pub hs_min: f64,
    /// Compute watershed boundaries over a smoothed copy of the spectrum.
    pub smooth: bool,
    /// Running-window size for smoothing when `smooth` is set.
    pub window: usize,
    /// Merge excess swell candidates onto the retained partition with the
    /// nearest spectral peak instead of discarding them.
    pub combine: bool,
}

impl Default for Ptm1Options {
    fn default() -> Self {
        Ptm1Options {
            swells: 3,
            agefac: DEFAULT_AGEFAC,
            wscut: DEFAULT_WSCUT,
            hs_min: 0.0,
            smooth: false,
            window: 3,
            combine: false,
        }
    }
}

/// Options for [`ptm3`].
#[derive(Debug, Clone, Copy)]
pub struct Ptm3Options {
    /// Number of partitions to keep.
    pub parts: usize,
    /// Merge excess partitions onto the retained partition with the nearest
    /// spectral peak instead of discarding them.
    pub combine: bool,
    /// Compute watershed boundaries over a smoothed copy of the spectrum.
    pub smooth: bool,
    /// Running-window size for smoothing when `smooth` is set.
    pub window: usize,
    /// Minimum Hs below which a partition is treated as excess. Zero
    /// disables the check.
    pub hs_min: f64,
}

impl Default for Ptm3Options {
    fn default() -> Self {
        Ptm3Options {
            parts: 3,
            combine: false,
            smooth: false,
            window: 3,
            hs_min: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PTM1 – watershed partitioning with wind-sea aggregation
// ---------------------------------------------------------------------------

/// PTM1 spectra partitioning.
///
/// Topographic partitions whose wind-sea energy fraction exceeds `wscut` are
/// aggregated and assigned to the wind-sea component in slot 0. The remaining
/// partitions are assigned as swell components in order of decreasing wave
/// height. The output always has exactly `swells + 1` slots; slots without a
/// surviving candidate hold all-zero grids.
pub fn ptm1(spec: &Spectrum, wind: &WindContext, opts: &Ptm1Options) -> PartitionSet {
    ptm1_with(spec, wind, opts, &SteepestAscent)
}

/// [`ptm1`] with a caller-supplied watershed labeler.
pub fn ptm1_with(
    spec: &Spectrum,
    wind: &WindContext,
    opts: &Ptm1Options,
    labeler: &dyn Segmentation,
) -> PartitionSet {
    let smoothed = opts
        .smooth
        .then(|| smooth_spectrum(&spec.energy, opts.window));
    let parts = watershed::ptm1_kernel(
        &spec.energy,
        smoothed.as_ref(),
        &spec.freq,
        &spec.dir,
        wind,
        opts,
        labeler,
    );
    PartitionSet {
        freq: spec.freq.clone(),
        dir: spec.dir.clone(),
        parts,
    }
}

// ---------------------------------------------------------------------------
// PTM2 – declared capability, no algorithm
// ---------------------------------------------------------------------------

/// Watershed partitioning with secondary wind-sea assigned from individual
/// spectral bins.
///
/// PTM2 refines PTM1 by removing wind-influenced bins from each individual
/// swell candidate and collecting them as secondary wind-sea partitions,
/// rather than discarding whole partitions. No executable algorithm exists
/// in this core: calling it reports an unsupported-operation error, never a
/// silent fallback to PTM1.
pub fn ptm2(_spec: &Spectrum, _wind: &WindContext) -> Result<PartitionSet, PartitionError> {
    Err(PartitionError::UnsupportedMethod("PTM2"))
}

// ---------------------------------------------------------------------------
// PTM3 – unranked topographic partitioning
// ---------------------------------------------------------------------------

/// Watershed partitioning with no wind-sea or swell classification.
///
/// Partitions are ordered purely by decreasing wave height and truncated or
/// zero-padded to exactly `parts` slots. With `combine`, excess partitions
/// are merged onto the retained partition with the nearest spectral peak,
/// preserving total energy; otherwise their energy is discarded
/// deterministically.
pub fn ptm3(spec: &Spectrum, opts: &Ptm3Options) -> PartitionSet {
    ptm3_with(spec, opts, &SteepestAscent)
}

/// [`ptm3`] with a caller-supplied watershed labeler.
pub fn ptm3_with(spec: &Spectrum, opts: &Ptm3Options, labeler: &dyn Segmentation) -> PartitionSet {
    let smoothed = opts
        .smooth
        .then(|| smooth_spectrum(&spec.energy, opts.window));
    let parts = watershed::ptm3_kernel(
        &spec.energy,
        smoothed.as_ref(),
        &spec.freq,
        &spec.dir,
        opts,
        labeler,
    );
    PartitionSet {
        freq: spec.freq.clone(),
        dir: spec.dir.clone(),
        parts,
    }
}

// ---------------------------------------------------------------------------
// PTM4 – binary wave-age split
// ---------------------------------------------------------------------------

/// Wave-age partitioning of sea and swell (WAM method).
///
/// Splits the spectrum into a wind-sea and a single swell partition using the
/// wave-age criterion alone, with no watershed segmentation: bins whose
/// celerity does not exceed the directional wind-speed component are sea,
/// everything else is freely propagating swell. Always exactly two
/// partitions, ordered (sea, swell); their bin-wise sum reproduces the input.
pub fn ptm4(spec: &Spectrum, wind: &WindContext, agefac: f64) -> PartitionSet {
    let mask = wind_sea_mask(&spec.freq, &spec.dir, wind, agefac);
    let mut sea: Array2<f64> = Array2::zeros(spec.energy.dim());
    let mut swell: Array2<f64> = Array2::zeros(spec.energy.dim());
    for ((cell_sea, cell_swell), (&v, &m)) in sea
        .iter_mut()
        .zip(swell.iter_mut())
        .zip(spec.energy.iter().zip(mask.iter()))
    {
        let v = if v.is_finite() { v } else { 0.0 };
        if m {
            *cell_sea = v;
        } else {
            *cell_swell = v;
        }
    }
    PartitionSet {
        freq: spec.freq.clone(),
        dir: spec.dir.clone(),
        parts: vec![sea, swell],
    }
}

// ---------------------------------------------------------------------------
// PTM5 – static frequency-cutoff split
// ---------------------------------------------------------------------------

/// Frequency-cutoff partitioning of sea and swell (SWAN method).
///
/// Splits the spectrum at a user-defined static cutoff: slot 0 holds
/// frequencies at or above `fcut` (conventionally sea), slot 1 frequencies at
/// or below it. The exact-cutoff bin appears in both partitions — an
/// intentional overlap reflecting the ambiguity of the boundary. When
/// `interpolate` is set and `fcut` is not an existing grid point, the
/// spectrum is first resampled onto the union of the frequency axis and
/// `fcut`; both output partitions then carry the extended axis.
pub fn ptm5(spec: &Spectrum, fcut: f64, interpolate: bool) -> PartitionSet {
    let mut freq = spec.freq.clone();
    let mut energy = spec.energy.clone();

    if interpolate && !freq.iter().any(|&f| f == fcut) {
        let insert_at = freq.partition_point(|&f| f < fcut);
        freq.insert(insert_at, fcut);
        energy = interp_frequency(&spec.energy, &spec.freq, &freq);
    }

    let (nf, nd) = energy.dim();
    let mut hf: Array2<f64> = Array2::zeros((nf, nd));
    let mut lf: Array2<f64> = Array2::zeros((nf, nd));
    for ((i, j), &v) in energy.indexed_iter() {
        let v = if v.is_finite() { v } else { 0.0 };
        if freq[i] >= fcut {
            hf[[i, j]] = v;
        }
        if freq[i] <= fcut {
            lf[[i, j]] = v;
        }
    }
    PartitionSet {
        freq,
        dir: spec.dir.clone(),
        parts: vec![hf, lf],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::hs;
    use ndarray::Array2;

    fn gaussian_peak(
        energy: &mut Array2<f64>,
        freq: &[f64],
        dir: &[f64],
        fp: f64,
        dp: f64,
        amp: f64,
    ) {
        for ((i, j), cell) in energy.indexed_iter_mut() {
            let df = (freq[i] - fp) / 0.015;
            let mut dd = (dir[j] - dp).abs() % 360.0;
            if dd > 180.0 {
                dd = 360.0 - dd;
            }
            let dd = dd / 25.0;
            let term = amp * (-0.5 * (df * df + dd * dd)).exp();
            // Compact support keeps synthetic peaks cleanly separated.
            if term > 1e-4 {
                *cell += term;
            }
        }
    }

    fn axes() -> (Vec<f64>, Vec<f64>) {
        let freq: Vec<f64> = (0..25).map(|i| 0.04 + 0.01 * i as f64).collect();
        let dir: Vec<f64> = (0..24).map(|j| 15.0 * j as f64).collect();
        (freq, dir)
    }

    fn three_peak_spectrum() -> Spectrum {
        let (freq, dir) = axes();
        let mut energy = Array2::zeros((freq.len(), dir.len()));
        // Well separated in frequency and direction, strictly ordered energy.
        gaussian_peak(&mut energy, &freq, &dir, 0.08, 90.0, 6.0);
        gaussian_peak(&mut energy, &freq, &dir, 0.16, 210.0, 3.0);
        gaussian_peak(&mut energy, &freq, &dir, 0.24, 330.0, 1.5);
        Spectrum::new(freq, dir, energy).unwrap()
    }

    fn calm_wind() -> WindContext {
        WindContext::new(0.0, 0.0, None)
    }

    #[test]
    fn ptm1_orders_swells_by_decreasing_hs() {
        let spec = three_peak_spectrum();
        let set = ptm1(&spec, &calm_wind(), &Ptm1Options::default());
        assert_eq!(set.len(), 4);
        // Calm wind: nothing is wind-forced, sea slot stays empty.
        assert!(set.parts[0].iter().all(|v| *v == 0.0));
        let hs1 = set.hs(1);
        let hs2 = set.hs(2);
        let hs3 = set.hs(3);
        assert!(hs1 > hs2 && hs2 > hs3, "{hs1} {hs2} {hs3}");
    }

    #[test]
    fn ptm1_pads_to_requested_swell_count() {
        let (freq, dir) = axes();
        let mut energy = Array2::zeros((freq.len(), dir.len()));
        gaussian_peak(&mut energy, &freq, &dir, 0.10, 180.0, 4.0);
        let spec = Spectrum::new(freq, dir, energy).unwrap();

        let opts = Ptm1Options {
            swells: 5,
            ..Ptm1Options::default()
        };
        let set = ptm1(&spec, &calm_wind(), &opts);
        assert_eq!(set.len(), 6);
        let empty = set
            .parts
            .iter()
            .skip(1)
            .filter(|p| p.iter().all(|v| *v == 0.0))
            .count();
        assert_eq!(empty, 4);
    }

    #[test]
    fn ptm1_aggregates_fully_wind_forced_spectrum_into_sea_slot() {
        let (freq, dir) = axes();
        let mut energy = Array2::zeros((freq.len(), dir.len()));
        // Two high-frequency peaks along the wind direction.
        gaussian_peak(&mut energy, &freq, &dir, 0.20, 90.0, 4.0);
        gaussian_peak(&mut energy, &freq, &dir, 0.27, 120.0, 2.0);
        let spec = Spectrum::new(freq, dir, energy).unwrap();

        let wind = WindContext::new(60.0, 90.0, None);
        let set = ptm1(&spec, &wind, &Ptm1Options::default());

        for p in set.parts.iter().skip(1) {
            assert!(p.iter().all(|v| *v == 0.0));
        }
        for (a, b) in set.parts[0].iter().zip(spec.energy.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn ptm1_handles_all_zero_and_all_nan_spectra() {
        let (freq, dir) = axes();
        let zeros = Spectrum::new(
            freq.clone(),
            dir.clone(),
            Array2::zeros((freq.len(), dir.len())),
        )
        .unwrap();
        let nans = Spectrum::new(
            freq.clone(),
            dir.clone(),
            Array2::from_elem((freq.len(), dir.len()), f64::NAN),
        )
        .unwrap();

        for spec in [zeros, nans] {
            let set = ptm1(&spec, &calm_wind(), &Ptm1Options::default());
            assert_eq!(set.len(), 4);
            for p in &set.parts {
                assert!(p.iter().all(|v| *v == 0.0));
            }
        }
    }

    #[test]
    fn ptm2_reports_unsupported() {
        let spec = three_peak_spectrum();
        let res = ptm2(&spec, &calm_wind());
        assert!(matches!(res, Err(PartitionError::UnsupportedMethod("PTM2"))));
    }

    #[test]
    fn ptm3_two_peaks_conserve_energy_and_separate_cleanly() {
        let (freq, dir) = axes();
        let mut energy = Array2::zeros((freq.len(), dir.len()));
        gaussian_peak(&mut energy, &freq, &dir, 0.08, 90.0, 5.0);
        gaussian_peak(&mut energy, &freq, &dir, 0.22, 270.0, 2.0);
        let spec = Spectrum::new(freq, dir, energy).unwrap();

        let opts = Ptm3Options {
            parts: 2,
            ..Ptm3Options::default()
        };
        let set = ptm3(&spec, &opts);
        assert_eq!(set.len(), 2);

        let sum = set.combined();
        for (a, b) in sum.iter().zip(spec.energy.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        // Each peak is attributed whole to exactly one partition.
        let fp_hi = spec
            .freq
            .iter()
            .position(|&f| (f - 0.08).abs() < 1e-9)
            .unwrap();
        let dp_hi = spec
            .dir
            .iter()
            .position(|&d| (d - 90.0).abs() < 1e-9)
            .unwrap();
        assert!(set.parts[0][[fp_hi, dp_hi]] > 0.0);
        assert_eq!(set.parts[1][[fp_hi, dp_hi]], 0.0);
    }

    #[test]
    fn ptm3_combine_preserves_energy_beyond_part_count() {
        let spec = three_peak_spectrum();
        let total = spec.total_energy();

        let truncated = ptm3(
            &spec,
            &Ptm3Options {
                parts: 2,
                ..Ptm3Options::default()
            },
        );
        let combined = ptm3(
            &spec,
            &Ptm3Options {
                parts: 2,
                combine: true,
                ..Ptm3Options::default()
            },
        );

        let sum_t: f64 = truncated.combined().sum();
        let sum_c: f64 = combined.combined().sum();
        assert!(sum_t < total - 1e-9, "truncation should drop energy");
        assert!((sum_c - total).abs() < 1e-9, "combine should conserve it");
    }

    #[test]
    fn ptm4_is_binwise_exhaustive() {
        let spec = three_peak_spectrum();
        let wind = WindContext::new(12.0, 45.0, Some(80.0));
        let set = ptm4(&spec, &wind, DEFAULT_AGEFAC);
        assert_eq!(set.len(), 2);

        for ((a, b), v) in set.parts[0]
            .iter()
            .zip(set.parts[1].iter())
            .zip(spec.energy.iter())
        {
            assert!((a + b - v).abs() < 1e-12);
            assert!(*a == 0.0 || *b == 0.0);
        }
    }

    #[test]
    fn ptm5_cutoff_bin_appears_in_both_partitions() {
        let spec = three_peak_spectrum();
        let fcut = spec.freq[10];
        let set = ptm5(&spec, fcut, false);
        assert_eq!(set.len(), 2);
        for j in 0..spec.ndir() {
            let v = spec.energy[[10, j]];
            assert_eq!(set.parts[0][[10, j]], v);
            assert_eq!(set.parts[1][[10, j]], v);
        }
        // Above the cutoff only slot 0 carries energy.
        assert_eq!(set.parts[1][[11, 0]], 0.0);
        assert_eq!(set.parts[0][[11, 0]], spec.energy[[11, 0]]);
    }

    #[test]
    fn ptm5_interpolation_inserts_the_cutoff_frequency() {
        let spec = three_peak_spectrum();
        let fcut = 0.125; // between grid points
        let set = ptm5(&spec, fcut, true);
        assert_eq!(set.freq.len(), spec.nfreq() + 1);
        let row = set.freq.iter().position(|&f| f == fcut).unwrap();
        // The inserted bin belongs to both partitions.
        for j in 0..spec.ndir() {
            assert_eq!(set.parts[0][[row, j]], set.parts[1][[row, j]]);
        }
        // Without interpolation the axis is untouched.
        let plain = ptm5(&spec, fcut, false);
        assert_eq!(plain.freq.len(), spec.nfreq());
    }

    #[test]
    fn ptm1_hs_min_folds_sub_threshold_swells_into_sea_slot() {
        let spec = three_peak_spectrum();
        let baseline = ptm1(&spec, &calm_wind(), &Ptm1Options::default());
        // Threshold between the second and third swell: only the smallest
        // peak counts as noise.
        let threshold = 0.5 * (baseline.hs(2) + baseline.hs(3));

        let opts = Ptm1Options {
            hs_min: threshold,
            ..Ptm1Options::default()
        };
        let set = ptm1(&spec, &calm_wind(), &opts);
        assert_eq!(set.len(), 4);

        // The folded peak's energy is now the sea bucket, not lost.
        assert!((set.hs(0) - baseline.hs(3)).abs() < 1e-12);
        assert!(set.hs(1) >= threshold && set.hs(2) >= threshold);
        assert!(set.parts[3].iter().all(|v| *v == 0.0));
        let sum = set.combined();
        for (a, b) in sum.iter().zip(spec.energy.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn ptm3_hs_min_drops_sub_threshold_partitions() {
        let spec = three_peak_spectrum();
        let baseline = ptm3(&spec, &Ptm3Options::default());
        let threshold = 0.5 * (baseline.hs(1) + baseline.hs(2));
        let dropped: f64 = baseline.parts[2].sum();
        assert!(dropped > 0.0);

        let opts = Ptm3Options {
            hs_min: threshold,
            ..Ptm3Options::default()
        };
        let set = ptm3(&spec, &opts);
        assert_eq!(set.len(), 3);
        // The sub-threshold partition is discarded, never emitted.
        assert!(set.parts[2].iter().all(|v| *v == 0.0));
        let kept: f64 = set.combined().sum();
        assert!((spec.total_energy() - kept - dropped).abs() < 1e-9);
    }

    #[test]
    fn ptm1_combine_preserves_energy_beyond_swell_count() {
        let spec = three_peak_spectrum();
        let total = spec.total_energy();

        let truncated = ptm1(
            &spec,
            &calm_wind(),
            &Ptm1Options {
                swells: 2,
                ..Ptm1Options::default()
            },
        );
        let combined = ptm1(
            &spec,
            &calm_wind(),
            &Ptm1Options {
                swells: 2,
                combine: true,
                ..Ptm1Options::default()
            },
        );

        assert_eq!(truncated.len(), 3);
        assert_eq!(combined.len(), 3);
        let sum_t: f64 = truncated.combined().sum();
        let sum_c: f64 = combined.combined().sum();
        assert!(sum_t < total - 1e-9, "truncation should drop energy");
        assert!((sum_c - total).abs() < 1e-9, "combine should conserve it");
    }

    #[test]
    fn ptm1_smoothing_only_affects_labelling_not_energy() {
        let (freq, dir) = axes();
        let mut energy = Array2::zeros((freq.len(), dir.len()));
        gaussian_peak(&mut energy, &freq, &dir, 0.12, 135.0, 3.0);
        let spec = Spectrum::new(freq, dir, energy).unwrap();
        let opts = Ptm1Options {
            smooth: true,
            window: 3,
            ..Ptm1Options::default()
        };
        let set = ptm1(&spec, &calm_wind(), &opts);
        // Energy values in the output come from the unsmoothed spectrum.
        let sum = set.combined();
        for (a, b) in sum.iter().zip(spec.energy.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn swell_slots_are_ordered_by_the_hs_formula() {
        let spec = three_peak_spectrum();
        let set = ptm1(&spec, &calm_wind(), &Ptm1Options::default());
        let values: Vec<f64> = (1..set.len())
            .map(|k| hs(&set.parts[k], &set.freq, &set.dir, true))
            .collect();
        for w in values.windows(2) {
            assert!(w[0] >= w[1], "ranking violates hs order: {values:?}");
        }
    }
}
