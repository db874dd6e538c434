use log::debug;
use ndarray::Array2;

use crate::partition::inflection::{inflection, DFRES, FMIN};
use crate::partition::specpart::{max_label, Segmentation};
use crate::partition::windsea::{wind_fraction, wind_sea_mask, WindContext};
use crate::partition::{Ptm1Options, Ptm3Options};
use crate::spectrum::hs;

/// A carved inflection split must contain more than this many non-zero bins,
/// otherwise the basin is left intact (guards against micro-partitions from
/// noise).
pub(crate) const MIN_SPLIT_BINS: usize = 20;

// ---------------------------------------------------------------------------
// Per-spectrum kernels
// ---------------------------------------------------------------------------

/// PTM1 kernel for a single spectrum.
///
/// Watershed labels (optionally from a smoothed copy), inflection-based
/// sub-division of merged basins, wind-fraction sea aggregation into slot 0,
/// then stable Hs-descending ranking of the surviving swell candidates.
/// Always returns exactly `swells + 1` grids; missing slots are all-zero.
pub(crate) fn ptm1_kernel(
    spectrum: &Array2<f64>,
    smoothed: Option<&Array2<f64>>,
    freq: &[f64],
    dir: &[f64],
    wind: &WindContext,
    opts: &Ptm1Options,
    labeler: &dyn Segmentation,
) -> Vec<Array2<f64>> {
    let nparts = opts.swells + 1;
    let clean = sanitize(spectrum);
    if clean.sum() <= 0.0 {
        return vec![Array2::zeros(clean.dim()); nparts];
    }

    let mut labels = labeler.labels(smoothed.unwrap_or(&clean));
    let windmask = wind_sea_mask(freq, dir, wind, opts.agefac);

    let mut nlabels = max_label(&labels);
    let mut hs_swell = vec![0.0f64; nlabels as usize + 1];

    let mut ipeak: u32 = 1;
    while ipeak <= nlabels {
        let mut part = label_mask(&clean, &labels, ipeak);

        // Carve a new partition when the basin merges two wave systems.
        if let Some(new_label) = try_carve(&mut part, &mut labels, freq, nlabels) {
            nlabels = new_label;
            hs_swell.push(0.0);
        }

        let w = wind_fraction(&part, &windmask);
        let hval = hs(&part, freq, dir, true);
        if w > opts.wscut || (opts.hs_min > 0.0 && hval < opts.hs_min) {
            // Wind-forced (or noise): fold into the sea bucket.
            relabel(&mut labels, ipeak, 0);
        } else {
            hs_swell[ipeak as usize] = hval;
        }
        ipeak += 1;
    }

    let ranked = rank_descending(&hs_swell);
    debug!(
        "ptm1: {} basins, {} swell candidates",
        nlabels,
        ranked.iter().filter(|l| hs_swell[**l as usize] > 0.0).count()
    );

    if opts.combine {
        merge_excess(&mut labels, &clean, &ranked, &hs_swell, opts.swells);
    }

    let mut parts = Vec::with_capacity(nparts);
    parts.push(label_mask(&clean, &labels, 0));
    for &label in ranked.iter().take(opts.swells) {
        parts.push(label_mask(&clean, &labels, label));
    }
    while parts.len() < nparts {
        parts.push(Array2::zeros(clean.dim()));
    }
    parts
}

/// PTM3 kernel for a single spectrum.
///
/// Same watershed + inflection pipeline with no wind-sea classification:
/// every partition is kept, ranked purely by descending Hs and truncated or
/// merged (`combine`) to exactly `parts` grids.
pub(crate) fn ptm3_kernel(
    spectrum: &Array2<f64>,
    smoothed: Option<&Array2<f64>>,
    freq: &[f64],
    dir: &[f64],
    opts: &Ptm3Options,
    labeler: &dyn Segmentation,
) -> Vec<Array2<f64>> {
    let clean = sanitize(spectrum);
    if clean.sum() <= 0.0 {
        return vec![Array2::zeros(clean.dim()); opts.parts];
    }

    let mut labels = labeler.labels(smoothed.unwrap_or(&clean));
    let mut nlabels = max_label(&labels);
    let mut hs_part = vec![0.0f64; nlabels as usize + 1];

    let mut ipeak: u32 = 1;
    while ipeak <= nlabels {
        let mut part = label_mask(&clean, &labels, ipeak);
        if let Some(new_label) = try_carve(&mut part, &mut labels, freq, nlabels) {
            nlabels = new_label;
            hs_part.push(0.0);
        }
        let hval = hs(&part, freq, dir, true);
        if opts.hs_min > 0.0 && hval < opts.hs_min {
            // Noise partition: discard outright. Label 0 is never emitted and
            // a zero Hs keeps it out of the merge pool.
            relabel(&mut labels, ipeak, 0);
        } else {
            hs_part[ipeak as usize] = hval;
        }
        ipeak += 1;
    }

    let ranked = rank_descending(&hs_part);
    if opts.combine {
        merge_excess(&mut labels, &clean, &ranked, &hs_part, opts.parts);
    }

    let mut parts = Vec::with_capacity(opts.parts);
    for &label in ranked.iter().take(opts.parts) {
        parts.push(label_mask(&clean, &labels, label));
    }
    while parts.len() < opts.parts {
        parts.push(Array2::zeros(clean.dim()));
    }
    parts
}

// ---------------------------------------------------------------------------
// Kernel helpers
// ---------------------------------------------------------------------------

/// Copy of the grid with negative and non-finite bins normalized to zero.
fn sanitize(spectrum: &Array2<f64>) -> Array2<f64> {
    spectrum.mapv(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 })
}

/// Energy grid restricted to the cells carrying one label.
fn label_mask(energy: &Array2<f64>, labels: &Array2<u32>, label: u32) -> Array2<f64> {
    let mut out = Array2::zeros(energy.dim());
    for ((cell, &l), &v) in out.iter_mut().zip(labels.iter()).zip(energy.iter()) {
        if l == label {
            *cell = v;
        }
    }
    out
}

fn relabel(labels: &mut Array2<u32>, from: u32, to: u32) {
    for l in labels.iter_mut() {
        if *l == from {
            *l = to;
        }
    }
}

/// Split one basin at the first frequency minimum of its direction-integrated
/// curve. Everything from that minimum onward (across all directions) becomes
/// a freshly allocated label, provided the carved region holds more than
/// [`MIN_SPLIT_BINS`] non-zero bins. Returns the new label count on a split.
fn try_carve(
    part: &mut Array2<f64>,
    labels: &mut Array2<u32>,
    freq: &[f64],
    nlabels: u32,
) -> Option<u32> {
    // The carved region gets its own label and its own inflection scan when
    // the kernel loop reaches it, so multi-modal basins split recursively.
    let (_, minima) = inflection(part, freq, DFRES, FMIN);
    let i0 = *minima.first()?;

    let carved = part
        .indexed_iter()
        .filter(|((i, _), v)| *i >= i0 && **v > 0.0)
        .count();
    if carved <= MIN_SPLIT_BINS {
        return None;
    }

    let new_label = nlabels + 1;
    for ((i, j), v) in part.indexed_iter_mut() {
        if i >= i0 && *v > 0.0 {
            labels[[i, j]] = new_label;
            *v = 0.0;
        }
    }
    Some(new_label)
}

/// Labels `1..` ordered by descending recorded Hs. The sort is stable, so
/// ties keep the ascending label-discovery order.
fn rank_descending(hs_values: &[f64]) -> Vec<u32> {
    let mut order: Vec<u32> = (1..hs_values.len() as u32).collect();
    order.sort_by(|a, b| {
        hs_values[*b as usize]
            .partial_cmp(&hs_values[*a as usize])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Merge each excess partition (ranked beyond `keep`) into whichever retained
/// partition has the spectrally nearest peak, instead of discarding its
/// energy. Distance is Euclidean in index space with circular wrap on the
/// direction index.
fn merge_excess(
    labels: &mut Array2<u32>,
    energy: &Array2<f64>,
    ranked: &[u32],
    hs_values: &[f64],
    keep: usize,
) {
    if ranked.len() <= keep || keep == 0 {
        return;
    }
    let kept: Vec<u32> = ranked[..keep]
        .iter()
        .copied()
        .filter(|l| hs_values[*l as usize] > 0.0)
        .collect();
    if kept.is_empty() {
        return;
    }

    let ndir = energy.dim().1;
    let kept_peaks: Vec<(usize, usize)> = kept
        .iter()
        .map(|&l| peak_of(energy, labels, l))
        .collect();

    for &label in &ranked[keep..] {
        if hs_values[label as usize] <= 0.0 {
            continue;
        }
        let peak = peak_of(energy, labels, label);
        let mut best = 0usize;
        let mut best_d2 = u64::MAX;
        for (k, kp) in kept_peaks.iter().enumerate() {
            let d2 = peak_distance2(peak, *kp, ndir);
            if d2 < best_d2 {
                best_d2 = d2;
                best = k;
            }
        }
        debug!("combining partition {label} into {}", kept[best]);
        relabel(labels, label, kept[best]);
    }
}

/// Index of the most energetic bin carrying one label (row-major first on
/// ties).
fn peak_of(energy: &Array2<f64>, labels: &Array2<u32>, label: u32) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_v = f64::NEG_INFINITY;
    for ((i, j), &v) in energy.indexed_iter() {
        if labels[[i, j]] == label && v > best_v {
            best_v = v;
            best = (i, j);
        }
    }
    best
}

fn peak_distance2(a: (usize, usize), b: (usize, usize), ndir: usize) -> u64 {
    let df = a.0.abs_diff(b.0) as u64;
    let dd_raw = a.1.abs_diff(b.1);
    let dd = dd_raw.min(ndir - dd_raw) as u64;
    df * df + dd * dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::specpart::SteepestAscent;

    #[test]
    fn sanitize_zeroes_negatives_and_nan() {
        let grid = ndarray::arr2(&[[1.0, -0.5], [f64::NAN, 2.0]]);
        let clean = sanitize(&grid);
        assert_eq!(clean, ndarray::arr2(&[[1.0, 0.0], [0.0, 2.0]]));
    }

    #[test]
    fn rank_descending_is_stable_on_ties() {
        // Labels 1..=4 with hs 2, 5, 2, 1: ties (1, 3) keep label order.
        let order = rank_descending(&[0.0, 2.0, 5.0, 2.0, 1.0]);
        assert_eq!(order, vec![2, 1, 3, 4]);
    }

    #[test]
    fn carve_requires_enough_bins() {
        // A tiny bimodal basin (< MIN_SPLIT_BINS carved cells) stays intact.
        let mut part = ndarray::arr2(&[[0.0], [2.0], [0.5], [2.0], [0.0]]);
        let mut labels = part.mapv(|v| if v > 0.0 { 1u32 } else { 0 });
        let freq: Vec<f64> = (0..5).map(|i| 0.06 + 0.01 * i as f64).collect();
        assert!(try_carve(&mut part, &mut labels, &freq, 1).is_none());
        assert_eq!(max_label(&labels), 1);
    }

    #[test]
    fn carve_splits_a_wide_bimodal_basin() {
        // 40 direction bins so the carved region clears MIN_SPLIT_BINS.
        let ndir = 40;
        let profile = [0.0, 2.0, 4.0, 2.0, 0.5, 2.0, 4.0, 2.0, 0.0];
        let mut part = Array2::zeros((profile.len(), ndir));
        for (i, &p) in profile.iter().enumerate() {
            for j in 0..ndir {
                part[[i, j]] = p;
            }
        }
        let mut labels = part.mapv(|v| if v > 0.0 { 1u32 } else { 0 });
        let freq: Vec<f64> = (0..profile.len())
            .map(|i| 0.06 + 0.01 * i as f64)
            .collect();

        let new_label = try_carve(&mut part, &mut labels, &freq, 1);
        assert_eq!(new_label, Some(2));
        // The high-frequency lobe moved to the new label and out of `part`.
        assert_eq!(labels[[6, 0]], 2);
        assert_eq!(part[[6, 0]], 0.0);
        // The low-frequency lobe is untouched.
        assert_eq!(labels[[2, 0]], 1);
        assert_eq!(part[[2, 0]], 4.0);
    }

    fn two_peak_grid() -> Array2<f64> {
        let mut energy = Array2::zeros((12, 8));
        for (i0, j0, amp) in [(3usize, 2usize, 5.0), (8, 6, 3.0)] {
            for i in 0..12usize {
                for j in 0..8usize {
                    let d2 = (i as f64 - i0 as f64).powi(2) + (j as f64 - j0 as f64).powi(2);
                    if d2 < 5.0 {
                        energy[[i, j]] += amp * (-d2 / 2.0).exp();
                    }
                }
            }
        }
        energy
    }

    #[test]
    fn ptm3_kernel_pads_and_conserves_energy() {
        let energy = two_peak_grid();
        let freq: Vec<f64> = (0..energy.dim().0)
            .map(|i| 0.06 + 0.01 * i as f64)
            .collect();
        let dir: Vec<f64> = (0..energy.dim().1).map(|j| 15.0 * j as f64).collect();
        let opts = Ptm3Options {
            parts: 4,
            ..Ptm3Options::default()
        };
        let parts = ptm3_kernel(&energy, None, &freq, &dir, &opts, &SteepestAscent);
        assert_eq!(parts.len(), 4);

        let mut sum = Array2::zeros(energy.dim());
        for p in &parts {
            sum += p;
        }
        for (a, b) in sum.iter().zip(energy.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
