use ndarray::Array2;

// ---------------------------------------------------------------------------
// Pre-segmentation smoothing
// ---------------------------------------------------------------------------

/// Centered running-mean smoothing of an energy grid, used to reduce
/// watershed over-segmentation from noise before computing labels.
///
/// The direction axis is circular; the frequency axis clamps at its edges
/// (the mean is taken over the cells that exist). The input grid is never
/// mutated; energy values used for Hs and classification always come from
/// the unsmoothed spectrum.
pub fn smooth_spectrum(energy: &Array2<f64>, window: usize) -> Array2<f64> {
    if window < 2 {
        return energy.clone();
    }
    let (nf, nd) = energy.dim();
    let half = (window / 2) as i64;

    Array2::from_shape_fn((nf, nd), |(i, j)| {
        let mut acc = 0.0;
        let mut count = 0usize;
        for di in -half..=half {
            let fi = i as i64 + di;
            if fi < 0 || fi >= nf as i64 {
                continue;
            }
            for dj in -half..=half {
                let cj = (j as i64 + dj).rem_euclid(nd as i64);
                let v = energy[[fi as usize, cj as usize]];
                if v.is_finite() {
                    acc += v;
                }
                count += 1;
            }
        }
        acc / count as f64
    })
}

// ---------------------------------------------------------------------------
// Frequency-axis regridding
// ---------------------------------------------------------------------------

/// Linearly interpolate the energy grid onto a new ascending frequency axis.
///
/// Target frequencies outside the source range map to zero energy (no
/// extrapolation). Used by PTM5 to insert the cutoff frequency as an exact
/// grid point.
pub fn interp_frequency(
    energy: &Array2<f64>,
    freq: &[f64],
    new_freq: &[f64],
) -> Array2<f64> {
    let nd = energy.dim().1;
    let mut out = Array2::zeros((new_freq.len(), nd));

    for (row, &f) in new_freq.iter().enumerate() {
        if f < freq[0] || f > freq[freq.len() - 1] {
            continue;
        }
        // Position of f in the source axis.
        let upper = freq.partition_point(|&g| g < f);
        if upper < freq.len() && freq[upper] == f {
            out.row_mut(row).assign(&energy.row(upper));
        } else if upper > 0 && upper < freq.len() {
            let (f0, f1) = (freq[upper - 1], freq[upper]);
            let t = (f - f0) / (f1 - f0);
            for j in 0..nd {
                out[[row, j]] =
                    (1.0 - t) * energy[[upper - 1, j]] + t * energy[[upper, j]];
            }
        } else {
            // f == freq[0] with no exact match can't happen on an ascending axis.
            out.row_mut(row).assign(&energy.row(0));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn window_of_one_is_identity() {
        let energy = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(smooth_spectrum(&energy, 1), energy);
    }

    #[test]
    fn smoothing_preserves_a_constant_grid() {
        let energy = Array2::from_elem((5, 6), 2.5);
        let smoothed = smooth_spectrum(&energy, 3);
        for v in smoothed.iter() {
            assert!((v - 2.5).abs() < 1e-12);
        }
    }

    #[test]
    fn smoothing_does_not_mutate_input() {
        let energy = arr2(&[[0.0, 9.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        let before = energy.clone();
        let smoothed = smooth_spectrum(&energy, 3);
        assert_eq!(energy, before);
        assert!(smoothed[[0, 1]] < 9.0);
        assert!(smoothed[[1, 1]] > 0.0);
    }

    #[test]
    fn direction_axis_wraps_in_smoothing() {
        let mut energy: Array2<f64> = Array2::zeros((1, 4));
        energy[[0, 0]] = 4.0;
        let smoothed = smooth_spectrum(&energy, 3);
        // The seam neighbor sees the peak through the wrap.
        assert!(smoothed[[0, 3]] > 0.0);
        assert_eq!(smoothed[[0, 2]], 0.0);
    }

    #[test]
    fn interp_hits_exact_source_rows() {
        let energy = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let out = interp_frequency(&energy, &[0.1, 0.2], &[0.1, 0.15, 0.2]);
        assert_eq!(out.dim(), (3, 2));
        assert_eq!(out.row(0).to_vec(), vec![1.0, 2.0]);
        assert_eq!(out.row(2).to_vec(), vec![3.0, 4.0]);
        // Midpoint is the average of the bracketing rows.
        assert!((out[[1, 0]] - 2.0).abs() < 1e-12);
        assert!((out[[1, 1]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn interp_outside_range_is_zero() {
        let energy = arr2(&[[1.0], [1.0]]);
        let out = interp_frequency(&energy, &[0.1, 0.2], &[0.05, 0.3]);
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[1, 0]], 0.0);
    }
}
