use ndarray::Array2;

// ---------------------------------------------------------------------------
// Segmentation – the pluggable watershed contract
// ---------------------------------------------------------------------------

/// Grid-to-grid watershed labelling capability.
///
/// Implementations segment a non-negative energy grid into basins around
/// local maxima: 0 is background, labels `1..=K` identify basins. Identical
/// input must always produce identical labels with identical numbering,
/// because downstream ranking depends on labels being discovered in a
/// consistent order. Implementations must be pure (no side effects).
pub trait Segmentation {
    /// Label the basins of `energy`. The output has the same shape.
    fn labels(&self, energy: &Array2<f64>) -> Array2<u32>;
}

// ---------------------------------------------------------------------------
// SteepestAscent – default topographic labeler
// ---------------------------------------------------------------------------

/// Default watershed binding: steepest-ascent flood assignment.
///
/// Every non-zero cell follows the path of steepest ascent through its
/// 9-point neighborhood (direction axis wraps, frequency axis clamps) until
/// it reaches a cell with no strictly greater neighbor; that peak's basin
/// claims the whole path. Peaks are numbered in row-major discovery order,
/// which makes the labelling deterministic. Exact-zero and non-finite cells
/// are background.
#[derive(Debug, Default, Clone, Copy)]
pub struct SteepestAscent;

impl Segmentation for SteepestAscent {
    fn labels(&self, energy: &Array2<f64>) -> Array2<u32> {
        let (nf, nd) = energy.dim();
        let mut labels: Array2<u32> = Array2::zeros((nf, nd));
        let mut next_label: u32 = 0;
        let mut path: Vec<(usize, usize)> = Vec::new();

        for i in 0..nf {
            for j in 0..nd {
                let v = energy[[i, j]];
                if labels[[i, j]] != 0 || !(v.is_finite() && v > 0.0) {
                    continue;
                }

                // Walk uphill until a labelled cell or a peak is reached.
                path.clear();
                let (mut ci, mut cj) = (i, j);
                let label = loop {
                    if labels[[ci, cj]] != 0 {
                        break labels[[ci, cj]];
                    }
                    path.push((ci, cj));
                    match steepest_neighbor(energy, ci, cj) {
                        Some(up) => (ci, cj) = up,
                        None => {
                            next_label += 1;
                            break next_label;
                        }
                    }
                };

                for &(pi, pj) in &path {
                    labels[[pi, pj]] = label;
                }
            }
        }
        labels
    }
}

/// The neighbor with the largest energy strictly above the cell's own, or
/// `None` when the cell is a local maximum. Fixed scan order keeps ties
/// deterministic.
fn steepest_neighbor(energy: &Array2<f64>, i: usize, j: usize) -> Option<(usize, usize)> {
    let (nf, nd) = energy.dim();
    let here = energy[[i, j]];
    let mut best = here;
    let mut best_at = None;
    for di in -1i64..=1 {
        let ni = i as i64 + di;
        if ni < 0 || ni >= nf as i64 {
            continue;
        }
        for dj in -1i64..=1 {
            if di == 0 && dj == 0 {
                continue;
            }
            // Direction axis is circular.
            let nj = (j as i64 + dj).rem_euclid(nd as i64);
            let v = energy[[ni as usize, nj as usize]];
            if v.is_finite() && v > best {
                best = v;
                best_at = Some((ni as usize, nj as usize));
            }
        }
    }
    best_at
}

/// Highest label in a label grid (0 when the grid is all background).
pub(crate) fn max_label(labels: &Array2<u32>) -> u32 {
    labels.iter().copied().max().unwrap_or(0)
}
