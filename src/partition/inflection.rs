use ndarray::{Array2, Axis};

use crate::spectrum::frequency_resolution;

/// Frequency resolution used to size the smoothing window (Hz).
pub(crate) const DFRES: f64 = 0.01;

/// Minimum frequency below which extrema are not searched (Hz).
pub(crate) const FMIN: f64 = 0.05;

// ---------------------------------------------------------------------------
// Inflection detection on the direction-integrated spectrum
// ---------------------------------------------------------------------------

/// Locate local maxima and minima of the smoothed, direction-integrated
/// energy curve of one partition.
///
/// A minimum inside a single watershed basin flags two physically distinct
/// wave systems that were merged into one label; the caller carves the basin
/// at the first minimum.
///
/// The smoothing window length is `dfres / df[0]` (a Hamming window); below 2
/// no smoothing is applied. Negative energy introduced by the smoothing and
/// anything below `fmin` is zeroed before the sign-change scan. Returns
/// `(maxima, minima)` index lists; a single-frequency-bin spectrum has no
/// meaningful inflection and yields empty results.
pub fn inflection(
    spectrum: &Array2<f64>,
    freq: &[f64],
    dfres: f64,
    fmin: f64,
) -> (Vec<usize>, Vec<usize>) {
    if freq.len() <= 1 {
        return (Vec::new(), Vec::new());
    }

    let df = frequency_resolution(freq);
    let mut sf: Vec<f64> = spectrum.sum_axis(Axis(1)).to_vec();

    let nsmooth = (dfres / df[0]) as usize;
    if nsmooth > 1 {
        sf = convolve_same(&sf, &hamming(nsmooth));
    }

    for (s, f) in sf.iter_mut().zip(freq) {
        if *s < 0.0 || *f < fmin {
            *s = 0.0;
        }
    }

    // Sign changes of the first difference: -2 marks a maximum, +2 a minimum.
    let signs: Vec<i8> = sf.windows(2).map(|w| sign(w[1] - w[0])).collect();
    let mut maxima = Vec::new();
    let mut minima = Vec::new();
    for i in 0..signs.len().saturating_sub(1) {
        match signs[i + 1] - signs[i] {
            -2 => maxima.push(i + 1),
            2 => minima.push(i + 1),
            _ => {}
        }
    }
    (maxima, minima)
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Hamming window of length `n` (`[1.0]` for `n <= 1`).
fn hamming(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0];
    }
    let m = (n - 1) as f64;
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / m).cos())
        .collect()
}

/// Discrete convolution truncated to the input length (centered).
fn convolve_same(a: &[f64], w: &[f64]) -> Vec<f64> {
    let n = a.len();
    let m = w.len();
    let offset = (m - 1) / 2;
    (0..n)
        .map(|i| {
            let k = i + offset;
            let mut acc = 0.0;
            for (j, aj) in a.iter().enumerate() {
                if k >= j && k - j < m {
                    acc += aj * w[k - j];
                }
            }
            acc
        })
        .collect()
}
