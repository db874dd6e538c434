use ndarray::{Array2, Array3, Axis};

use crate::error::PartitionError;

// ---------------------------------------------------------------------------
// Spectrum – one directional wave spectrum
// ---------------------------------------------------------------------------

/// A single directional wave spectrum: energy density E(f, d) on a
/// frequency/direction grid.
///
/// The energy grid has shape `(nfreq, ndir)`. Frequencies are ascending Hz;
/// directions are degrees in arbitrary order (the grid may wrap at 360).
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Frequency axis (Hz), strictly ascending.
    pub freq: Vec<f64>,
    /// Direction axis (degrees).
    pub dir: Vec<f64>,
    /// Spectral energy density, shape `(freq.len(), dir.len())`.
    pub energy: Array2<f64>,
}

impl Spectrum {
    /// Build a spectrum, validating that the axes agree with the grid shape
    /// and that the frequency axis is strictly ascending.
    pub fn new(freq: Vec<f64>, dir: Vec<f64>, energy: Array2<f64>) -> Result<Self, PartitionError> {
        if freq.is_empty() {
            return Err(PartitionError::EmptyAxis { axis: "frequency" });
        }
        if dir.is_empty() {
            return Err(PartitionError::EmptyAxis { axis: "direction" });
        }
        let (rows, cols) = energy.dim();
        if rows != freq.len() || cols != dir.len() {
            return Err(PartitionError::ShapeMismatch {
                rows,
                cols,
                nfreq: freq.len(),
                ndir: dir.len(),
            });
        }
        for i in 1..freq.len() {
            if freq[i] <= freq[i - 1] {
                return Err(PartitionError::FrequencyOrder {
                    index: i,
                    value: freq[i],
                });
            }
        }
        Ok(Spectrum { freq, dir, energy })
    }

    /// Number of frequency bins.
    pub fn nfreq(&self) -> usize {
        self.freq.len()
    }

    /// Number of direction bins.
    pub fn ndir(&self) -> usize {
        self.dir.len()
    }

    /// Significant wave height of this spectrum (with tail correction).
    pub fn hs(&self) -> f64 {
        hs(&self.energy, &self.freq, &self.dir, true)
    }

    /// Total finite energy in the grid. Non-finite bins count as zero.
    pub fn total_energy(&self) -> f64 {
        self.energy
            .iter()
            .filter(|v| v.is_finite())
            .sum()
    }

    /// An all-zero grid with this spectrum's shape.
    pub fn zeros_like(&self) -> Array2<f64> {
        Array2::zeros(self.energy.dim())
    }
}

// ---------------------------------------------------------------------------
// Axis helpers and spectral statistics
// ---------------------------------------------------------------------------

/// Successive frequency differences. A single-bin axis has no resolution to
/// speak of and yields `[1.0]` so downstream integrals stay defined.
pub fn frequency_resolution(freq: &[f64]) -> Vec<f64> {
    if freq.len() > 1 {
        freq.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
    } else {
        vec![1.0]
    }
}

/// Significant wave height Hm0 of a spectral grid.
///
/// Integrates energy over direction (scaled by the direction step when more
/// than one direction bin is present), then trapezoidal-integrates over
/// frequency. When `tail` is set and the highest resolved frequency exceeds
/// 0.333 Hz, a parametric high-frequency tail `0.25 * E_last * f_last` is
/// added before taking `4 * sqrt(Etot)`.
///
/// Ranking order downstream depends on this exact formula.
pub fn hs(spectrum: &Array2<f64>, freq: &[f64], dir: &[f64], tail: bool) -> f64 {
    let e: Vec<f64> = if dir.len() > 1 {
        let ddir = (dir[1] - dir[0]).abs();
        spectrum
            .sum_axis(Axis(1))
            .iter()
            .map(|v| ddir * v)
            .collect()
    } else {
        spectrum.column(0).to_vec()
    };

    let df = frequency_resolution(freq);
    let mut etot = 0.0;
    for i in 0..e.len().saturating_sub(1) {
        etot += 0.5 * df[i] * (e[i + 1] + e[i]);
    }
    let f_last = *freq.last().unwrap_or(&0.0);
    if tail && f_last > 0.333 {
        etot += 0.25 * e[e.len() - 1] * f_last;
    }
    4.0 * etot.sqrt()
}

// ---------------------------------------------------------------------------
// PartitionSet – the ordered output of one partitioning call
// ---------------------------------------------------------------------------

/// Fixed-length ordered sequence of sub-spectra produced by one partitioning
/// call.
///
/// All parts share the same frequency/direction axes. The length is exactly
/// the requested partition count regardless of how many basins were actually
/// found; missing slots hold all-zero grids. Apart from a reserved sea slot
/// (method-dependent, positional), parts are ordered by stable-descending Hs.
#[derive(Debug, Clone)]
pub struct PartitionSet {
    /// Frequency axis shared by all parts (Hz).
    pub freq: Vec<f64>,
    /// Direction axis shared by all parts (degrees).
    pub dir: Vec<f64>,
    /// Sub-spectra, one grid per partition index.
    pub parts: Vec<Array2<f64>>,
}

impl PartitionSet {
    /// Number of partitions (fixed at construction).
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the set holds no partitions at all.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Significant wave height of one partition.
    pub fn hs(&self, part: usize) -> f64 {
        hs(&self.parts[part], &self.freq, &self.dir, true)
    }

    /// Bin-wise sum of all partitions.
    pub fn combined(&self) -> Array2<f64> {
        let mut out = Array2::zeros(
            self.parts
                .first()
                .map(|p| p.dim())
                .unwrap_or((self.freq.len(), self.dir.len())),
        );
        for p in &self.parts {
            out += p;
        }
        out
    }

    /// Stack the partitions along a leading partition-index axis, shape
    /// `(nparts, nfreq, ndir)`. Index coordinates are plain ascending
    /// integers; sea/swell meaning is positional.
    pub fn into_stacked(self) -> Array3<f64> {
        let (nf, nd) = (self.freq.len(), self.dir.len());
        let mut out = Array3::zeros((self.parts.len(), nf, nd));
        for (k, p) in self.parts.iter().enumerate() {
            out.index_axis_mut(Axis(0), k).assign(p);
        }
        out
    }
}
