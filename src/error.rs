use thiserror::Error;

/// Errors reported by the partitioning core.
///
/// Configuration problems (mismatched grids, unsupported methods) are caught
/// before any computation starts; degenerate spectra (all-zero, all-NaN) are
/// not errors and never surface here.
#[derive(Debug, Error)]
pub enum PartitionError {
    /// Energy grid shape disagrees with the frequency/direction axes.
    #[error(
        "energy grid is {rows}x{cols} but axes describe {nfreq} frequencies x {ndir} directions"
    )]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        nfreq: usize,
        ndir: usize,
    },

    /// Frequency axis is not strictly ascending.
    #[error("frequency axis must be strictly ascending (freq[{index}] = {value} breaks order)")]
    FrequencyOrder { index: usize, value: f64 },

    /// Empty axis where at least one coordinate is required.
    #[error("{axis} axis is empty")]
    EmptyAxis { axis: &'static str },

    /// Wind/depth context cardinality does not line up with the spectra batch.
    #[error("got {got} wind contexts for {expected} spectra (expected 1 or {expected})")]
    WindBroadcast { got: usize, expected: usize },

    /// A named partitioning method with no executable algorithm.
    #[error("{0} is a declared capability with no implemented algorithm")]
    UnsupportedMethod(&'static str),
}
