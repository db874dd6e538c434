//! wavepart – watershed partitioning of directional ocean-wave spectra.
//!
//! Decomposes compound, multi-modal wave spectra (2D energy grids over
//! frequency and direction) into physically distinct wave systems: a
//! wind-generated sea and one or more swell trains. Five partition test
//! methods (PTM1–PTM5) combine topographic watershed segmentation with
//! wave-age classification, inflection-based basin splitting and
//! significant-wave-height ranking; the batch layer applies any of them in
//! parallel across large spectra collections.

pub mod batch;
pub mod error;
pub mod io;
pub mod partition;
pub mod smooth;
pub mod spectrum;

pub use error::PartitionError;
pub use partition::{
    ptm1, ptm2, ptm3, ptm4, ptm5, Ptm1Options, Ptm3Options, Segmentation, SteepestAscent,
    WindContext, DEFAULT_AGEFAC, DEFAULT_WSCUT,
};
pub use spectrum::{hs, PartitionSet, Spectrum};
