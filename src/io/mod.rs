//! I/O layer: interchange formats for spectra collections.
//!
//! Architecture:
//! ```text
//!  .spec (SWAN ASCII) / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  reader   │  parse file → LoadedSpectra
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ batch layer   │  partition every spectrum
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  writers  │  partitioned JSON, CSV Hs summary
//!   └──────────┘
//! ```
//!
//! Readers materialize complete grids before handing them to the core; no
//! file handles or incremental read state cross that boundary.

pub mod json;
pub mod summary;
pub mod swan;

use std::path::Path;

use anyhow::{bail, Result};

use crate::partition::WindContext;
use crate::spectrum::Spectrum;

/// A spectra collection read from disk.
#[derive(Debug, Clone, Default)]
pub struct LoadedSpectra {
    /// One spectrum per record.
    pub spectra: Vec<Spectrum>,
    /// Wind/depth context per record, where the format carries one.
    pub winds: Vec<Option<WindContext>>,
    /// Timestamp per record, where the format carries one.
    pub times: Vec<Option<String>>,
}

/// Load a spectra collection from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.spec` / `.swn` – SWAN ASCII spectral file
/// * `.json`          – records-oriented JSON (`freq`, `dir`, `efth`, optional wind)
pub fn load_file(path: &Path) -> Result<LoadedSpectra> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "spec" | "swn" => swan::read_swan(path),
        "json" => json::read_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}
