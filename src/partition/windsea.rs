use ndarray::Array2;

/// Degrees → radians.
pub(crate) const D2R: f64 = std::f64::consts::PI / 180.0;

/// Default wave-age multiplier: fraction of the wind speed below which waves
/// are considered wind-generated.
pub const DEFAULT_AGEFAC: f64 = 1.7;

/// Default wind-energy fraction above which a partition is reclassified as sea.
pub const DEFAULT_WSCUT: f64 = 0.3333;

// ---------------------------------------------------------------------------
// WindContext – per-spectrum wind and depth scalars
// ---------------------------------------------------------------------------

/// Wind speed, wind direction and water depth for one spectrum.
///
/// Required by PTM1 and PTM4; PTM3/PTM5 carry no wind context. `dpt = None`
/// selects the deep-water dispersion asymptote.
#[derive(Debug, Clone, Copy)]
pub struct WindContext {
    /// Wind speed (m/s).
    pub wspd: f64,
    /// Wind direction (degrees, same convention as the spectrum's axis).
    pub wdir: f64,
    /// Water depth (m), `None` for deep water.
    pub dpt: Option<f64>,
}

impl WindContext {
    pub fn new(wspd: f64, wdir: f64, dpt: Option<f64>) -> Self {
        WindContext { wspd, wdir, dpt }
    }
}

// ---------------------------------------------------------------------------
// Dispersion
// ---------------------------------------------------------------------------

/// Wavenumber from angular frequency and depth via Hunt's approximation to
/// the finite-depth linear dispersion relation.
fn wavenuma(ang_freq: f64, depth: f64) -> f64 {
    let k0h = 0.10194 * ang_freq * ang_freq * depth;
    const D: [f64; 6] = [0.0, 0.6522, 0.4622, 0.0, 0.0864, 0.0675];
    let mut a = 1.0;
    let mut pow = 1.0;
    for coef in D.iter().skip(1) {
        pow *= k0h;
        a += coef * pow;
    }
    (k0h * (1.0 + 1.0 / (k0h * a)).sqrt()) / depth
}

/// Wave phase speed (celerity, m/s) at a frequency and depth.
///
/// Deep water (`depth = None` or non-finite) uses the `1.56 / f` asymptote.
pub fn celerity(freq: f64, depth: Option<f64>) -> f64 {
    match depth {
        Some(d) if d.is_finite() && d > 0.0 => {
            let ang_freq = 2.0 * std::f64::consts::PI * freq;
            ang_freq / wavenuma(ang_freq, d)
        }
        _ => 1.56 / freq,
    }
}

// ---------------------------------------------------------------------------
// Wind-sea mask and wind-energy fraction
// ---------------------------------------------------------------------------

/// Boolean grid over (frequency, direction): true where the wave celerity
/// does not exceed the wind-forcing component
/// `agefac * wspd * cos(dir - wdir)`, i.e. where the wave cannot outrun the
/// wind and is locally wind-forced.
pub fn wind_sea_mask(
    freq: &[f64],
    dir: &[f64],
    wind: &WindContext,
    agefac: f64,
) -> Array2<bool> {
    let up: Vec<f64> = dir
        .iter()
        .map(|d| agefac * wind.wspd * (D2R * (d - wind.wdir)).cos())
        .collect();
    let c: Vec<f64> = freq.iter().map(|f| celerity(*f, wind.dpt)).collect();

    Array2::from_shape_fn((freq.len(), dir.len()), |(i, j)| c[i] <= up[j])
}

/// Fraction of a partition's energy lying inside the wind-sea mask.
///
/// An empty partition has no wind-sea energy: 0/0 resolves to 0 rather than
/// propagating NaN into the classification.
pub fn wind_fraction(partition: &Array2<f64>, mask: &Array2<bool>) -> f64 {
    let mut masked = 0.0;
    let mut total = 0.0;
    for (v, m) in partition.iter().zip(mask.iter()) {
        if !v.is_finite() {
            continue;
        }
        total += v;
        if *m {
            masked += v;
        }
    }
    if total > 0.0 {
        masked / total
    } else {
        0.0
    }
}
