//! Generate a synthetic directional-spectra file for trying out the
//! partitioner: a young wind sea, a sea + swell combination and a pair of
//! crossed swells, each with matching wind data.

use wavepart::io::json::SpectrumRecord;

fn gaussian2d(f: f64, d: f64, fp: f64, dp: f64, sf: f64, sd: f64, amplitude: f64) -> f64 {
    let df = (f - fp) / sf;
    let mut dd = (d - dp).abs() % 360.0;
    if dd > 180.0 {
        dd = 360.0 - dd;
    }
    let dd = dd / sd;
    amplitude * (-0.5 * (df * df + dd * dd)).exp()
}

fn generate_spectrum(
    freq: &[f64],
    dir: &[f64],
    peaks: &[(f64, f64, f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<Vec<f64>> {
    freq.iter()
        .map(|&f| {
            dir.iter()
                .map(|&d| {
                    let signal: f64 = peaks
                        .iter()
                        .map(|&(fp, dp, sf, sd, amp)| gaussian2d(f, d, fp, dp, sf, sd, amp))
                        .sum();
                    (signal + rng.gauss(0.0, noise_level)).max(0.0)
                })
                .collect()
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Frequencies 0.04 → 0.40 Hz, directions every 10 degrees.
    let freq: Vec<f64> = (0..37).map(|i| 0.04 + i as f64 * 0.01).collect();
    let dir: Vec<f64> = (0..36).map(|j| j as f64 * 10.0).collect();

    // (name, peaks as (fp, dp, sigma_f, sigma_d, amplitude), wspd, wdir, dpt)
    let cases: Vec<(&str, Vec<(f64, f64, f64, f64, f64)>, f64, f64, f64)> = vec![
        (
            "young wind sea",
            vec![(0.22, 45.0, 0.04, 35.0, 1.2)],
            14.0,
            45.0,
            60.0,
        ),
        (
            "sea plus old swell",
            vec![
                (0.24, 120.0, 0.035, 30.0, 0.8),
                (0.07, 290.0, 0.012, 18.0, 2.5),
            ],
            11.0,
            110.0,
            200.0,
        ),
        (
            "crossed swells, light wind",
            vec![
                (0.08, 200.0, 0.015, 20.0, 1.8),
                (0.11, 320.0, 0.018, 22.0, 1.1),
            ],
            4.0,
            10.0,
            500.0,
        ),
    ];

    let mut records = Vec::new();
    for (hour, (name, peaks, wspd, wdir, dpt)) in cases.iter().enumerate() {
        let efth = generate_spectrum(&freq, &dir, peaks, 0.0005, &mut rng);
        records.push(SpectrumRecord {
            freq: freq.clone(),
            dir: dir.clone(),
            efth,
            wspd: Some(*wspd),
            wdir: Some(*wdir),
            dpt: Some(*dpt),
            time: Some(format!("20230101.{hour:02}0000")),
        });
        println!("generated {name}");
    }

    let output_path = "sample_spectra.json";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    serde_json::to_writer(std::io::BufWriter::new(file), &records)
        .expect("Failed to write records");

    println!(
        "Wrote {} spectra ({}x{} bins each) to {output_path}",
        records.len(),
        freq.len(),
        dir.len()
    );
}
