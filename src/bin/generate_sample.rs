use std::path::PathBuf;

use anyhow::{Context, Result};
use multinest_catalogue::{
    export_csv, render_stats, save, CatalogueBuilder, ModeRecord, ResultsLayout,
};

const N_PAR: usize = 3;

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

/// One mode scattered around `centre` (stellar mass, attenuation, metallicity).
fn generate_mode(
    centre: &[f64; N_PAR],
    log_evidence: f64,
    rng: &mut SimpleRng,
) -> Result<ModeRecord> {
    let mut estimate = |sigma: f64| -> Vec<f64> {
        centre.iter().map(|&c| rng.gauss(c, sigma)).collect()
    };
    let mean = estimate(0.05);
    let ml = estimate(0.1);
    let map = estimate(0.08);
    Ok(ModeRecord::new(log_evidence, mean, ml, map)?)
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "sample_results".to_string()));
    let n_objects: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid object count '{n}'"))?,
        None => 10,
    };

    let mut rng = SimpleRng::new(42);
    let layout = ResultsLayout::new(&out_dir);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    for i in 0..n_objects {
        let id = 100 * (i + 1);
        let centre = [
            rng.gauss(9.5, 0.8),
            (rng.next_f64() * 2.0).max(0.01),
            rng.gauss(-0.3, 0.4),
        ];

        // Up to three modes, the first one carrying most of the evidence.
        let n_modes = 1 + (rng.next_u64() % 3) as usize;
        let global_log_evidence = rng.gauss(-25.0, 3.0);
        let mut modes = Vec::with_capacity(n_modes);
        for m in 0..n_modes {
            let shifted = centre.map(|c| c + m as f64 * 0.7);
            let log_evidence = global_log_evidence - 0.5 - 2.0 * m as f64;
            modes.push(generate_mode(&shifted, log_evidence, &mut rng)?);
        }

        let path = out_dir.join(format!("{id}{}", layout.file_suffix));
        std::fs::write(&path, render_stats(global_log_evidence, &modes))
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let files = layout.stats_files().context("listing statistics files")?;
    let report = CatalogueBuilder::new("sample", N_PAR)
        .build(&files)
        .context("building catalogue")?;
    let catalogue = report.catalogue;

    let catalogue_path = layout.output_path("catalogue.json")?;
    save(&catalogue, &catalogue_path).context("saving catalogue")?;
    let table_path = layout.output_path("catalogue.csv")?;
    export_csv(&catalogue, None, &table_path).context("exporting catalogue table")?;

    let n_modes: usize = catalogue.objects().iter().map(|o| o.modes().len()).sum();
    println!(
        "Wrote {} statistics files ({n_modes} modes) to {}, catalogue in {}",
        catalogue.len(),
        out_dir.display(),
        catalogue_path.display()
    );
    Ok(())
}
