use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

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

/// Region name, mean life expectancy, mean log10 GDP per capita.
const REGIONS: [(&str, f64, f64); 5] = [
    ("Europe", 79.0, 4.5),
    ("Asia", 73.0, 3.9),
    ("Africa", 63.0, 3.3),
    ("Americas", 75.0, 4.1),
    ("Oceania", 76.0, 4.3),
];

const COUNTRIES_PER_REGION: usize = 12;

fn main() -> Result<()> {
    let out_dir = std::env::args().nth(1).unwrap_or_else(|| "sample".to_string());
    let out_dir = Path::new(&out_dir);
    fs::create_dir_all(out_dir.join("charts")).context("creating output directory")?;

    let mut rng = SimpleRng::new(42);

    let data_path = out_dir.join("data.csv");
    let mut writer = csv::Writer::from_path(&data_path).context("creating data.csv")?;
    writer.write_record(["Country", "Region", "Life expectancy", "GDP", "Population"])?;

    let mut rows = 0;
    for (region, life, log_gdp) in REGIONS {
        for i in 0..COUNTRIES_PER_REGION {
            let country = format!("{region} {}", i + 1);
            let life_expectancy = rng.gauss(life, 3.5).clamp(45.0, 90.0);
            let gdp = 10f64.powf(rng.gauss(log_gdp, 0.25)).round();
            let population = 10f64.powf(5.5 + rng.next_f64() * 3.0).round();
            writer.write_record([
                country,
                region.to_string(),
                format!("{life_expectancy:.1}"),
                format!("{gdp}"),
                format!("{population}"),
            ])?;
            rows += 1;
        }
    }
    writer.flush().context("writing data.csv")?;

    let charts = [
        (
            "gdp-by-country",
            json!({
                "template": "@flourish/line-bar-pie",
                "title": "GDP per capita",
                "bindings": { "data": { "label": "Country", "value": ["GDP"] } }
            }),
        ),
        (
            "life-vs-gdp",
            json!({
                "template": "@flourish/scatter",
                "title": "Life expectancy vs GDP",
                "bindings": { "data": { "x": "GDP", "y": "Life expectancy", "color": "Region" } }
            }),
        ),
        (
            "table",
            json!({ "template": "@flourish/table", "title": "Countries" }),
        ),
    ];
    for (id, chart) in &charts {
        let path = out_dir.join("charts").join(format!("{id}.json"));
        fs::write(&path, serde_json::to_string_pretty(chart)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let config = json!({
        "dataset_source": data_path.to_string_lossy(),
        "chart_config_template": format!("{}/charts/{{id}}.json", out_dir.display()),
        "charts": charts
            .iter()
            .enumerate()
            .map(|(i, (id, _))| json!({ "id": id, "container": format!("#chart-{i}") }))
            .collect::<Vec<_>>(),
    });
    let config_path = out_dir.join("dashboard.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)
        .context("writing dashboard.json")?;

    println!(
        "Wrote {rows} rows and {} chart configs; open {} via File → Open config…",
        charts.len(),
        config_path.display()
    );
    Ok(())
}
