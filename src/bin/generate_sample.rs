use anyhow::{Context, Result};
use serde::Serialize;

const MONTHS: [&str; 12] = [
    "JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE", "JULY", "AUGUST", "SEPTEMBER",
    "OCTOBER", "NOVEMBER", "DECEMBER",
];
const DAYS: [&str; 7] = [
    "MONDAY", "TUESDAY", "WEDNESDAY", "THURSDAY", "FRIDAY", "SATURDAY", "SUNDAY",
];
const TIME_BANDS: [&str; 8] = [
    "00:00-02:59",
    "03:00-05:59",
    "06:00-08:59",
    "09:00-11:59",
    "12:00-14:59",
    "15:00-17:59",
    "18:00-20:59",
    "21:00-23:59",
];
/// Relative traffic per time band, peaking in the afternoon rush.
const BAND_WEIGHTS: [f64; 8] = [0.3, 0.15, 0.8, 0.9, 1.0, 1.3, 0.9, 0.5];

/// Full years, then one year that stops after June.
const FULL_YEARS: std::ops::RangeInclusive<i64> = 2018..=2022;
const PARTIAL_YEAR: i64 = 2023;
const PARTIAL_MONTHS: usize = 6;

#[derive(Debug, Serialize)]
struct SampleRow {
    #[serde(rename = "Date Of Loss Year")]
    year: i64,
    #[serde(rename = "Month Of Year")]
    month: &'static str,
    #[serde(rename = "Day Of Week")]
    day: &'static str,
    #[serde(rename = "Time Category")]
    time: &'static str,
    #[serde(rename = "Total Crashes")]
    total: i64,
    #[serde(rename = "Crash Severity")]
    severity: &'static str,
    #[serde(rename = "Cyclist Flag")]
    cyclist: &'static str,
    #[serde(rename = "Pedestrian Flag")]
    pedestrian: &'static str,
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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

fn flag(yes: bool) -> &'static str {
    if yes { "Yes" } else { "No" }
}

fn sample_rows(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let years = FULL_YEARS
        .map(|y| (y, MONTHS.len()))
        .chain(std::iter::once((PARTIAL_YEAR, PARTIAL_MONTHS)));

    let mut rows = Vec::new();
    for (year, n_months) in years {
        for (m_idx, &month) in MONTHS.iter().take(n_months).enumerate() {
            // Darker, wetter months see more crashes.
            let season = 1.0 + 0.25 * ((m_idx as f64 - 1.0) / 12.0 * std::f64::consts::TAU).cos();
            for (d_idx, &day) in DAYS.iter().enumerate() {
                let weekday = if d_idx < 5 { 1.0 } else { 0.75 };
                for (&time, weight) in TIME_BANDS.iter().zip(BAND_WEIGHTS) {
                    // Leave some buckets empty; empty buckets are simply absent.
                    if rng.chance(0.05) {
                        continue;
                    }
                    let expected = 12.0 * season * weekday * weight;
                    let total = (expected * (0.6 + 0.8 * rng.next_f64())).round() as i64;

                    let pedestrian = rng.chance(0.08);
                    let cyclist = rng.chance(0.06);
                    let casualty_odds = if pedestrian || cyclist { 0.85 } else { 0.3 };
                    let severity = if rng.chance(casualty_odds) {
                        "CASUALTY CRASH"
                    } else {
                        "PROPERTY DAMAGE ONLY"
                    };

                    rows.push(SampleRow {
                        year,
                        month,
                        day,
                        time,
                        total,
                        severity,
                        cyclist: flag(cyclist),
                        pedestrian: flag(pedestrian),
                    });
                }
            }
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let rows = sample_rows(&mut rng);

    let csv_path = "sample_crashes.csv";
    write_csv(csv_path, &rows)?;

    log::info!(
        "Wrote {} crash buckets ({}..={} complete, {PARTIAL_YEAR} through {}) to {csv_path}",
        rows.len(),
        FULL_YEARS.start(),
        FULL_YEARS.end(),
        MONTHS[PARTIAL_MONTHS - 1]
    );
    println!("Wrote {} crash buckets to {csv_path}", rows.len());
    Ok(())
}
