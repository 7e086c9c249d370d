//! Writes a deterministic sample property table in the layout the explorer
//! loads, including the messy cells real exports contain.
//!
//! Usage: `generate_sample [OUTPUT]` (default `table.csv`).

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**). Fixed seed, so the sample
/// file is byte-identical across runs.
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

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// (type, share of rows, bedroom range, typical size)
const TYPES: [(&str, f64, (i64, i64), f64); 6] = [
    ("Single Family", 0.55, (2, 5), 2100.0),
    ("Condo", 0.20, (1, 3), 1100.0),
    ("Multi-Family", 0.08, (3, 8), 3200.0),
    ("Apartment", 0.07, (0, 2), 750.0),
    ("Townhouse", 0.06, (2, 4), 1600.0),
    ("Manufactured", 0.04, (1, 3), 900.0),
];

const STREETS: [&str; 8] = [
    "Front St", "Water St", "High St", "Court St", "Linden St", "Portsmouth Ave", "Epping Rd",
    "Newfields Rd",
];
const OWNERS: [&str; 6] = [
    "Smith Family Trust",
    "J. O'Neil",
    "Exeter Housing LLC",
    "M. Chen",
    "R. Alvarez",
    "Town of Exeter",
];

fn choose_type(rng: &mut SimpleRng) -> (&'static str, (i64, i64), f64) {
    let mut roll = rng.next_f64();
    for (name, share, bedrooms, size) in TYPES {
        if roll < share {
            return (name, bedrooms, size);
        }
        roll -= share;
    }
    let (name, _, bedrooms, size) = TYPES[0];
    (name, bedrooms, size)
}

fn tax_literal(rng: &mut SimpleRng, base: f64) -> String {
    let entries: Vec<String> = (2021..=2024)
        .filter(|_| rng.chance(0.8))
        .map(|year| {
            let total = (base * (1.0 + 0.03 * (year - 2021) as f64)).round() as i64;
            format!("'{year}': {{'year': {year}, 'total': {total}}}")
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn main() -> Result<()> {
    let output_path = std::env::args().nth(1).unwrap_or_else(|| "table.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "id",
        "addressLine1",
        "city",
        "state",
        "propertyType",
        "bedrooms",
        "bathrooms",
        "yearBuilt",
        "squareFootage",
        "latitude",
        "longitude",
        "features",
        "taxAssessments",
        "propertyTaxes",
        "owner",
    ])?;

    let rows = 400;
    for id in 0..rows {
        let (kind, (bed_lo, bed_hi), size) = choose_type(&mut rng);
        let address = format!("{} {}", rng.range(1, 250), rng.pick(&STREETS));

        // Blank types, missing rooms and garbage years all occur in exports.
        let property_type = if rng.chance(0.03) { "  ".to_string() } else { kind.to_string() };
        let bedrooms = if rng.chance(0.05) {
            String::new()
        } else {
            rng.range(bed_lo, bed_hi).to_string()
        };
        let bathrooms = if rng.chance(0.05) {
            String::new()
        } else {
            (rng.range(2, 8) as f64 / 2.0).to_string()
        };
        let year_built = match rng.next_f64() {
            r if r < 0.04 => String::new(),
            r if r < 0.05 => "unknown".to_string(),
            r if r < 0.25 => rng.range(1700, 1899).to_string(),
            _ => rng.range(1900, 2024).to_string(),
        };
        let square_footage = if rng.chance(0.1) {
            String::new()
        } else {
            (size * (0.6 + 0.8 * rng.next_f64())).round().to_string()
        };
        let (latitude, longitude) = if rng.chance(0.08) {
            (String::new(), String::new())
        } else {
            (
                format!("{:.6}", 42.98 + (rng.next_f64() - 0.5) * 0.06),
                format!("{:.6}", -70.95 + (rng.next_f64() - 0.5) * 0.08),
            )
        };

        let features = format!(
            "{{'garage': {}, 'floorCount': {}}}",
            if rng.chance(0.6) { "True" } else { "False" },
            rng.range(1, 3)
        );
        let assessed = (size * 180.0 * (0.7 + 0.6 * rng.next_f64())).round() as i64;
        let tax_assessments = format!("{{'2024': {{'year': 2024, 'value': {assessed}}}}}");
        let property_taxes = if rng.chance(0.15) {
            String::new()
        } else {
            tax_literal(&mut rng, assessed as f64 * 0.018)
        };
        let owner = if rng.chance(0.05) {
            "n/a".to_string()
        } else {
            format!("{{'names': ['{}'], 'type': 'Individual'}}", rng.pick(&OWNERS).replace('\'', "\\'"))
        };

        writer.write_record([
            id.to_string(),
            address,
            "Exeter".to_string(),
            "NH".to_string(),
            property_type,
            bedrooms,
            bathrooms,
            year_built,
            square_footage,
            latitude,
            longitude,
            features,
            tax_assessments,
            property_taxes,
            owner,
        ])?;
    }
    writer.flush()?;

    println!("Wrote {rows} properties to {output_path}");
    Ok(())
}
