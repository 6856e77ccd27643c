//! Static multiplier tables. Lookups are case-insensitive and fall back to
//! a fixed default for unmatched keys.

pub const DEFAULT_INDUSTRY_MULTIPLIER: f64 = 1.0;

/// Unmatched regions are treated as below-baseline purchasing power.
pub const DEFAULT_REGION_MULTIPLIER: f64 = 0.6;

pub const DEFAULT_SENIORITY_MULTIPLIER: f64 = 1.0;

pub const INDUSTRY_MULTIPLIERS: &[(&str, f64)] = &[
    ("technology", 1.2),
    ("finance", 1.3),
    ("healthcare", 1.25),
    ("legal", 1.35),
    ("real estate", 1.3),
    ("consulting", 1.25),
    ("business", 1.15),
    ("marketing", 1.1),
    ("travel", 1.05),
    ("education", 1.0),
    ("fashion", 1.0),
    ("beauty", 0.95),
    ("fitness", 0.95),
    ("lifestyle", 0.95),
    ("food", 0.9),
    ("entertainment", 0.9),
    ("gaming", 0.85),
];

pub const REGION_MULTIPLIERS: &[(&str, f64)] = &[
    ("United States", 1.0),
    ("Switzerland", 1.1),
    ("Norway", 1.05),
    ("Canada", 0.95),
    ("United Kingdom", 0.95),
    ("Australia", 0.95),
    ("Germany", 0.9),
    ("Netherlands", 0.9),
    ("Sweden", 0.9),
    ("Denmark", 0.95),
    ("Singapore", 0.95),
    ("France", 0.85),
    ("Japan", 0.85),
    ("New Zealand", 0.85),
    ("United Arab Emirates", 0.9),
    ("Spain", 0.75),
    ("Italy", 0.75),
    ("South Korea", 0.8),
    ("Mexico", 0.5),
    ("Brazil", 0.5),
    ("South Africa", 0.5),
    ("Philippines", 0.4),
    ("Indonesia", 0.4),
    ("India", 0.35),
    ("Nigeria", 0.35),
];

pub const SENIORITY_MULTIPLIERS: &[(&str, f64)] = &[
    ("entry", 0.7),
    ("junior", 0.8),
    ("mid", 1.0),
    ("senior", 1.5),
    ("manager", 1.8),
    ("director", 2.2),
    ("vp", 2.6),
    ("c-level", 3.0),
];

pub fn industry_multiplier(industry: &str) -> f64 {
    lookup(INDUSTRY_MULTIPLIERS, industry).unwrap_or(DEFAULT_INDUSTRY_MULTIPLIER)
}

pub fn region_multiplier(region: &str) -> f64 {
    lookup(REGION_MULTIPLIERS, region).unwrap_or(DEFAULT_REGION_MULTIPLIER)
}

pub fn seniority_multiplier(seniority: &str) -> f64 {
    let key = match seniority.trim().to_lowercase().as_str() {
        "entry level" | "entry-level" | "intern" => "entry".to_string(),
        "mid level" | "mid-level" | "intermediate" => "mid".to_string(),
        "vice president" => "vp".to_string(),
        "c level" | "c-suite" | "cxo" | "executive" | "owner" | "founder" => "c-level".to_string(),
        other => other.to_string(),
    };
    lookup(SENIORITY_MULTIPLIERS, &key).unwrap_or(DEFAULT_SENIORITY_MULTIPLIER)
}

fn lookup(table: &[(&str, f64)], key: &str) -> Option<f64> {
    let key = key.trim();
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| *value)
}
