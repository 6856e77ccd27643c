use socioprice::pricing::tables::{
    industry_multiplier, region_multiplier, seniority_multiplier, DEFAULT_REGION_MULTIPLIER,
};

#[test]
fn industry_lookup_is_case_insensitive() {
    assert!((industry_multiplier("Technology") - 1.2).abs() < 1e-6);
    assert!((industry_multiplier("  FINANCE ") - 1.3).abs() < 1e-6);
    assert!((industry_multiplier("underwater basket weaving") - 1.0).abs() < 1e-6);
}

#[test]
fn unknown_regions_fall_below_baseline() {
    assert!((region_multiplier("united states") - 1.0).abs() < 1e-6);
    assert!((region_multiplier("Atlantis") - DEFAULT_REGION_MULTIPLIER).abs() < 1e-6);
    assert!(DEFAULT_REGION_MULTIPLIER < 1.0);
}

#[test]
fn seniority_spans_entry_to_c_level() {
    assert!((seniority_multiplier("Entry") - 0.7).abs() < 1e-6);
    assert!((seniority_multiplier("entry-level") - 0.7).abs() < 1e-6);
    assert!((seniority_multiplier("C-Suite") - 3.0).abs() < 1e-6);
    assert!((seniority_multiplier("Vice President") - 2.6).abs() < 1e-6);
    assert!((seniority_multiplier("astronaut") - 1.0).abs() < 1e-6);
}
