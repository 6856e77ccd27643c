use socioprice::audience::{AggregatedDemographics, DemographicDistribution, Dimension};
use socioprice::pricing::segments::{CORE_SEGMENT, PREMIUM_SEGMENT, VALUE_SEGMENT};
use socioprice::pricing::{SegmentConfig, SegmentGenerator};

fn aggregated(demographics: DemographicDistribution) -> AggregatedDemographics {
    AggregatedDemographics {
        total_followers: 10_000,
        demographics,
    }
}

fn generator() -> SegmentGenerator {
    SegmentGenerator::new(SegmentConfig::default())
}

#[test]
fn no_age_data_yields_only_core_segment() {
    let demographics =
        DemographicDistribution::default().with_bucket(Dimension::Location, "Canada", 1.0);
    let segments = generator().generate(&aggregated(demographics), 97.0);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].name, CORE_SEGMENT);
    assert!((segments[0].recommended_prices[0].amount - 97.0).abs() < 1e-6);
    assert_eq!(segments[0].demographic_target.location["Canada"], 1.0);
}

#[test]
fn mixed_ages_yield_all_three_segments_in_order() {
    let demographics = DemographicDistribution::default()
        .with_bucket(Dimension::Age, "18-24", 0.3)
        .with_bucket(Dimension::Age, "25-34", 0.4)
        .with_bucket(Dimension::Age, "35-44", 0.2)
        .with_bucket(Dimension::Age, "65+", 0.1)
        .with_bucket(Dimension::Interest, "technology", 0.5)
        .with_bucket(Dimension::Interest, "business", 0.3)
        .with_bucket(Dimension::Interest, "gaming", 0.2)
        .with_bucket(Dimension::Income, "100k+", 0.6)
        .with_bucket(Dimension::Income, "50k-100k", 0.4);

    let segments = generator().generate(&aggregated(demographics), 100.0);
    let names: Vec<&str> = segments.iter().map(|segment| segment.name.as_str()).collect();
    assert_eq!(names, vec![CORE_SEGMENT, PREMIUM_SEGMENT, VALUE_SEGMENT]);

    let core = &segments[0];
    assert_eq!(core.demographic_target.age.len(), 1);
    assert!(core.demographic_target.age.contains_key("25-34"));

    let premium = &segments[1];
    assert!((premium.recommended_prices[0].amount - 130.0).abs() < 1e-6);
    let premium_ages: Vec<&String> = premium.demographic_target.age.keys().collect();
    assert_eq!(premium_ages, vec!["35-44", "65+"]);
    assert!((premium.demographic_target.interest["technology, business"] - 0.8).abs() < 1e-9);
    assert!(premium.demographic_target.income.contains_key("100k+"));

    let value = &segments[2];
    assert!((value.recommended_prices[0].amount - 70.0).abs() < 1e-6);
    let value_ages: Vec<&String> = value.demographic_target.age.keys().collect();
    assert_eq!(value_ages, vec!["18-24"]);
    assert!(value.demographic_target.interest.contains_key("technology"));
}

#[test]
fn only_older_audience_skips_value_segment() {
    let demographics = DemographicDistribution::default()
        .with_bucket(Dimension::Age, "35-44", 0.5)
        .with_bucket(Dimension::Age, "45-54", 0.5);
    let segments = generator().generate(&aggregated(demographics), 47.0);

    let names: Vec<&str> = segments.iter().map(|segment| segment.name.as_str()).collect();
    assert_eq!(names, vec![CORE_SEGMENT, PREMIUM_SEGMENT]);
    assert!((segments[1].recommended_prices[0].amount - 61.0).abs() < 1e-6);
}

#[test]
fn tied_top_buckets_resolve_to_smallest_label() {
    let demographics = DemographicDistribution::default()
        .with_bucket(Dimension::Gender, "male", 0.5)
        .with_bucket(Dimension::Gender, "female", 0.5)
        .with_bucket(Dimension::Location, "Germany", 0.5)
        .with_bucket(Dimension::Location, "Austria", 0.5);

    let first = generator().generate(&aggregated(demographics.clone()), 50.0);
    let second = generator().generate(&aggregated(demographics), 50.0);

    let core = &first[0].demographic_target;
    assert!(core.gender.contains_key("female"));
    assert!(core.location.contains_key("Austria"));
    assert_eq!(first, second);
}

#[test]
fn unparseable_age_labels_are_ignored() {
    let demographics = DemographicDistribution::default()
        .with_bucket(Dimension::Age, "unknown", 0.7)
        .with_bucket(Dimension::Age, "13-17", 0.3);
    let segments = generator().generate(&aggregated(demographics), 20.0);

    let names: Vec<&str> = segments.iter().map(|segment| segment.name.as_str()).collect();
    assert_eq!(names, vec![CORE_SEGMENT, VALUE_SEGMENT]);
    assert!((segments[1].recommended_prices[0].amount - 14.0).abs() < 1e-6);
}

#[test]
fn segment_factors_are_configurable() {
    let config = SegmentConfig {
        premium_factor: 1.5,
        ..SegmentConfig::default()
    };
    let demographics = DemographicDistribution::default().with_bucket(Dimension::Age, "55-64", 1.0);
    let segments = SegmentGenerator::new(config).generate(&aggregated(demographics), 40.0);
    assert!((segments[1].recommended_prices[0].amount - 60.0).abs() < 1e-6);
}
