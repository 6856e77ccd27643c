use serde::{Deserialize, Serialize};

use crate::audience::distribution::top_bucket;
use crate::audience::{age_lower_bound, AggregatedDemographics, Buckets, DemographicDistribution};
use crate::{PricePoint, Segment};

pub const CORE_SEGMENT: &str = "Core Audience";
pub const PREMIUM_SEGMENT: &str = "Premium Segment";
pub const VALUE_SEGMENT: &str = "Value Segment";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub premium_min_age: u32,
    pub value_max_age: u32,
    pub premium_factor: f64,
    pub value_factor: f64,
    pub core_conversion: f64,
    pub core_confidence: f64,
    pub premium_conversion: f64,
    pub premium_confidence: f64,
    pub value_conversion: f64,
    pub value_confidence: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            premium_min_age: 35,
            value_max_age: 25,
            premium_factor: 1.3,
            value_factor: 0.7,
            core_conversion: 0.045,
            core_confidence: 0.9,
            premium_conversion: 0.025,
            premium_confidence: 0.8,
            value_conversion: 0.03,
            value_confidence: 0.75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SegmentGenerator {
    config: SegmentConfig,
}

impl SegmentGenerator {
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }

    /// Core first, then Premium and Value when the age distribution has
    /// buckets that qualify for them.
    pub fn generate(
        &self,
        aggregated: &AggregatedDemographics,
        optimal_price: f64,
    ) -> Vec<Segment> {
        let demographics = &aggregated.demographics;
        let mut segments = vec![Segment {
            name: CORE_SEGMENT.to_string(),
            description: "Largest audience group across your connected accounts".to_string(),
            demographic_target: demographics.top_buckets(),
            recommended_prices: vec![PricePoint {
                amount: optimal_price,
                conversion_rate: self.config.core_conversion,
                confidence: self.config.core_confidence,
            }],
        }];

        let premium_ages = age_buckets_where(&demographics.age, |bound| {
            bound >= self.config.premium_min_age
        });
        if !premium_ages.is_empty() {
            let mut target = DemographicDistribution {
                age: premium_ages,
                ..DemographicDistribution::default()
            };
            if let Some((label, weight)) = combined_top_label(&demographics.interest, 2) {
                target.interest.insert(label, weight);
            }
            if let Some((label, weight)) = top_bucket(&demographics.income) {
                target.income.insert(label.to_string(), weight);
            }
            segments.push(Segment {
                name: PREMIUM_SEGMENT.to_string(),
                description: format!(
                    "Audience aged {}+ with higher purchasing power",
                    self.config.premium_min_age
                ),
                demographic_target: target,
                recommended_prices: vec![PricePoint {
                    amount: (optimal_price * self.config.premium_factor).round(),
                    conversion_rate: self.config.premium_conversion,
                    confidence: self.config.premium_confidence,
                }],
            });
        }

        let value_ages = age_buckets_where(&demographics.age, |bound| {
            bound < self.config.value_max_age
        });
        if !value_ages.is_empty() {
            let mut target = DemographicDistribution {
                age: value_ages,
                ..DemographicDistribution::default()
            };
            if let Some((label, weight)) = top_bucket(&demographics.interest) {
                target.interest.insert(label.to_string(), weight);
            }
            segments.push(Segment {
                name: VALUE_SEGMENT.to_string(),
                description: format!(
                    "Price-sensitive audience under {}",
                    self.config.value_max_age
                ),
                demographic_target: target,
                recommended_prices: vec![PricePoint {
                    amount: (optimal_price * self.config.value_factor).round(),
                    conversion_rate: self.config.value_conversion,
                    confidence: self.config.value_confidence,
                }],
            });
        }

        segments
    }
}

fn age_buckets_where(ages: &Buckets, predicate: impl Fn(u32) -> bool) -> Buckets {
    ages.iter()
        .filter(|(label, _)| age_lower_bound(label).is_some_and(&predicate))
        .map(|(label, weight)| (label.clone(), *weight))
        .collect()
}

/// Joins the `count` heaviest labels into one descriptive label such as
/// `"Technology, Business"`, carrying their combined weight.
fn combined_top_label(buckets: &Buckets, count: usize) -> Option<(String, f64)> {
    let mut ranked: Vec<(&String, f64)> = buckets
        .iter()
        .map(|(label, weight)| (label, *weight))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(count);
    if ranked.is_empty() {
        return None;
    }
    let label = ranked
        .iter()
        .map(|(label, _)| label.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let weight: f64 = ranked.iter().map(|(_, weight)| weight).sum();
    Some((label, weight))
}
