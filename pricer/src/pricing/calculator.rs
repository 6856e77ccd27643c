use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audience::{AggregatedDemographics, Buckets, Dimension};
use crate::audience::snapshot::validate_engagement_rate;
use crate::error::{PricingError, Result};
use crate::pricing::tables::{industry_multiplier, region_multiplier};
use crate::{clamp01, log10_safe, PriceRange, ProductType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    /// Follower counts below this are raised to it before the logarithm.
    pub floor: u64,
    pub step: f64,
    pub significance_threshold: f64,
    /// Reject a follower count of zero instead of raising it to `floor`.
    pub reject_zero: bool,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            floor: 100,
            step: 0.2,
            significance_threshold: 10_000.0,
            reject_zero: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub weight: f64,
    /// Engagement rate treated as full-quality data for confidence.
    pub quality_benchmark: f64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            weight: 0.3,
            quality_benchmark: 0.06,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub lower: f64,
    pub upper: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            lower: 0.8,
            upper: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub base_rate: f64,
    pub discount_rate: f64,
    pub premium_rate: f64,
    pub discount_threshold: f64,
    pub premium_threshold: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.05,
            discount_rate: 0.08,
            premium_rate: 0.03,
            discount_threshold: 0.7,
            premium_threshold: 1.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub location_target: f64,
    pub industry_target: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            location_target: 10.0,
            industry_target: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub followers: FollowerConfig,
    pub engagement: EngagementConfig,
    pub range: RangeConfig,
    pub conversion: ConversionConfig,
    pub confidence: ConfidenceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub follower: f64,
    pub industry: f64,
    pub location: f64,
    pub engagement: f64,
}

impl Multipliers {
    pub fn product(self) -> f64 {
        self.follower * self.industry * self.location * self.engagement
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub data_completeness: f64,
    pub follower_significance: f64,
    pub engagement_quality: f64,
    pub geographic_diversity: f64,
    pub industry_diversity: f64,
}

impl ConfidenceFactors {
    pub fn score(self) -> f64 {
        clamp01(
            (self.data_completeness
                + self.follower_significance
                + self.engagement_quality
                + self.geographic_diversity
                + self.industry_diversity)
                / 5.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub product_type: ProductType,
    pub base_price: f64,
    pub recommended_price: f64,
    pub price_range: PriceRange,
    pub conversion_rate: f64,
    pub confidence: f64,
    pub multipliers: Multipliers,
    pub confidence_factors: ConfidenceFactors,
}

#[derive(Debug, Clone)]
pub struct PriceCalculator {
    config: CalculatorConfig,
}

impl PriceCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn recommend_price(
        &self,
        product_type: &str,
        aggregated: &AggregatedDemographics,
        follower_count: i64,
        engagement_rate: Option<f64>,
    ) -> Result<PriceEstimate> {
        if follower_count < 0 {
            return Err(PricingError::invalid_input(format!(
                "follower count must be non-negative, got {}",
                follower_count
            )));
        }
        if follower_count == 0 && self.config.followers.reject_zero {
            return Err(PricingError::invalid_input(
                "follower count must be positive",
            ));
        }
        let product = ProductType::parse(product_type)
            .ok_or_else(|| PricingError::InvalidProductType(product_type.to_string()))?;
        aggregated.demographics.validate()?;
        if let Some(rate) = engagement_rate {
            validate_engagement_rate(rate)?;
        }

        let demographics = &aggregated.demographics;
        let base_price = product.base_price();
        let engagement_score = engagement_rate.map(|rate| rate.min(1.0)).unwrap_or(0.0);

        let multipliers = Multipliers {
            follower: self.follower_multiplier(follower_count),
            industry: weighted_multiplier(&demographics.interest, industry_multiplier),
            location: weighted_multiplier(&demographics.location, region_multiplier),
            engagement: 1.0 + engagement_score * self.config.engagement.weight,
        };

        let recommended_price = (base_price * multipliers.product()).round();
        let price_range = self.price_range(recommended_price, product.price_band());

        let confidence_factors = ConfidenceFactors {
            data_completeness: demographics.populated_dimensions() as f64
                / Dimension::ALL.len() as f64,
            follower_significance: clamp01(
                follower_count as f64 / self.config.followers.significance_threshold,
            ),
            engagement_quality: engagement_rate
                .map(|rate| clamp01(rate / self.config.engagement.quality_benchmark))
                .unwrap_or(0.0),
            geographic_diversity: clamp01(
                demographics.location.len() as f64 / self.config.confidence.location_target,
            ),
            industry_diversity: clamp01(
                demographics.interest.len() as f64 / self.config.confidence.industry_target,
            ),
        };

        let conversion_rate =
            self.conversion_rate(recommended_price, base_price, multipliers.engagement);

        debug!(
            product = product.label(),
            base_price,
            follower = multipliers.follower,
            industry = multipliers.industry,
            location = multipliers.location,
            engagement = multipliers.engagement,
            recommended_price,
            "computed price estimate"
        );

        Ok(PriceEstimate {
            product_type: product,
            base_price,
            recommended_price,
            price_range,
            conversion_rate,
            confidence: confidence_factors.score(),
            multipliers,
            confidence_factors,
        })
    }

    /// Raises the estimate to `floor` when it falls short, widening the range
    /// so it still brackets the recommended price.
    pub fn apply_floor(&self, estimate: PriceEstimate, floor: f64) -> PriceEstimate {
        if estimate.recommended_price >= floor {
            return estimate;
        }
        let recommended_price = floor;
        let price_range = PriceRange {
            min: estimate.price_range.min.max(floor),
            max: estimate.price_range.max.max(floor),
        };
        PriceEstimate {
            recommended_price,
            price_range,
            conversion_rate: self.conversion_rate(
                recommended_price,
                estimate.base_price,
                estimate.multipliers.engagement,
            ),
            ..estimate
        }
    }

    pub fn follower_multiplier(&self, follower_count: i64) -> f64 {
        let floor = self.config.followers.floor.max(1) as f64;
        let followers = (follower_count.max(0) as f64).max(floor);
        1.0 + (log10_safe(followers) - log10_safe(floor)) * self.config.followers.step
    }

    /// Only the range is held to the product band. A recommended price past
    /// the band edge is reported as computed.
    fn price_range(&self, recommended_price: f64, band: Option<PriceRange>) -> PriceRange {
        let min = (recommended_price * self.config.range.lower).round().max(0.0);
        let max = (recommended_price * self.config.range.upper).round();
        match band {
            Some(band) => PriceRange {
                min: band.clamp(min),
                max: band.clamp(max),
            },
            None => PriceRange { min, max },
        }
    }

    fn conversion_rate(&self, price: f64, base_price: f64, engagement_multiplier: f64) -> f64 {
        let config = &self.config.conversion;
        let rate = if price < base_price * config.discount_threshold {
            config.discount_rate
        } else if price > base_price * config.premium_threshold {
            config.premium_rate
        } else {
            config.base_rate
        };
        clamp01(rate * engagement_multiplier)
    }
}

fn weighted_multiplier(buckets: &Buckets, lookup: fn(&str) -> f64) -> f64 {
    if buckets.is_empty() {
        return 1.0;
    }
    buckets
        .iter()
        .map(|(label, weight)| lookup(label) * weight)
        .sum()
}
