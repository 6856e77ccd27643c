use serde::Serialize;
use tracing::debug;

use crate::audience::{
    blended_engagement_rate, select_platforms, AggregatedDemographics, DistributionNormalizer,
    SocialAccountSnapshot,
};
use crate::config::PricingConfig;
use crate::error::Result;
use crate::pricing::{PriceCalculator, PriceEstimate, SegmentGenerator};
use crate::{OverallRecommendation, PricingRecommendation, PricingRequest};

/// Everything computed for one request, for callers that want to show the
/// intermediate numbers alongside the recommendation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingAnalysis {
    pub aggregated: AggregatedDemographics,
    pub engagement_rate: Option<f64>,
    pub accounts_used: usize,
    pub estimate: PriceEstimate,
    pub recommendation: PricingRecommendation,
}

#[derive(Debug, Clone)]
pub struct PricingPipeline {
    normalizer: DistributionNormalizer,
    calculator: PriceCalculator,
    segments: SegmentGenerator,
}

impl PricingPipeline {
    pub fn new(
        normalizer: DistributionNormalizer,
        calculator: PriceCalculator,
        segments: SegmentGenerator,
    ) -> Self {
        Self {
            normalizer,
            calculator,
            segments,
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(
            DistributionNormalizer::new(config.aggregation.clone()),
            PriceCalculator::new(config.calculator()),
            SegmentGenerator::new(config.segments.clone()),
        )
    }

    pub fn aggregate(&self, accounts: &[SocialAccountSnapshot]) -> Result<AggregatedDemographics> {
        for account in accounts {
            account.validate()?;
        }
        Ok(self.normalizer.aggregate(accounts))
    }

    pub fn recommend(
        &self,
        request: &PricingRequest,
        accounts: &[SocialAccountSnapshot],
    ) -> Result<PricingRecommendation> {
        self.analyze(request, accounts)
            .map(|analysis| analysis.recommendation)
    }

    pub fn analyze(
        &self,
        request: &PricingRequest,
        accounts: &[SocialAccountSnapshot],
    ) -> Result<PricingAnalysis> {
        let floor = request.price_floor()?;
        let selected = select_platforms(accounts, &request.platforms);
        let aggregated = self.aggregate(&selected)?;
        let engagement_rate = blended_engagement_rate(&selected);
        let follower_count = i64::try_from(aggregated.total_followers).unwrap_or(i64::MAX);

        let mut estimate = self.calculator.recommend_price(
            &request.product_type,
            &aggregated,
            follower_count,
            engagement_rate,
        )?;
        if let Some(floor) = floor {
            estimate = self.calculator.apply_floor(estimate, floor);
        }

        let segments = self
            .segments
            .generate(&aggregated, estimate.recommended_price);

        debug!(
            product = %request.name,
            accounts = selected.len(),
            followers = aggregated.total_followers,
            optimal_price = estimate.recommended_price,
            segments = segments.len(),
            "built pricing recommendation"
        );

        let recommendation = PricingRecommendation {
            overall_recommendation: OverallRecommendation {
                min_price: estimate.price_range.min,
                max_price: estimate.price_range.max,
                optimal_price: estimate.recommended_price,
                conversion_rate: estimate.conversion_rate,
                confidence: estimate.confidence,
            },
            segments,
        };

        Ok(PricingAnalysis {
            aggregated,
            engagement_rate,
            accounts_used: selected.len(),
            estimate,
            recommendation,
        })
    }
}
