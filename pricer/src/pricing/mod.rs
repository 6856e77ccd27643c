pub mod calculator;
pub mod pipeline;
pub mod segments;
pub mod tables;

pub use calculator::{
    CalculatorConfig, ConfidenceConfig, ConfidenceFactors, ConversionConfig, EngagementConfig,
    FollowerConfig, Multipliers, PriceCalculator, PriceEstimate, RangeConfig,
};
pub use pipeline::{PricingAnalysis, PricingPipeline};
pub use segments::{SegmentConfig, SegmentGenerator};
