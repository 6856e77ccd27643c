pub mod audience;
pub mod config;
pub mod error;
pub mod pricing;
pub mod storage;

use serde::{Deserialize, Serialize};

use crate::audience::{DemographicDistribution, SocialAccountSnapshot};
use crate::config::PricingConfig;
use crate::pricing::PricingPipeline;

pub use crate::error::{PricingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    DigitalProduct,
    PhysicalProduct,
    Membership,
    Service,
    AffiliateProduct,
    Course,
    Ebook,
    Coaching,
    Template,
}

impl ProductType {
    pub const ALL: [ProductType; 9] = [
        ProductType::DigitalProduct,
        ProductType::PhysicalProduct,
        ProductType::Membership,
        ProductType::Service,
        ProductType::AffiliateProduct,
        ProductType::Course,
        ProductType::Ebook,
        ProductType::Coaching,
        ProductType::Template,
    ];

    /// Accepts `digital_product`, `digital-product`, `Digital Product` and a
    /// few short aliases.
    pub fn parse(value: &str) -> Option<Self> {
        let key = value
            .trim()
            .to_lowercase()
            .replace(['-', ' '], "_");
        match key.as_str() {
            "digital_product" | "digital" => Some(ProductType::DigitalProduct),
            "physical_product" | "physical" => Some(ProductType::PhysicalProduct),
            "membership" | "subscription" => Some(ProductType::Membership),
            "service" => Some(ProductType::Service),
            "affiliate_product" | "affiliate" => Some(ProductType::AffiliateProduct),
            "course" => Some(ProductType::Course),
            "ebook" | "e_book" => Some(ProductType::Ebook),
            "coaching" => Some(ProductType::Coaching),
            "template" => Some(ProductType::Template),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductType::DigitalProduct => "digital_product",
            ProductType::PhysicalProduct => "physical_product",
            ProductType::Membership => "membership",
            ProductType::Service => "service",
            ProductType::AffiliateProduct => "affiliate_product",
            ProductType::Course => "course",
            ProductType::Ebook => "ebook",
            ProductType::Coaching => "coaching",
            ProductType::Template => "template",
        }
    }

    pub fn base_price(self) -> f64 {
        match self {
            ProductType::DigitalProduct => 47.0,
            ProductType::PhysicalProduct => 35.0,
            ProductType::Membership => 19.0,
            ProductType::Service => 150.0,
            ProductType::AffiliateProduct => 25.0,
            ProductType::Course => 97.0,
            ProductType::Ebook => 27.0,
            ProductType::Coaching => 200.0,
            ProductType::Template => 19.0,
        }
    }

    /// Absolute price band for the product type. Affiliate prices are set by
    /// the merchant, so they carry no band.
    pub fn price_band(self) -> Option<PriceRange> {
        let (min, max) = match self {
            ProductType::DigitalProduct => (5.0, 997.0),
            ProductType::PhysicalProduct => (5.0, 500.0),
            ProductType::Membership => (5.0, 199.0),
            ProductType::Service => (25.0, 5_000.0),
            ProductType::AffiliateProduct => return None,
            ProductType::Course => (19.0, 1_997.0),
            ProductType::Ebook => (7.0, 99.0),
            ProductType::Coaching => (50.0, 5_000.0),
            ProductType::Template => (5.0, 199.0),
        };
        Some(PriceRange { min, max })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Kept as the raw key so unknown types surface as
    /// [`PricingError::InvalidProductType`] instead of a decode error.
    pub product_type: String,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub target_margin: Option<f64>,
    /// Platforms to include. Empty means every connected account.
    #[serde(default)]
    pub platforms: Vec<audience::Platform>,
}

impl PricingRequest {
    pub fn new(name: impl Into<String>, product_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            product_type: product_type.into(),
            cost: None,
            target_margin: None,
            platforms: Vec::new(),
        }
    }

    /// Lowest price that still covers `cost` at `target_margin`.
    pub fn price_floor(&self) -> Result<Option<f64>> {
        let margin = self.target_margin.unwrap_or(0.0);
        if !margin.is_finite() || !(0.0..1.0).contains(&margin) {
            return Err(PricingError::invalid_input(format!(
                "target margin must be within 0..1, got {}",
                margin
            )));
        }
        let Some(cost) = self.cost else {
            return Ok(None);
        };
        if !cost.is_finite() || cost < 0.0 {
            return Err(PricingError::invalid_input(format!(
                "cost must be non-negative, got {}",
                cost
            )));
        }
        let floor = (cost / (1.0 - margin)).ceil();
        if !floor.is_finite() {
            return Err(PricingError::invalid_input(format!(
                "cost {} at margin {} does not yield a finite price",
                cost, margin
            )));
        }
        Ok(Some(floor))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn clamp(self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub amount: f64,
    pub conversion_rate: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub name: String,
    pub description: String,
    pub demographic_target: DemographicDistribution,
    pub recommended_prices: Vec<PricePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallRecommendation {
    pub min_price: f64,
    pub max_price: f64,
    pub optimal_price: f64,
    pub conversion_rate: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRecommendation {
    pub overall_recommendation: OverallRecommendation,
    pub segments: Vec<Segment>,
}

/// Prices `request` with the built-in defaults. Reads no files or
/// environment; use [`recommend_with_config`] for a loaded configuration.
pub fn recommend(
    request: &PricingRequest,
    accounts: &[SocialAccountSnapshot],
) -> Result<PricingRecommendation> {
    recommend_with_config(request, accounts, &PricingConfig::default())
}

pub fn recommend_with_config(
    request: &PricingRequest,
    accounts: &[SocialAccountSnapshot],
    config: &PricingConfig,
) -> Result<PricingRecommendation> {
    PricingPipeline::from_config(config).recommend(request, accounts)
}

/// Stable hex digest of a request and the accounts it was priced against.
/// Identical inputs always produce the same fingerprint.
pub fn input_fingerprint(request: &PricingRequest, accounts: &[SocialAccountSnapshot]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(request).unwrap_or_default());
    for account in accounts {
        hasher.update(serde_json::to_vec(account).unwrap_or_default());
    }
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    format!("{:016x}", u64::from_be_bytes(bytes))
}

pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

pub(crate) fn log10_safe(value: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else {
        value.log10()
    }
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_price(value: f64) -> String {
    format!("${}", format_number(value))
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
