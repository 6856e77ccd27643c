use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audience::DemographicDistribution;
use crate::error::{PricingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Linkedin,
    Tiktok,
    Pinterest,
    Threads,
}

impl Platform {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "instagram" | "ig" => Some(Platform::Instagram),
            "facebook" | "fb" => Some(Platform::Facebook),
            "linkedin" => Some(Platform::Linkedin),
            "tiktok" => Some(Platform::Tiktok),
            "pinterest" => Some(Platform::Pinterest),
            "threads" => Some(Platform::Threads),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Linkedin => "linkedin",
            Platform::Tiktok => "tiktok",
            Platform::Pinterest => "pinterest",
            Platform::Threads => "threads",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialAccountSnapshot {
    pub platform: Platform,
    pub follower_count: u64,
    #[serde(default)]
    pub demographics: DemographicDistribution,
    #[serde(default)]
    pub engagement_rate: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

impl SocialAccountSnapshot {
    pub fn new(platform: Platform, follower_count: u64) -> Self {
        Self {
            platform,
            follower_count,
            demographics: DemographicDistribution::default(),
            engagement_rate: None,
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn with_demographics(mut self, demographics: DemographicDistribution) -> Self {
        self.demographics = demographics;
        self
    }

    pub fn with_engagement_rate(mut self, rate: f64) -> Self {
        self.engagement_rate = Some(rate);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.engagement_rate {
            validate_engagement_rate(rate)?;
        }
        self.demographics.validate().map_err(|err| match err {
            PricingError::InvalidInput(message) => {
                PricingError::InvalidInput(format!("{}: {}", self.platform.label(), message))
            }
            other => other,
        })
    }
}

pub fn validate_engagement_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        return Err(PricingError::invalid_input(format!(
            "engagement rate must be within 0..1, got {}",
            rate
        )));
    }
    Ok(())
}

/// Account payload as it arrives from a platform integration, before
/// validation. Follower counts are signed so a negative value can be
/// rejected explicitly instead of failing to decode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshotInput {
    pub platform: String,
    pub follower_count: i64,
    #[serde(default)]
    pub demographics: DemographicDistribution,
    #[serde(default)]
    pub engagement_rate: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Demographic weights are 0-100 percentages instead of fractions.
    #[serde(default)]
    pub percentages: bool,
}

impl AccountSnapshotInput {
    pub fn into_snapshot(self, received_at: DateTime<Utc>) -> Result<SocialAccountSnapshot> {
        let platform = Platform::from_str(&self.platform).ok_or_else(|| {
            PricingError::invalid_input(format!("unknown platform: {}", self.platform))
        })?;
        let follower_count = u64::try_from(self.follower_count).map_err(|_| {
            PricingError::invalid_input(format!(
                "follower count must be non-negative, got {}",
                self.follower_count
            ))
        })?;
        let demographics = if self.percentages {
            self.demographics.percentages_to_fractions()
        } else {
            self.demographics
        };

        let snapshot = SocialAccountSnapshot {
            platform,
            follower_count,
            demographics,
            engagement_rate: self.engagement_rate,
            last_updated: self.last_updated.unwrap_or(received_at),
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

pub fn snapshots_from_inputs(
    inputs: Vec<AccountSnapshotInput>,
    received_at: DateTime<Utc>,
) -> Result<Vec<SocialAccountSnapshot>> {
    inputs
        .into_iter()
        .map(|input| input.into_snapshot(received_at))
        .collect()
}
