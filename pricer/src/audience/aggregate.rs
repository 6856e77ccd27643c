use serde::{Deserialize, Serialize};

use crate::audience::distribution::normalize_buckets;
use crate::audience::{DemographicDistribution, Dimension, SocialAccountSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDemographics {
    pub total_followers: u64,
    pub demographics: DemographicDistribution,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Scale each account's buckets by its follower count before merging.
    /// Off by default: every account contributes equally.
    pub weight_by_followers: bool,
}

#[derive(Debug, Clone)]
pub struct DistributionNormalizer {
    config: AggregationConfig,
}

impl DistributionNormalizer {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    pub fn aggregate(&self, accounts: &[SocialAccountSnapshot]) -> AggregatedDemographics {
        let mut merged = DemographicDistribution::default();
        let mut total_followers = 0u64;

        for account in accounts {
            total_followers = total_followers.saturating_add(account.follower_count);
            let scale = if self.config.weight_by_followers {
                account.follower_count as f64
            } else {
                1.0
            };

            for dimension in Dimension::ALL {
                let target = merged.get_mut(dimension);
                for (label, weight) in account.demographics.get(dimension) {
                    *target.entry(label.clone()).or_insert(0.0) += weight * scale;
                }
            }
        }

        for dimension in Dimension::ALL {
            normalize_buckets(merged.get_mut(dimension));
        }

        AggregatedDemographics {
            total_followers,
            demographics: merged,
        }
    }
}

/// Follower-weighted engagement rate across the accounts that report one.
pub fn blended_engagement_rate(accounts: &[SocialAccountSnapshot]) -> Option<f64> {
    let reporting: Vec<(f64, f64)> = accounts
        .iter()
        .filter_map(|account| {
            account
                .engagement_rate
                .map(|rate| (rate, account.follower_count as f64))
        })
        .collect();

    if reporting.is_empty() {
        return None;
    }

    let followers: f64 = reporting.iter().map(|(_, followers)| followers).sum();
    if followers <= 0.0 {
        let sum: f64 = reporting.iter().map(|(rate, _)| rate).sum();
        return Some(sum / reporting.len() as f64);
    }

    let weighted: f64 = reporting.iter().map(|(rate, followers)| rate * followers).sum();
    Some(weighted / followers)
}
