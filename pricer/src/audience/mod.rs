pub mod aggregate;
pub mod distribution;
pub mod snapshot;
pub mod store;

pub use aggregate::{
    blended_engagement_rate, AggregatedDemographics, AggregationConfig, DistributionNormalizer,
};
pub use distribution::{age_lower_bound, Buckets, DemographicDistribution, Dimension};
pub use snapshot::{snapshots_from_inputs, AccountSnapshotInput, Platform, SocialAccountSnapshot};
pub use store::AccountStore;

/// Keeps the accounts on the requested platforms. An empty filter keeps all.
pub fn select_platforms(
    accounts: &[SocialAccountSnapshot],
    platforms: &[Platform],
) -> Vec<SocialAccountSnapshot> {
    accounts
        .iter()
        .filter(|account| platforms.is_empty() || platforms.contains(&account.platform))
        .cloned()
        .collect()
}
