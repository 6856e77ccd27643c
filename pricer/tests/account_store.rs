use socioprice::audience::{
    AccountStore, DemographicDistribution, Dimension, Platform, SocialAccountSnapshot,
};
use socioprice::config::PricingConfig;
use socioprice::{recommend_with_config, PricingError, PricingRequest};

fn snapshot(platform: Platform, followers: u64) -> SocialAccountSnapshot {
    SocialAccountSnapshot::new(platform, followers)
}

#[tokio::test]
async fn upsert_replaces_snapshot_for_same_platform() {
    let dir = tempfile::tempdir().unwrap();
    let store = AccountStore::load(dir.path().join("accounts.json")).await.unwrap();

    store.upsert("creator", snapshot(Platform::Tiktok, 100)).await.unwrap();
    store.upsert("creator", snapshot(Platform::Instagram, 200)).await.unwrap();
    let accounts = store
        .upsert("creator", snapshot(Platform::Tiktok, 900))
        .await
        .unwrap();

    let summary: Vec<(Platform, u64)> = accounts
        .iter()
        .map(|account| (account.platform, account.follower_count))
        .collect();
    assert_eq!(summary, vec![(Platform::Instagram, 200), (Platform::Tiktok, 900)]);
    assert_eq!(store.users().await, vec!["creator".to_string()]);
}

#[tokio::test]
async fn accounts_persist_across_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/accounts.json");
    let demographics =
        DemographicDistribution::default().with_bucket(Dimension::Location, "Japan", 1.0);
    {
        let store = AccountStore::load(path.clone()).await.unwrap();
        store
            .upsert(
                "creator",
                snapshot(Platform::Pinterest, 4_000).with_demographics(demographics.clone()),
            )
            .await
            .unwrap();
    }

    let store = AccountStore::load(path).await.unwrap();
    let accounts = store.accounts("creator").await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].demographics, demographics);
}

#[tokio::test]
async fn remove_reports_whether_anything_was_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let store = AccountStore::load(dir.path().join("accounts.json")).await.unwrap();
    store.upsert("creator", snapshot(Platform::Facebook, 10)).await.unwrap();

    assert!(!store.remove("creator", Platform::Threads).await.unwrap());
    assert!(store.remove("creator", Platform::Facebook).await.unwrap());
    assert!(store.accounts("creator").await.is_empty());
    assert!(store.users().await.is_empty());
    assert!(!store.remove("nobody", Platform::Facebook).await.unwrap());
}

#[tokio::test]
async fn invalid_snapshot_is_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = AccountStore::load(dir.path().join("accounts.json")).await.unwrap();

    let err = store
        .upsert("creator", snapshot(Platform::Linkedin, 10).with_engagement_rate(2.0))
        .await
        .unwrap_err();
    assert!(matches!(err, PricingError::InvalidInput(_)));
    assert!(store.accounts("creator").await.is_empty());
}

#[tokio::test]
async fn corrupt_file_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.json");
    std::fs::write(&path, "{ not json").unwrap();

    match AccountStore::load(path).await {
        Err(PricingError::Storage(_)) => {}
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("corrupt store loaded"),
    }
}

#[tokio::test]
async fn stored_accounts_price_like_inline_accounts() {
    let dir = tempfile::tempdir().unwrap();
    let store = AccountStore::load(dir.path().join("accounts.json")).await.unwrap();
    let inline = vec![
        snapshot(Platform::Instagram, 8_000).with_engagement_rate(0.05),
        snapshot(Platform::Linkedin, 2_000),
    ];
    for account in &inline {
        store.upsert("creator", account.clone()).await.unwrap();
    }

    let request = PricingRequest::new("Coaching call", "coaching");
    let config = PricingConfig::default();
    let stored = store.accounts("creator").await;
    let from_store = recommend_with_config(&request, &stored, &config).unwrap();
    let from_inline = recommend_with_config(&request, &inline, &config).unwrap();
    assert_eq!(from_store, from_inline);
}

#[tokio::test]
async fn failed_write_keeps_previous_accounts() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let store = AccountStore::load(blocker.join("accounts.json")).await.unwrap();

    let err = store
        .upsert("creator", snapshot(Platform::Instagram, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, PricingError::Storage(_)));
    assert!(store.accounts("creator").await.is_empty());
    assert!(store.users().await.is_empty());
}

#[tokio::test]
async fn failed_remove_keeps_the_account() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store = AccountStore::load(data_dir.join("accounts.json")).await.unwrap();
    store.upsert("creator", snapshot(Platform::Facebook, 10)).await.unwrap();

    std::fs::remove_dir_all(&data_dir).unwrap();
    std::fs::write(&data_dir, "not a directory").unwrap();

    assert!(store.remove("creator", Platform::Facebook).await.is_err());
    assert_eq!(store.accounts("creator").await.len(), 1);
}
