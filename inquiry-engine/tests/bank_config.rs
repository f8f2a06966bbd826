mod common;

use common::{bank_config, MemoryPartnerRepository};
use inquiry_engine::{BankConfigCache, InquiryError};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn cache_over(repo: &Arc<MemoryPartnerRepository>) -> BankConfigCache {
    BankConfigCache::new(repo.clone(), "014")
}

#[tokio::test]
async fn reload_indexes_by_bank_code() {
    let repo = Arc::new(MemoryPartnerRepository::with(vec![
        bank_config("014", "BCA"),
        bank_config("002", "BRI"),
    ]));
    let cache = cache_over(&repo);

    assert_eq!(cache.reload().await.unwrap(), 2);
    assert_eq!(cache.lookup("002").bank_name, "BRI");
    assert_eq!(cache.lookup("014").bank_name, "BCA");
    assert_eq!(
        cache
            .loaded()
            .iter()
            .map(|c| c.bank_code.as_str())
            .collect::<Vec<_>>(),
        vec!["002", "014"]
    );
}

#[tokio::test]
async fn unknown_code_falls_back_to_default() {
    let repo = Arc::new(MemoryPartnerRepository::with(vec![
        bank_config("014", "BCA"),
        bank_config("002", "BRI"),
    ]));
    let cache = cache_over(&repo);
    cache.reload().await.unwrap();

    for code in ["009", "451", "", "022"] {
        let cfg = cache.lookup(code);
        assert_eq!(cfg.bank_code, "014", "code {:?}", code);
        assert_eq!(cfg.bank_name, "BCA");
    }
}

#[tokio::test]
async fn missing_default_yields_empty_default_config() {
    let repo = Arc::new(MemoryPartnerRepository::with(vec![bank_config("002", "BRI")]));
    let cache = cache_over(&repo);
    cache.reload().await.unwrap();

    let cfg = cache.lookup("009");
    assert_eq!(cfg.bank_code, "014");
    assert!(cfg.bank_name.is_empty());
}

#[tokio::test]
async fn empty_partner_list_is_not_an_error() {
    let repo = Arc::new(MemoryPartnerRepository::default());
    let cache = cache_over(&repo);

    assert_eq!(cache.reload().await.unwrap(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn failed_reload_keeps_previous_map() {
    let repo = Arc::new(MemoryPartnerRepository::with(vec![bank_config("014", "BCA")]));
    let cache = cache_over(&repo);
    cache.reload().await.unwrap();

    repo.fail.store(true, Ordering::SeqCst);
    let err = cache.reload().await.unwrap_err();

    assert!(matches!(err, InquiryError::ConfigLoad(_)));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.lookup("014").bank_name, "BCA");
}

#[tokio::test]
async fn reload_replaces_whole_map() {
    let repo = Arc::new(MemoryPartnerRepository::with(vec![
        bank_config("014", "BCA"),
        bank_config("022", "CIMB"),
    ]));
    let cache = cache_over(&repo);
    cache.reload().await.unwrap();
    assert_eq!(cache.lookup("022").bank_name, "CIMB");

    *repo.configs.lock() = vec![bank_config("014", "BCA")];
    cache.reload().await.unwrap();

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.lookup("022").bank_name, "BCA");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_readers_during_reload() {
    let repo = Arc::new(MemoryPartnerRepository::with(vec![
        bank_config("014", "BCA"),
        bank_config("002", "BRI"),
    ]));
    let cache = Arc::new(cache_over(&repo));
    cache.reload().await.unwrap();

    let mut readers = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..500 {
                let cfg = cache.lookup("002");
                assert!(cfg.bank_name == "BRI" || cfg.bank_name == "BCA");
            }
        }));
    }

    for _ in 0..20 {
        cache.reload().await.unwrap();
    }

    for reader in readers {
        reader.await.unwrap();
    }
}
