use std::{fs, sync::Arc};

use qobuzdl::errors::LedgerError;
use qobuzdl::management::{DownloadLedger, LedgerManager};
use qobuzdl::types::LedgerEntry;

#[tokio::test]
async fn test_ledger_starts_empty_and_creates_parents() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("deep").join("dir").join("downloads.json");

    let ledger = LedgerManager::open(path.clone()).await.unwrap();

    assert_eq!(ledger.count().await, 0);
    assert!(!ledger.contains("abc123").await.unwrap());
    assert!(path.parent().unwrap().is_dir());
    assert_eq!(ledger.path(), &path);
}

#[tokio::test]
async fn test_ledger_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("downloads.json");

    let ledger = LedgerManager::open(path.clone()).await.unwrap();
    ledger.insert("abc123").await.unwrap();
    ledger.insert("abc123").await.unwrap();
    ledger.insert("42").await.unwrap();
    assert_eq!(ledger.count().await, 2);

    let reopened = LedgerManager::open(path.clone()).await.unwrap();
    assert!(reopened.contains("abc123").await.unwrap());
    assert!(reopened.contains("42").await.unwrap());
    assert!(!reopened.contains("43").await.unwrap());

    let entries: Vec<LedgerEntry> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| !e.downloaded_at.is_empty()));
    assert!(!tmp.path().join("downloads.json.tmp").exists());
}

#[tokio::test]
async fn test_empty_file_is_an_empty_ledger() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("downloads.json");
    fs::write(&path, "  \n").unwrap();

    let ledger = LedgerManager::open(path).await.unwrap();
    assert_eq!(ledger.count().await, 0);
}

#[tokio::test]
async fn test_corrupt_file_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("downloads.json");
    fs::write(&path, "{ not json").unwrap();

    let result = LedgerManager::open(path).await;
    assert!(matches!(result, Err(LedgerError::Corrupt(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("downloads.json");
    let ledger = Arc::new(LedgerManager::open(path.clone()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..20 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger.insert(&format!("id{}", i)).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let reopened = LedgerManager::open(path).await.unwrap();
    assert_eq!(reopened.count().await, 20);
}

#[tokio::test]
async fn test_failed_write_leaves_id_unrecorded() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("downloads.json");
    let ledger = LedgerManager::open(path.clone()).await.unwrap();
    ledger.insert("kept").await.unwrap();

    // a directory in place of the temporary file makes every write fail
    let blocker = tmp.path().join("downloads.json.tmp");
    fs::create_dir(&blocker).unwrap();

    assert!(ledger.insert("abc").await.is_err());
    assert!(!ledger.contains("abc").await.unwrap());
    assert!(ledger.contains("kept").await.unwrap());
    assert_eq!(ledger.count().await, 1);

    let reopened = LedgerManager::open(path.clone()).await.unwrap();
    assert!(!reopened.contains("abc").await.unwrap());

    // once writes work again the same id can be recorded
    fs::remove_dir(&blocker).unwrap();
    ledger.insert("abc").await.unwrap();
    assert!(LedgerManager::open(path).await.unwrap().contains("abc").await.unwrap());
}
