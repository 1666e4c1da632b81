//! Tests for the JSON Lines state store

use chrono::{Duration as ChronoDuration, Utc};
use tempfile::TempDir;
use tokio::fs;

use shared::{LastMirrorRecord, LastNewsRecord, NewsItem, PostId};

use crate::error::CuratorError;
use crate::services::state_store::RealStateStore;
use crate::traits::StateStore;

async fn setup_store() -> (TempDir, RealStateStore) {
    let dir = TempDir::new().unwrap();
    let store = RealStateStore::open(dir.path().join("state")).await.unwrap();
    (dir, store)
}

fn news_record(title: &str, url: &str) -> LastNewsRecord {
    LastNewsRecord::new(&NewsItem {
        title: title.to_string(),
        url: url.to_string(),
    })
}

#[tokio::test]
async fn test_empty_store_has_no_records() {
    let (_dir, store) = setup_store().await;
    assert!(store.latest_news().await.unwrap().is_none());
    assert!(store.latest_mirror().await.unwrap().is_none());
}

#[tokio::test]
async fn test_open_creates_directory() {
    let (dir, store) = setup_store().await;
    assert!(dir.path().join("state").is_dir());
    assert_eq!(store.dir(), dir.path().join("state"));
}

#[tokio::test]
async fn test_latest_news_is_most_recent_append() {
    let (_dir, store) = setup_store().await;
    store.append_news(news_record("first", "https://a.test/1")).await.unwrap();
    store.append_news(news_record("second", "https://a.test/2")).await.unwrap();

    let latest = store.latest_news().await.unwrap().unwrap();
    assert_eq!(latest.title, "second");
}

#[tokio::test]
async fn test_latest_is_by_created_at_not_file_order() {
    let (_dir, store) = setup_store().await;
    let mut newer = news_record("newer", "https://a.test/n");
    let mut older = news_record("older", "https://a.test/o");
    newer.created_at = Utc::now();
    older.created_at = newer.created_at - ChronoDuration::minutes(5);

    store.append_news(newer).await.unwrap();
    store.append_news(older).await.unwrap();

    assert_eq!(store.latest_news().await.unwrap().unwrap().title, "newer");
}

#[tokio::test]
async fn test_records_persist_across_reopen() {
    let (dir, store) = setup_store().await;
    store.append_mirror(LastMirrorRecord::new(PostId::from("77"))).await.unwrap();
    drop(store);

    let reopened = RealStateStore::open(dir.path().join("state")).await.unwrap();
    assert_eq!(
        reopened.latest_mirror().await.unwrap().unwrap().post_id,
        PostId::from("77")
    );
}

#[tokio::test]
async fn test_files_are_json_lines() {
    let (dir, store) = setup_store().await;
    store.append_news(news_record("a", "u1")).await.unwrap();
    store.append_news(news_record("b", "u2")).await.unwrap();

    let content = fs::read_to_string(dir.path().join("state").join("news.jsonl")).await.unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        serde_json::from_str::<LastNewsRecord>(line).unwrap();
    }
}

#[tokio::test]
async fn test_blank_and_corrupt_lines_are_skipped() {
    let (dir, store) = setup_store().await;
    store.append_mirror(LastMirrorRecord::new(PostId::from("1"))).await.unwrap();

    let path = dir.path().join("state").join("mirrors.jsonl");
    let mut content = fs::read_to_string(&path).await.unwrap();
    content.push_str("\n\n{truncated\n");
    fs::write(&path, content).await.unwrap();

    let latest = store.latest_mirror().await.unwrap().unwrap();
    assert_eq!(latest.post_id, PostId::from("1"));
}

#[tokio::test]
async fn test_closed_store_rejects_operations() {
    let (_dir, store) = setup_store().await;
    store.close().await.unwrap();

    assert!(matches!(
        store.latest_news().await,
        Err(CuratorError::PersistError { .. })
    ));
    assert!(matches!(
        store.append_mirror(LastMirrorRecord::new(PostId::from("1"))).await,
        Err(CuratorError::PersistError { .. })
    ));
}

#[tokio::test]
async fn test_file_is_scanned_once_then_tracked_in_memory() {
    let (dir, store) = setup_store().await;
    assert!(store.latest_news().await.unwrap().is_none());

    store.append_news(news_record("kept", "https://a.test/k")).await.unwrap();

    // Later reads come from memory, not from the file
    let path = dir.path().join("state").join("news.jsonl");
    fs::write(&path, "{garbage\n").await.unwrap();

    assert_eq!(store.latest_news().await.unwrap().unwrap().title, "kept");
}

#[tokio::test]
async fn test_older_append_after_read_does_not_replace_latest() {
    let (_dir, store) = setup_store().await;
    let mut newer = news_record("newer", "https://a.test/n");
    newer.created_at = Utc::now();
    let mut older = news_record("older", "https://a.test/o");
    older.created_at = newer.created_at - ChronoDuration::minutes(5);

    store.append_news(newer).await.unwrap();
    assert_eq!(store.latest_news().await.unwrap().unwrap().title, "newer");

    store.append_news(older).await.unwrap();
    assert_eq!(store.latest_news().await.unwrap().unwrap().title, "newer");

    let reopened = RealStateStore::open(store.dir().to_path_buf()).await.unwrap();
    assert_eq!(reopened.latest_news().await.unwrap().unwrap().title, "newer");
}
