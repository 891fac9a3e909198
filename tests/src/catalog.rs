use camaudit_common::models::device::{ChannelSource, Credential, DeviceRecord, VideoChannel};
use camaudit_common::network::target::Target;
use camaudit_core::catalog::{self, Catalog, CatalogError, NotionCatalog, SyncStatus, SyncSummary};

use crate::support::notion::{DATABASE_ID, FakeNotion, TOKEN};

fn record(address: &str, port: u16) -> DeviceRecord {
    let mut record = DeviceRecord::new(Target::new(address, port), Credential::new("admin", "12345"));
    record.channels.push(VideoChannel {
        id: Some("1".into()),
        name: Some("Gate".into()),
        resolution: Some("1920*1080P".into()),
        source: ChannelSource::Direct,
    });
    record
}

fn notion(fake: &FakeNotion) -> NotionCatalog {
    NotionCatalog::new(TOKEN, DATABASE_ID)
        .unwrap()
        .with_base_url(&fake.base_url)
}

#[tokio::test]
async fn known_entries_follow_cursors() {
    let fake = FakeNotion::start(&["203.0.113.5:80", "203.0.113.6:8000", "203.0.113.7:443"]).await;

    let known = notion(&fake).known_entries().await.unwrap();

    assert_eq!(known.len(), 3);
    assert!(known.contains("203.0.113.6:8000"));
}

#[tokio::test]
async fn resync_writes_nothing_new() {
    let fake = FakeNotion::start(&[]).await;
    let catalog = notion(&fake);
    let records = [record("203.0.113.5", 80), record("203.0.113.6", 8000)];

    let first = catalog::synchronize(&catalog, &records, |_, _| {}).await.unwrap();
    let second = catalog::synchronize(&catalog, &records, |_, _| {}).await.unwrap();

    assert_eq!(first, SyncSummary { added: 2, known: 0, failed: 0 });
    assert_eq!(second, SyncSummary { added: 0, known: 2, failed: 0 });
    assert_eq!(fake.created().len(), 2);
    assert_eq!(fake.rows(), ["203.0.113.5:80", "203.0.113.6:8000"]);
}

#[tokio::test]
async fn already_known_row_is_not_written() {
    let fake = FakeNotion::start(&["203.0.113.5:80"]).await;
    let records = [record("203.0.113.5", 80)];

    let mut statuses = Vec::new();
    let summary = catalog::synchronize(&notion(&fake), &records, |r, s| {
        statuses.push((r.key(), matches!(s, SyncStatus::AlreadyKnown)));
    })
    .await
    .unwrap();

    assert_eq!(summary.added, 0);
    assert_eq!(statuses, [("203.0.113.5:80".to_string(), true)]);
    assert!(fake.created().is_empty());
}

#[tokio::test]
async fn created_page_carries_counts_and_document() {
    let fake = FakeNotion::start(&[]).await;

    notion(&fake).insert(&record("203.0.113.5", 80)).await.unwrap();

    let created = fake.created();
    let properties = &created[0]["properties"];
    assert_eq!(properties["Cameras"]["number"], 1);
    assert_eq!(properties["Users"]["number"], 0);
    assert_eq!(properties["Address"]["url"], "http://203.0.113.5:80/");

    let code = created[0]["children"][0]["code"]["rich_text"][0]["text"]["content"]
        .as_str()
        .unwrap();
    let document: serde_json::Value = serde_json::from_str(code).unwrap();
    assert_eq!(document["credentials"]["password"], "12345");
    assert_eq!(document["cameras"][0]["name"], "Gate");
}

#[tokio::test]
async fn bad_token_fails_before_any_write() {
    let fake = FakeNotion::start(&[]).await;
    let catalog = NotionCatalog::new("nope", DATABASE_ID)
        .unwrap()
        .with_base_url(&fake.base_url);

    let result = catalog::synchronize(&catalog, &[record("203.0.113.5", 80)], |_, _| {}).await;

    assert!(matches!(result, Err(CatalogError::Api { status: 401, .. })));
    assert!(fake.created().is_empty());
}
