use camaudit_common::network::scope::Scope;
use camaudit_core::discovery::{DEFAULT_QUERY, DiscoveryError, ShodanSource, TargetSource};
use serde_json::json;

use crate::support::shodan::{API_KEY, FakeShodan};

fn pages() -> Vec<serde_json::Value> {
    vec![
        json!([
            { "ip_str": "203.0.113.5", "port": 80 },
            { "ip_str": "203.0.113.6", "port": 8000 },
            { "port": 81 },
        ]),
        json!([{ "ip_str": "203.0.113.7", "port": 443 }]),
    ]
}

#[tokio::test]
async fn walks_pages_until_empty() {
    let shodan = FakeShodan::start(pages(), 0).await;
    let scope = Scope::parse(["203.0.113.0/24"]).unwrap();
    let mut source = ShodanSource::new(API_KEY, DEFAULT_QUERY)
        .unwrap()
        .with_base_url(&shodan.base_url)
        .within(&scope);

    assert_eq!(source.total().await.unwrap(), 4);

    let first = source.next_page().await.unwrap().unwrap();
    let keys: Vec<String> = first.targets.iter().map(|t| t.key()).collect();
    assert_eq!(keys, ["203.0.113.5:80", "203.0.113.6:8000"]);
    assert_eq!(first.skipped, 1);

    let second = source.next_page().await.unwrap().unwrap();
    assert_eq!(second.targets[0].scheme(), "https");
    assert_eq!(second.skipped, 0);

    assert!(source.next_page().await.unwrap().is_none());
    assert!(source.next_page().await.unwrap().is_none());

    let requests = shodan.requests();
    // count + three search pages; the exhausted cursor does not ask again.
    assert_eq!(requests.len(), 4);
    for request in &requests {
        assert_eq!(request["query"], "Server: DNVRS-Webs net:203.0.113.0/24");
    }
    let page_numbers: Vec<&str> = requests[1..].iter().map(|r| r["page"].as_str()).collect();
    assert_eq!(page_numbers, ["1", "2", "3"]);
}

#[tokio::test]
async fn rejected_key_is_an_api_error() {
    let shodan = FakeShodan::start(pages(), 0).await;
    let mut source = ShodanSource::new("wrong", DEFAULT_QUERY)
        .unwrap()
        .with_base_url(&shodan.base_url);

    match source.total().await {
        Err(DiscoveryError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("expected an api error, got {other:?}"),
    }
}

#[tokio::test]
async fn transient_outage_is_retried() {
    let shodan = FakeShodan::start(pages(), 1).await;
    let mut source = ShodanSource::new(API_KEY, DEFAULT_QUERY)
        .unwrap()
        .with_base_url(&shodan.base_url);

    let first = source.next_page().await.unwrap().unwrap();
    assert_eq!(first.targets.len(), 2);
    assert_eq!(shodan.requests().len(), 2);
}
