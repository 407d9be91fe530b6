//! Smoke tests against the real API. Run with
//! `LINKUP_API_KEY=... cargo test -p linkup-sdk --test live -- --ignored`.

mod common;

use linkup_sdk::schema::generate_json_schema;
use linkup_sdk::{FetchOptions, LinkupClient, SearchDepth, SearchOptions};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
struct LakeComo {
    /// Castles to visit on Lake Como
    castles: Vec<String>,
    /// Cities to visit on Lake Como
    cities: Vec<String>,
}

fn live_client() -> LinkupClient {
    common::init_test_tracing();
    LinkupClient::new(None).expect("LINKUP_API_KEY must be set for live tests")
}

#[tokio::test]
#[ignore = "hits the live API"]
async fn live_search_results() {
    let out = live_client()
        .get_search_results("Lake Como", SearchDepth::Standard, None)
        .await
        .unwrap();
    assert!(!out.is_empty());
}

#[tokio::test]
#[ignore = "hits the live API"]
async fn live_sourced_answer() {
    let opts = SearchOptions {
        include_inline_citations: true,
        ..Default::default()
    };
    let answer = live_client()
        .get_sourced_answer("What is Lake Como famous for?", SearchDepth::Standard, Some(&opts))
        .await
        .unwrap();
    assert!(!answer.answer.is_empty());
}

#[tokio::test]
#[ignore = "hits the live API"]
async fn live_structured_with_and_without_sources() {
    let client = live_client();
    let schema = generate_json_schema::<LakeComo>().unwrap();

    let raw = client
        .get_structured_results("Places to visit on Lake Como", SearchDepth::Standard, &schema, None)
        .await
        .unwrap();
    let lake: LakeComo = raw.decode_into().unwrap();
    assert!(!lake.cities.is_empty() || !lake.castles.is_empty());

    let opts = SearchOptions {
        include_sources: true,
        ..Default::default()
    };
    let sourced = client
        .get_structured_results("Places to visit on Lake Como", SearchDepth::Standard, &schema, Some(&opts))
        .await
        .unwrap();
    assert!(sourced.sourced_output().is_some());
}

#[tokio::test]
#[ignore = "hits the live API"]
async fn live_balance_and_fetch() {
    let client = live_client();
    assert!(client.get_balance().await.unwrap() >= 0.0);

    let opts = FetchOptions {
        extract_images: true,
        ..Default::default()
    };
    let page = client.fetch("https://example.com", Some(&opts)).await.unwrap();
    assert!(!page.markdown.is_empty());
}
