mod common;

use common::{BrokenTransport, FixedTransport, MockTransport, client_with};
use linkup_sdk::decode::{decode, decode_from_sourced_data};
use linkup_sdk::schema::generate_json_schema;
use linkup_sdk::{
    FetchOptions, LinkupError, OutputType, SearchDepth, SearchOptions, SearchOutput, SearchQuery,
    StructuredOutput,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const RATE_LIMITED: &str = "response returned a status code of 429: 429 Too Many Requests";

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
struct MockStructured {
    title: String,
    summary: String,
}

fn expected_structured() -> MockStructured {
    MockStructured {
        title: "hello".into(),
        summary: "lorem ipsum dolor".into(),
    }
}

// ---------- search results ----------

#[tokio::test]
async fn search_results_text_only() {
    let client = client_with(MockTransport::healthy());
    let output = client
        .get_search_results("lake", SearchDepth::Standard, None)
        .await
        .unwrap();

    assert_eq!(output.text_results.len(), 1);
    assert!(output.image_results.is_empty());
    let result = &output.text_results[0];
    assert_eq!(result.content, "This is a lake");
    assert_eq!(result.favicon, "");
    assert_eq!(result.name, "lake");
    assert_eq!(result.url, "https://thisisalake.com");
}

#[tokio::test]
async fn search_results_with_images() {
    let client = client_with(MockTransport::healthy());
    let opts = SearchOptions {
        include_images: true,
        ..Default::default()
    };
    let output = client
        .get_search_results("lake", SearchDepth::Standard, Some(&opts))
        .await
        .unwrap();

    assert_eq!(output.text_results.len(), 1);
    assert_eq!(output.image_results.len(), 1);
    assert_eq!(output.image_results[0].name, "lake");
    assert_eq!(output.image_results[0].url, "https://image.lake.com");
}

#[tokio::test]
async fn search_results_partition_preserves_order() {
    let body = json!({"results": [
        {"type": "image", "name": "i1", "url": "https://i1"},
        {"type": "text", "name": "t1", "content": "one", "url": "https://t1", "favicon": ""},
        {"type": "image", "name": "i2", "url": "https://i2"},
        {"type": "text", "name": "t2", "content": "two", "url": "https://t2", "favicon": ""},
        {"type": "text", "name": "t3", "content": "three", "url": "https://t3", "favicon": ""}
    ]});
    let client = client_with(FixedTransport::ok(body.to_string()));
    let output = client
        .get_search_results("q", SearchDepth::Deep, None)
        .await
        .unwrap();

    let texts: Vec<_> = output.text_results.iter().map(|r| r.name.as_str()).collect();
    let images: Vec<_> = output.image_results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(texts, ["t1", "t2", "t3"]);
    assert_eq!(images, ["i1", "i2"]);
}

#[tokio::test]
async fn search_results_with_only_unclassifiable_items_fail() {
    let body = json!({"results": [42, {"type": "image"}, {"type": "text", "name": "x"}]});
    let client = client_with(FixedTransport::ok(body.to_string()));
    let err = client
        .get_search_results("q", SearchDepth::Standard, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkupError::NoValidResults));
}

#[tokio::test]
async fn search_results_empty_payload_fails() {
    for body in [r#"{"results": []}"#, "{}"] {
        let client = client_with(FixedTransport::ok(body));
        let err = client
            .get_search_results("q", SearchDepth::Standard, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LinkupError::NoValidResults), "body {body}");
    }
}

#[tokio::test]
async fn search_results_malformed_body_is_a_decode_error() {
    let client = client_with(FixedTransport::ok("<html>oops</html>"));
    let err = client
        .get_search_results("q", SearchDepth::Standard, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkupError::Decode(_)));
}

#[tokio::test]
async fn search_results_rate_limited() {
    let client = client_with(MockTransport::failing());
    let opts = SearchOptions {
        include_images: true,
        ..Default::default()
    };
    let err = client
        .get_search_results("lake", SearchDepth::Standard, Some(&opts))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkupError::Status { code: 429, .. }));
    assert_eq!(err.to_string(), RATE_LIMITED);
}

// ---------- structured ----------

#[tokio::test]
async fn structured_without_sources_keeps_raw_json() {
    let mock = Arc::new(MockTransport::healthy());
    let client = client_with(mock.clone());
    let schema = generate_json_schema::<MockStructured>().unwrap();

    let output = client
        .get_structured_results("summary", SearchDepth::Standard, &schema, None)
        .await
        .unwrap();

    let raw = output.raw_json().expect("raw json populated");
    assert!(output.sourced_output().is_none());
    assert_eq!(decode::<MockStructured>(raw).unwrap(), expected_structured());

    let sent = mock.searches.lock().unwrap();
    assert_eq!(sent[0].output_type, OutputType::Structured);
    assert_eq!(sent[0].structured_output_schema.as_ref(), Some(&schema));
    assert!(!sent[0].include_sources);
}

#[tokio::test]
async fn structured_with_sources_parses_envelope() {
    let client = client_with(MockTransport::healthy());
    let schema = generate_json_schema::<MockStructured>().unwrap();
    let opts = SearchOptions {
        include_sources: true,
        ..Default::default()
    };

    let output = client
        .get_structured_results("summary", SearchDepth::Standard, &schema, Some(&opts))
        .await
        .unwrap();

    assert!(output.raw_json().is_none());
    let sourced = output.sourced_output().expect("sourced output populated");
    let decoded: MockStructured = decode_from_sourced_data(sourced).unwrap();
    assert_eq!(decoded, expected_structured());
    let sources = sourced.sources.as_ref().unwrap();
    assert_eq!(sources[0].url.as_deref(), Some("https://thisisalake.com"));
    assert_eq!(sources[0].content, None);

    assert_eq!(output.decode_into::<MockStructured>().unwrap(), expected_structured());
}

#[tokio::test]
async fn structured_branch_follows_the_option_not_the_body() {
    // body looks like a sourced envelope, but sources were not requested
    let body = r#"{"data":{"title":"t","summary":"s"},"sources":[]}"#;
    let client = client_with(FixedTransport::ok(body));
    let output = client
        .get_structured_results("q", SearchDepth::Standard, &json!({"type": "object"}), None)
        .await
        .unwrap();
    assert_eq!(output, StructuredOutput::RawJson(body.to_string()));
}

#[tokio::test]
async fn structured_rate_limited() {
    let client = client_with(MockTransport::failing());
    let schema = generate_json_schema::<MockStructured>().unwrap();
    let err = client
        .get_structured_results("summary", SearchDepth::Standard, &schema, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), RATE_LIMITED);
}

#[tokio::test]
async fn structured_null_schema_is_rejected_before_sending() {
    let mock = Arc::new(MockTransport::healthy());
    let client = client_with(mock.clone());
    let err = client
        .get_structured_results("q", SearchDepth::Standard, &serde_json::Value::Null, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkupError::InvalidOptions(_)));
    assert!(mock.searches.lock().unwrap().is_empty());
}

// ---------- sourced answer ----------

#[tokio::test]
async fn sourced_answer_success() {
    let mock = Arc::new(MockTransport::healthy());
    let client = client_with(mock.clone());
    let opts = SearchOptions {
        include_inline_citations: true,
        include_domains: vec!["thisisalake.com".into()],
        ..Default::default()
    };
    let answer = client
        .get_sourced_answer("lake", SearchDepth::Deep, Some(&opts))
        .await
        .unwrap();

    assert_eq!(answer.answer, "This is a lake");
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].snippet, "A lake in the mountains");

    let sent = mock.searches.lock().unwrap();
    assert_eq!(sent[0].depth, SearchDepth::Deep);
    assert_eq!(sent[0].output_type, OutputType::SourcedAnswer);
    assert!(sent[0].include_inline_citations);
    assert_eq!(sent[0].include_domains, ["thisisalake.com"]);
    assert!(sent[0].structured_output_schema.is_none());
}

#[tokio::test]
async fn sourced_answer_rate_limited() {
    let client = client_with(MockTransport::failing());
    let err = client
        .get_sourced_answer("lake", SearchDepth::Standard, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), RATE_LIMITED);
}

// ---------- generic search ----------

#[tokio::test]
async fn search_dispatches_on_output_type() {
    let client = client_with(MockTransport::healthy());
    let schema = generate_json_schema::<MockStructured>().unwrap();

    let queries = [
        SearchQuery::search_results("lake", SearchDepth::Standard),
        SearchQuery::sourced_answer("lake", SearchDepth::Standard),
        SearchQuery::structured("lake", SearchDepth::Standard, schema).with_options(
            SearchOptions {
                include_sources: true,
                ..Default::default()
            },
        ),
    ];

    for query in &queries {
        let output = client.search(query).await.unwrap();
        assert_eq!(output.output_type(), query.output_type());
    }

    let out = client.search(&queries[2]).await.unwrap();
    assert!(matches!(out, SearchOutput::Structured(StructuredOutput::Sourced(_))));
}

#[tokio::test]
async fn invalid_options_never_reach_the_transport() {
    let mock = Arc::new(MockTransport::healthy());
    let client = client_with(mock.clone());
    let opts = SearchOptions {
        from_date: linkup_sdk::NaiveDate::from_ymd_opt(2024, 5, 1),
        to_date: linkup_sdk::NaiveDate::from_ymd_opt(2023, 5, 1),
        ..Default::default()
    };
    let err = client
        .get_sourced_answer("lake", SearchDepth::Standard, Some(&opts))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkupError::InvalidOptions(_)));
    assert!(mock.searches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transport_errors_propagate_unchanged() {
    let client = client_with(BrokenTransport);
    let err = client.get_balance().await.unwrap_err();
    assert!(matches!(err, LinkupError::Transport(_)));
    assert_eq!(err.to_string(), "network error: connection refused");
}

// ---------- balance ----------

#[tokio::test]
async fn balance_success() {
    let client = client_with(MockTransport::healthy());
    assert_eq!(client.get_balance().await.unwrap(), 12.5);
}

#[tokio::test]
#[allow(clippy::approx_constant)]
async fn balance_is_returned_as_sent() {
    let client = client_with(FixedTransport::ok(r#"{"balance": 3.14}"#));
    assert_eq!(client.get_balance().await.unwrap(), 3.14);
}

#[tokio::test]
async fn balance_rate_limited() {
    let client = client_with(MockTransport::failing());
    let err = client.get_balance().await.unwrap_err();
    assert_eq!(err.to_string(), RATE_LIMITED);
}

#[tokio::test]
async fn balance_with_malformed_body_is_an_error() {
    let client = client_with(FixedTransport::ok(r#"{"credits": 1}"#));
    assert!(matches!(
        client.get_balance().await,
        Err(LinkupError::Decode(_))
    ));
}

// ---------- fetch ----------

#[tokio::test]
async fn fetch_with_everything() {
    let mock = Arc::new(MockTransport::healthy());
    let client = client_with(mock.clone());
    let opts = FetchOptions {
        include_raw_html: true,
        extract_images: true,
        render_js: true,
    };
    let out = client
        .fetch("https://helloworld.com", Some(&opts))
        .await
        .unwrap();

    assert_eq!(out.markdown, "# Hello World!");
    assert_eq!(out.raw_html.as_deref(), Some("<h1>Hello World!</h1>"));
    let images = out.images.expect("images extracted");
    assert!(!images.is_empty());
    assert_eq!(images[0].url, "https://helloworld.image.png");
    assert!(images[0].alt.is_none());

    let sent = mock.fetches.lock().unwrap();
    assert!(sent[0].render_js && sent[0].include_raw_html && sent[0].extract_images);
}

#[tokio::test]
async fn fetch_markdown_only() {
    let client = client_with(MockTransport::healthy());
    let out = client.fetch("https://helloworld.com", None).await.unwrap();
    assert_eq!(out.markdown, "# Hello World!");
    assert!(out.raw_html.is_none());
    assert!(out.images.is_none());
}

#[tokio::test]
async fn fetch_markdown_and_images() {
    let client = client_with(MockTransport::healthy());
    let opts = FetchOptions {
        extract_images: true,
        ..Default::default()
    };
    let out = client
        .fetch("https://helloworld.com", Some(&opts))
        .await
        .unwrap();
    assert!(out.raw_html.is_none());
    assert_eq!(out.images.map(|i| i.len()), Some(1));
}

#[tokio::test]
async fn fetch_markdown_and_html() {
    let client = client_with(MockTransport::healthy());
    let opts = FetchOptions {
        include_raw_html: true,
        ..Default::default()
    };
    let out = client
        .fetch("https://helloworld.com", Some(&opts))
        .await
        .unwrap();
    assert!(out.raw_html.is_some());
    assert!(out.images.is_none());
}

#[tokio::test]
async fn fetch_rate_limited() {
    let client = client_with(MockTransport::failing());
    let err = client
        .fetch("https://helloworld.com", None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), RATE_LIMITED);
}
