use factcheck::tools::{Tool, WebSearch};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_uses_fixed_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("authorization", "Bearer tvly-key"))
        .and(body_json(json!({
            "query": "eiffel tower height",
            "max_results": 5,
            "search_depth": "advanced",
            "include_answer": true,
            "include_raw_content": true,
            "include_images": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "330 metres",
            "results": [{"title": "Eiffel Tower", "url": "https://toureiffel.paris", "content": "..."}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WebSearch::new(reqwest::Client::new(), &server.uri(), Some("tvly-key".into()));
    let outcome = tool.call(&json!({"query": "eiffel tower height"})).await;

    assert!(!outcome.is_failure());
    let parsed: serde_json::Value = serde_json::from_str(outcome.text()).unwrap();
    assert_eq!(parsed["answer"], "330 metres");
}

#[tokio::test]
async fn test_search_failure_is_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let tool = WebSearch::new(reqwest::Client::new(), &server.uri(), Some("bad".into()));
    let outcome = tool.call(&json!({"query": "anything"})).await;

    assert!(outcome.is_failure());
    assert!(outcome.text().starts_with("Error executing web search:"));
}

#[tokio::test]
async fn test_missing_query_argument() {
    let tool = WebSearch::new(reqwest::Client::new(), "http://127.0.0.1:9", Some("k".into()));
    let outcome = tool.call(&json!({})).await;

    assert!(outcome.text().contains("Missing required argument: query"));
}

#[test]
fn test_tool_metadata() {
    let tool = WebSearch::new(reqwest::Client::new(), "http://localhost", None);
    assert_eq!(tool.name(), "web_fact_checker");
    assert_eq!(tool.input_schema()["required"], json!(["query"]));
}
