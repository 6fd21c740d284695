//! Shared helpers for tests against a mocked Technitium server.

#![allow(dead_code)]

use serde_json::{Value, json};
use technitium_provider::{TechnitiumClient, TechnitiumProvider};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

pub fn client(server: &MockServer) -> TechnitiumClient {
    TechnitiumClient::new(server.uri(), TOKEN).expect("client builds")
}

pub fn provider(server: &MockServer) -> TechnitiumProvider {
    TechnitiumProvider::from_client(client(server))
}

/// `{"status":"ok","response":...}`
pub fn ok(response: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "response": response}))
}

/// `{"status":"ok"}` without payload.
pub fn ok_empty() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))
}

pub fn api_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": "error", "errorMessage": message}))
}

/// Answer every GET to `endpoint` with `template`.
pub async fn mount(server: &MockServer, endpoint: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Query pairs of every request received for `endpoint`, in arrival order.
pub async fn queries(server: &MockServer, endpoint: &str) -> Vec<Vec<(String, String)>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .map(|r| {
            r.url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .collect()
}

/// The single request made to `endpoint`.
pub async fn only_query(server: &MockServer, endpoint: &str) -> Vec<(String, String)> {
    let mut all = queries(server, endpoint).await;
    assert_eq!(all.len(), 1, "expected exactly one request to {endpoint}");
    all.remove(0)
}

pub fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub fn keys(query: &[(String, String)]) -> Vec<&str> {
    query.iter().map(|(k, _)| k.as_str()).collect()
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}
