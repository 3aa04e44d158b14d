//! End-to-end capture pipeline tests.
//!
//! Drives the full server over HTTP: bin creation, capture, counter
//! accuracy, and the rendered retrieval documents. Requires the local
//! PostgreSQL test container.

#![cfg(feature = "docker")]

use bintrap_core::models::BinId;
use futures::future::join_all;
use serde_json::Value;
use test_harness::{fixtures, TestEnv};

/// Creates a bin through the API and returns its ID.
async fn create_bin(env: &TestEnv) -> String {
    let response = env
        .client
        .post(format!("{}/bins", env.base_url()))
        .send()
        .await
        .expect("create bin request should complete");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("bin document should be valid JSON");
    body["data"]["id"].as_str().expect("bin document should carry an id").to_string()
}

#[tokio::test]
async fn capture_and_retrieve_round_trip() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let bin_id = create_bin(&env).await;

    // Capture a POST with a JSON body and a custom user agent.
    let response = env
        .client
        .post(format!("{}/bins/{}/request", env.base_url(), bin_id))
        .header("User-Agent", "test")
        .header("Content-Type", "application/json")
        .body("{\"x\":1}")
        .send()
        .await
        .expect("capture request should complete");

    assert_eq!(response.status(), 201);

    // The bin document now reports one captured request.
    let bin_doc: Value = env
        .client
        .get(format!("{}/bins/{}", env.base_url(), bin_id))
        .send()
        .await
        .expect("get bin should complete")
        .json()
        .await
        .expect("bin document should be valid JSON");

    assert_eq!(bin_doc["data"]["meta"]["requests"], 1);

    // The collection holds the request; fetch it by ID.
    let list_doc: Value = env
        .client
        .get(format!("{}/bins/{}/requests", env.base_url(), bin_id))
        .send()
        .await
        .expect("list requests should complete")
        .json()
        .await
        .expect("collection should be valid JSON");

    assert_eq!(list_doc["meta"]["count"], 1);
    let request_id = list_doc["data"][0]["id"].as_str().expect("request id present");

    let request_doc: Value = env
        .client
        .get(format!("{}/bins/{}/requests/{}", env.base_url(), bin_id, request_id))
        .send()
        .await
        .expect("get request should complete")
        .json()
        .await
        .expect("request document should be valid JSON");

    let attributes = &request_doc["data"]["attributes"];
    assert_eq!(attributes["method"], "POST");
    assert_eq!(attributes["user_agent"], "test");
    assert_eq!(attributes["body"], serde_json::json!({"x": 1}));

    let links = &request_doc["data"]["links"];
    assert_eq!(links["bin"], format!("{}/bins/{}", env.base_url(), bin_id));
    assert_eq!(
        links["self"],
        format!("{}/bins/{}/requests/{}", env.base_url(), bin_id, request_id)
    );
}

#[tokio::test]
async fn capture_against_unknown_bin_writes_nothing() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let response = env
        .client
        .post(format!("{}/bins/doesnotexist/request", env.base_url()))
        .body("payload")
        .send()
        .await
        .expect("capture request should complete");

    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("error document should be valid JSON");
    assert_eq!(body["errors"][0]["status"], "404");

    let rows = fixtures::count_requests(&env.db, &BinId::from("doesnotexist"))
        .await
        .expect("count query should work");
    assert_eq!(rows, 0, "no request row may exist for an unknown bin");
}

#[tokio::test]
async fn non_json_body_is_returned_verbatim() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let bin_id = create_bin(&env).await;

    let response = env
        .client
        .post(format!("{}/bins/{}/request", env.base_url(), bin_id))
        .body("not json")
        .send()
        .await
        .expect("capture request should complete");

    let doc: Value = response.json().await.expect("request document should be valid JSON");
    assert_eq!(doc["data"]["attributes"]["body"], "not json");
}

#[tokio::test]
async fn bodyless_capture_omits_body_attribute() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let bin_id = create_bin(&env).await;

    let response = env
        .client
        .get(format!("{}/bins/{}/request", env.base_url(), bin_id))
        .send()
        .await
        .expect("capture request should complete");

    assert_eq!(response.status(), 201);

    let doc: Value = response.json().await.expect("request document should be valid JSON");
    assert_eq!(doc["data"]["attributes"]["method"], "GET");
    assert!(doc["data"]["attributes"].get("body").is_none());
}

#[tokio::test]
async fn concurrent_captures_keep_the_counter_accurate() {
    const CAPTURES: usize = 25;

    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let bin_id = create_bin(&env).await;

    let posts = (0..CAPTURES).map(|i| {
        let client = env.client.clone();
        let url = format!("{}/bins/{}/request", env.base_url(), bin_id);
        async move {
            client
                .post(url)
                .body(format!("{{\"n\":{i}}}"))
                .send()
                .await
                .expect("capture request should complete")
                .status()
        }
    });

    for status in join_all(posts).await {
        assert_eq!(status, 201);
    }

    let counter = fixtures::counter_value(&env.db, &BinId::from(bin_id.as_str()), "requests")
        .await
        .expect("counter query should work");
    assert_eq!(counter, CAPTURES as i64);

    let rows = fixtures::count_requests(&env.db, &BinId::from(bin_id.as_str()))
        .await
        .expect("count query should work");
    assert_eq!(rows, CAPTURES as i64);
}

#[tokio::test]
async fn truncated_body_stream_still_captures_metadata() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    let addr = env.spawn_server().await.expect("Failed to spawn server");

    let bin_id = create_bin(&env).await;

    // Declare more body bytes than we send, then close the write side:
    // the server observes a truncated stream mid-read.
    let mut stream =
        tokio::net::TcpStream::connect(addr).await.expect("connect to test server");
    let head = format!(
        "POST /bins/{bin_id}/request HTTP/1.1\r\nHost: {addr}\r\nUser-Agent: cutter\r\nContent-Length: 100\r\n\r\npartial"
    );
    stream.write_all(head.as_bytes()).await.expect("write request head");
    stream.shutdown().await.expect("shutdown write side");

    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response).await;
    let response = String::from_utf8_lossy(&response);
    assert!(
        response.starts_with("HTTP/1.1 201"),
        "capture should succeed despite the truncated body, got: {response}"
    );

    // The row exists with an empty body and intact metadata.
    let rows = fixtures::count_requests(&env.db, &BinId::from(bin_id.as_str()))
        .await
        .expect("count query should work");
    assert_eq!(rows, 1);

    let (method, user_agent, body): (String, String, String) = sqlx::query_as(
        "SELECT method, user_agent, body FROM requests WHERE bin_id = $1",
    )
    .bind(bin_id.as_str())
    .fetch_one(&env.db)
    .await
    .expect("request row should be readable");

    assert_eq!(method, "POST");
    assert_eq!(user_agent, "cutter");
    assert_eq!(body, "", "a failed body read keeps nothing of the body");
}
