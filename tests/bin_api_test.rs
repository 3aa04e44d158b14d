//! Bin API integration tests.
//!
//! Covers the create/list/get surface and the error document shape.
//! Requires the local PostgreSQL test container.

#![cfg(feature = "docker")]

use serde_json::Value;
use test_harness::{fixtures, TestEnv};

#[tokio::test]
async fn created_bins_have_distinct_ids_and_links() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let mut ids = Vec::new();
    for _ in 0..5 {
        let response = env
            .client
            .post(format!("{}/bins", env.base_url()))
            .send()
            .await
            .expect("create bin should complete");

        assert_eq!(response.status(), 201);

        let doc: Value = response.json().await.expect("bin document should be valid JSON");
        let id = doc["data"]["id"].as_str().expect("id present").to_string();

        assert_eq!(doc["data"]["type"], "bin");
        assert_eq!(doc["data"]["meta"]["requests"], 0);
        assert_eq!(doc["data"]["links"]["self"], format!("{}/bins/{id}", env.base_url()));

        ids.push(id);
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5, "bin tokens must be pairwise distinct");
}

#[tokio::test]
async fn bins_list_in_creation_order() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let first = fixtures::insert_bin(&env.db, "earlybird0001").await.expect("insert bin");
    let second = fixtures::insert_bin(&env.db, "latecomer0002").await.expect("insert bin");

    let doc: Value = env
        .client
        .get(format!("{}/bins", env.base_url()))
        .send()
        .await
        .expect("list bins should complete")
        .json()
        .await
        .expect("collection should be valid JSON");

    assert_eq!(doc["meta"]["count"], 2);
    assert_eq!(doc["data"][0]["id"], first.as_str());
    assert_eq!(doc["data"][1]["id"], second.as_str());
}

#[tokio::test]
async fn unknown_bin_yields_error_document() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let response = env
        .client
        .get(format!("{}/bins/nosuchbin000", env.base_url()))
        .send()
        .await
        .expect("get bin should complete");

    assert_eq!(response.status(), 404);

    let doc: Value = response.json().await.expect("error document should be valid JSON");
    assert_eq!(doc["errors"][0]["status"], "404");
    assert!(doc["errors"][0]["detail"].as_str().unwrap().contains("nosuchbin000"));
}

#[tokio::test]
async fn request_lookup_is_scoped_to_its_bin() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    let owner = fixtures::insert_bin(&env.db, "ownerbin0001").await.expect("insert bin");
    let other = fixtures::insert_bin(&env.db, "otherbin0002").await.expect("insert bin");
    let request_id =
        fixtures::insert_request(&env.db, &owner, "{\"k\":true}").await.expect("insert request");

    // Readable through the owning bin.
    let response = env
        .client
        .get(format!("{}/bins/{}/requests/{}", env.base_url(), owner, request_id))
        .send()
        .await
        .expect("get request should complete");
    assert_eq!(response.status(), 200);

    // Invisible through any other bin.
    let response = env
        .client
        .get(format!("{}/bins/{}/requests/{}", env.base_url(), other, request_id))
        .send()
        .await
        .expect("get request should complete");
    assert_eq!(response.status(), 404);

    // A malformed request ID is just another missing request.
    let response = env
        .client
        .get(format!("{}/bins/{}/requests/not-a-uuid", env.base_url(), owner))
        .send()
        .await
        .expect("get request should complete");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let mut env = TestEnv::new().await.expect("Failed to create test environment");
    env.spawn_server().await.expect("Failed to spawn server");

    for path in ["/health", "/ready", "/live"] {
        let response = env
            .client
            .get(format!("{}{path}", env.base_url()))
            .send()
            .await
            .expect("health request should complete");
        assert_eq!(response.status(), 200, "{path} should report healthy");
    }
}
