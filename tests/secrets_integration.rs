//! Integration tests for the PrivX secrets client
//!
//! These tests drive the public client API against an in-memory vault
//! wrapped in a call-counting transport.

mod common;

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use common::{client, seed, CountingTransport};
use privx_secrets::secrets::{
    ConversionStrategy, FindRef, InMemoryVault, PushSecretData, PushSecretRemoteRef, RemoteRef,
    SecretsClient, SourceSecret,
};
use privx_secrets::{is_not_found, Error};

fn transport_with(vault: &InMemoryVault) -> Arc<CountingTransport> {
    Arc::new(CountingTransport::new(vault.clone()))
}

#[tokio::test]
async fn test_search_walks_pages_until_short_page() {
    let vault = InMemoryVault::new();
    seed(&vault, "bar", 100).await;
    seed(&vault, "foo", 150).await;
    let transport = transport_with(&vault);

    let found = client(transport.clone())
        .get_all_secrets(&FindRef::by_name("^foo"))
        .await
        .unwrap();

    assert_eq!(transport.list_calls(), 3);
    assert_eq!(transport.get_calls(), 150);
    assert_eq!(found.len(), 150);
    assert!(found.keys().all(|name| name.starts_with("foo")));

    let value: Value = serde_json::from_slice(&found["foo-042"]).unwrap();
    assert_eq!(value, json!({"name": "foo-042", "index": 42}));
}

#[tokio::test]
async fn test_search_with_full_last_page_fetches_empty_page() {
    let vault = InMemoryVault::new();
    seed(&vault, "app", 200).await;
    let transport = transport_with(&vault);

    let found = client(transport.clone())
        .get_all_secrets(&FindRef::default())
        .await
        .unwrap();

    assert_eq!(transport.list_calls(), 3);
    assert_eq!(found.len(), 200);
}

#[tokio::test]
async fn test_search_rejects_tags_without_network_calls() {
    let vault = InMemoryVault::new();
    seed(&vault, "app", 5).await;
    let transport = transport_with(&vault);

    let find = FindRef {
        tags: Some(BTreeMap::from([("team".to_string(), "a".to_string())])),
        ..FindRef::by_name(".*")
    };
    let err = client(transport.clone())
        .get_all_secrets(&find)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotImplemented { parameter: "ref.Tags" }));
    assert_eq!(transport.list_calls(), 0);
    assert_eq!(transport.get_calls(), 0);
}

#[tokio::test]
async fn test_search_rejects_path_and_conversion() {
    let transport = transport_with(&InMemoryVault::new());
    let client = client(transport.clone());

    let find = FindRef {
        path: Some("team-a/".into()),
        ..FindRef::default()
    };
    let err = client.get_all_secrets(&find).await.unwrap_err();
    assert!(err.to_string().contains("ref.Path"));

    let find = FindRef {
        conversion_strategy: ConversionStrategy::Unicode,
        ..FindRef::default()
    };
    let err = client.get_all_secrets(&find).await.unwrap_err();
    assert!(err.to_string().contains("ref.ConversionStrategy"));

    assert_eq!(transport.list_calls(), 0);
}

#[tokio::test]
async fn test_invalid_filter_fails_before_listing() {
    let transport = transport_with(&InMemoryVault::new());

    let err = client(transport.clone())
        .get_all_secrets(&FindRef::by_name("foo("))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidFilter { .. }));
    assert!(err.to_string().contains("foo("));
    assert_eq!(transport.list_calls(), 0);
}

#[tokio::test]
async fn test_search_aborts_on_missing_payload() {
    let vault = InMemoryVault::new();
    seed(&vault, "app", 3).await;
    vault.insert_without_data("app-empty").await;

    let err = client(transport_with(&vault))
        .get_all_secrets(&FindRef::by_name("^app"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SecretDataMissing { .. }));
}

#[tokio::test]
async fn test_search_aborts_on_transport_failure() {
    let vault = InMemoryVault::new();
    seed(&vault, "app", 150).await;
    let transport = Arc::new(CountingTransport::new(vault).with_failing_name("app-120"));

    let err = client(transport.clone())
        .get_all_secrets(&FindRef::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("vault sealed"));
    assert_eq!(transport.list_calls(), 2);
}

#[tokio::test]
async fn test_get_secret_shapes() {
    let vault = InMemoryVault::new();
    vault.insert("doc", json!({"a": 1, "b": {"c": "x"}})).await;
    let client = client(transport_with(&vault));

    let whole = client.get_secret(&RemoteRef::new("doc")).await.unwrap();
    let parsed: Value = serde_json::from_slice(&whole).unwrap();
    assert_eq!(parsed, json!({"a": 1, "b": {"c": "x"}}));

    let a = client
        .get_secret(&RemoteRef::new("doc").with_property("a"))
        .await
        .unwrap();
    assert_eq!(a, b"1");

    let err = client
        .get_secret(&RemoteRef::new("doc").with_property("z"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PropertyNotFound { .. }));
}

#[tokio::test]
async fn test_get_secret_map_shapes() {
    let vault = InMemoryVault::new();
    vault.insert("doc", json!({"a": 1, "b": {"c": "x"}})).await;
    let client = client(transport_with(&vault));

    let nested = client
        .get_secret_map(&RemoteRef::new("doc").with_property("b"))
        .await
        .unwrap();
    assert_eq!(nested, BTreeMap::from([("c".to_string(), b"x".to_vec())]));

    let scalar = client
        .get_secret_map(&RemoteRef::new("doc").with_property("a"))
        .await
        .unwrap();
    assert_eq!(scalar, BTreeMap::from([("a".to_string(), b"1".to_vec())]));

    let all = client.get_secret_map(&RemoteRef::new("doc")).await.unwrap();
    assert_eq!(all["a"], b"1");
    assert_eq!(all["b"], br#"{"c":"x"}"#);
}

#[tokio::test]
async fn test_secret_exists() {
    let vault = InMemoryVault::new();
    vault.insert("present", json!({"k": "v"})).await;
    let client = client(transport_with(&vault));

    let present = PushSecretRemoteRef::new("present");
    assert!(client.secret_exists(&present).await.unwrap());
    let absent = PushSecretRemoteRef::new("absent");
    assert!(!client.secret_exists(&absent).await.unwrap());
}

#[tokio::test]
async fn test_secret_exists_propagates_transport_failure() {
    let transport = Arc::new(CountingTransport::failing("500 Internal Server Error: boom"));

    let err = client(transport)
        .secret_exists(&PushSecretRemoteRef::new("any"))
        .await
        .unwrap_err();
    assert!(!is_not_found(&err));
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let vault = InMemoryVault::new();
    vault.insert("gone-soon", json!({"k": "v"})).await;
    let client = client(transport_with(&vault));
    let remote = PushSecretRemoteRef::new("gone-soon");

    client.delete_secret(&remote).await.unwrap();
    client.delete_secret(&remote).await.unwrap();
    assert!(!client.secret_exists(&remote).await.unwrap());
}

#[tokio::test]
async fn test_delete_propagates_other_failures() {
    let transport = Arc::new(CountingTransport::failing("403 Forbidden: missing role"));

    let err = client(transport)
        .delete_secret(&PushSecretRemoteRef::new("x"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_push_is_last_writer_wins() {
    let vault = InMemoryVault::new();
    let client = client(transport_with(&vault));
    let source = SourceSecret::new("app")
        .with_entry("user", "alice")
        .with_entry("pass", "pw");

    for key in ["user", "pass"] {
        let data = PushSecretData {
            secret_key: key.to_string(),
            remote_key: "shared".to_string(),
        };
        client.push_secret(&source, &data).await.unwrap();
    }

    let map = client
        .get_secret_map(&RemoteRef::new("shared"))
        .await
        .unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["pass"]);

    let remote_ref = RemoteRef::new("shared")
        .with_property("pass")
        .with_decoding_strategy("base64");
    let pass = client.get_secret(&remote_ref).await.unwrap();
    assert_eq!(pass, b"pw");

    let (read, write) = vault.roles("shared").await.unwrap();
    assert_eq!(read[0].id, "role-read");
    assert_eq!(write[0].id, "role-write");
}

#[tokio::test]
async fn test_validate_distinguishes_absence_from_failure() {
    let ok = client(transport_with(&InMemoryVault::new()));
    ok.validate().await.unwrap();

    let transport = Arc::new(CountingTransport::failing("401 Unauthorized: bad token"));
    let failing = client(transport);
    let err = failing.validate().await.unwrap_err();
    assert!(err.to_string().contains("401"));
}
