//! API Integration Tests
//!
//! Status codes and JSON bodies of the collection endpoints.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn api() -> CollectionsApi {
    let (_backing, registry) = memory_registry();
    CollectionsApi::new(registry)
}

fn body<T: serde::Serialize>(response: &vexdb::ApiResponse<T>) -> Value {
    serde_json::from_str(&response.to_json().unwrap()).unwrap()
}

#[test]
fn exists_scenario_bodies() {
    let api = api();

    let created = api.create_collection_json(
        "collection_name",
        r#"{"vectors": {"size": 4, "distance": "Dot"}}"#,
    );
    assert_eq!(created.status_code, 200);
    assert_eq!(body(&created)["result"], json!(true));

    let response = api.collection_exists("collection_name");
    let value = body(&response);
    assert_eq!(response.status_code, 200);
    assert_eq!(value["result"], json!({"exists": true}));
    assert_eq!(value["status"], json!("ok"));

    let response = api.collection_exists("wrong");
    assert_eq!(response.status_code, 200);
    assert_eq!(body(&response)["result"], json!({"exists": false}));

    let deleted = api.delete_collection("collection_name");
    assert_eq!(deleted.status_code, 200);

    let response = api.collection_exists("collection_name");
    assert_eq!(body(&response)["result"]["exists"], json!(false));
}

#[test]
fn exists_body_has_exactly_the_envelope_fields() {
    let api = api();
    let value = body(&api.collection_exists("anything"));
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["result", "status", "time"]);
}

#[test]
fn error_status_codes() {
    let api = api();
    api.create_collection("a", config_small());

    let conflict = api.create_collection("a", config_small());
    assert_eq!(conflict.status_code, 409);
    assert_eq!(
        body(&conflict)["status"]["error"],
        json!("Collection already exists: a")
    );

    assert_eq!(api.delete_collection("missing").status_code, 404);
    assert_eq!(api.create_collection("a/b", config_small()).status_code, 400);
    assert_eq!(
        api.create_collection_json("b", r#"{"vectors": {"size": 0, "distance": "Cosine"}}"#)
            .status_code,
        400
    );
    assert_eq!(api.create_collection_json("b", "not json").status_code, 400);
}

#[test]
fn allocation_failure_is_server_error() {
    let backing = Arc::new(FailingBacking::default());
    let api = CollectionsApi::new(registry_over(backing.clone()));
    backing.set_fail_allocate(true);

    let response = api.create_collection("a", config_small());
    assert_eq!(response.status_code, 500);
    assert!(!response.is_success());
    assert!(!api.collection_exists("a").result().unwrap().exists);
}

#[test]
fn closed_registry_is_unavailable() {
    let api = api();
    api.registry().shutdown(std::time::Duration::from_secs(1));
    assert_eq!(api.create_collection("a", config_small()).status_code, 503);
}

#[test]
fn list_and_describe() {
    let api = api();
    for name in ["beta", "alpha"] {
        api.create_collection(name, config_standard());
    }

    let value = body(&api.list_collections());
    assert_eq!(
        value["result"],
        json!({"collections": [{"name": "alpha"}, {"name": "beta"}]})
    );

    let value = body(&api.get_collection("alpha"));
    assert_eq!(value["result"]["name"], json!("alpha"));
    assert_eq!(value["result"]["status"], json!("ready"));
    assert_eq!(value["result"]["config"]["vectors"]["size"], json!(384));
    assert_eq!(value["result"]["config"]["vectors"]["distance"], json!("Cosine"));

    let missing = api.get_collection("gamma");
    assert_eq!(missing.status_code, 404);
    assert_eq!(body(&missing)["status"]["error"], json!("Collection not found: gamma"));
}
